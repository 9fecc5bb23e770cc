use clap::Parser;
use client::network::Client;
use log::{error, info};
use macroquad::prelude::*;
use shared::{Map, Role, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about = "C-Man client", long_about = None)]
struct Args {
    /// Role to play: cman, spirit or watcher
    role: Role,

    /// Server address (IP or hostname)
    address: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Map file; must match the server's
    #[arg(short, long, default_value = "map.txt")]
    map: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "C-Man".to_owned(),
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let map = match Map::load(&args.map) {
        Ok(map) => map,
        Err(e) => {
            error!("Invalid map {}: {}", args.map, e);
            eprintln!("Invalid map {}: {}", args.map, e);
            std::process::exit(1);
        }
    };

    let server = format!("{}:{}", args.address, args.port);
    info!("Starting client as {}", args.role);
    info!("Controls: WASD/arrows to move, Q or Esc to quit");

    let mut client = match Client::new(&server, args.role, map) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not reach {}: {}", server, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = client.run().await {
        error!("Client stopped: {}", e);
        eprintln!("Connection to server lost: {}", e);
        std::process::exit(1);
    }
}
