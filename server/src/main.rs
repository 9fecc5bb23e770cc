use clap::Parser;
use log::{debug, error, info};
use server::network::Server;
use server::session::SessionConfig;
use shared::map::{render, Overlay};
use shared::{Map, Player, DEFAULT_PORT};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "C-Man match server", long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Map file
    #[arg(short, long, default_value = "map.txt")]
    map: String,

    /// Receive timeout and sync tick in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let map = match Map::load(&args.map) {
        Ok(map) => map,
        Err(e) => {
            error!("Invalid map {}: {}", args.map, e);
            return Err(e.into());
        }
    };
    info!(
        "Loaded {}x{} map from {}",
        map.width(),
        map.height(),
        args.map
    );
    let overlay = Overlay {
        cman: map.start(Player::Cman),
        spirit: map.start(Player::Spirit),
        collected: 0,
    };
    for line in render(&map, &overlay) {
        debug!("{}", line);
    }

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(
        &address,
        map,
        Duration::from_millis(args.tick_ms.max(1)),
        SessionConfig::default(),
    )
    .await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
