use macroquad::prelude::*;

const WALL: Color = Color::new(0.13, 0.2, 0.55, 1.0);
const POINT: Color = Color::new(0.95, 0.85, 0.6, 1.0);
const CMAN: Color = Color::new(1.0, 0.9, 0.0, 1.0);
const SPIRIT: Color = Color::new(1.0, 0.35, 0.45, 1.0);
const STATUS_HEIGHT: f32 = 28.0;

/// Draws a rendered map grid as coloured tiles.
pub struct Renderer {
    cell_size: f32,
}

impl Renderer {
    pub fn new(cell_size: f32) -> Self {
        Renderer { cell_size }
    }

    /// Window size needed for a grid of the given dimensions.
    pub fn window_size(&self, width: u8, height: u8) -> (f32, f32) {
        (
            width as f32 * self.cell_size,
            height as f32 * self.cell_size + STATUS_HEIGHT,
        )
    }

    pub fn render(&self, grid: &[String], status: &str) {
        clear_background(BLACK);

        for (row, line) in grid.iter().enumerate() {
            for (col, symbol) in line.chars().enumerate() {
                self.draw_cell(row, col, symbol);
            }
        }

        let text_y = grid.len() as f32 * self.cell_size + STATUS_HEIGHT * 0.7;
        draw_text(status, 6.0, text_y, 20.0, WHITE);
    }

    fn draw_cell(&self, row: usize, col: usize, symbol: char) {
        let x = col as f32 * self.cell_size;
        let y = row as f32 * self.cell_size;
        let center_x = x + self.cell_size / 2.0;
        let center_y = y + self.cell_size / 2.0;

        match symbol {
            '█' => draw_rectangle(x, y, self.cell_size, self.cell_size, WALL),
            '•' => draw_circle(center_x, center_y, self.cell_size * 0.12, POINT),
            'C' => draw_circle(center_x, center_y, self.cell_size * 0.4, CMAN),
            'S' => {
                draw_circle(center_x, center_y, self.cell_size * 0.4, SPIRIT);
                draw_rectangle(
                    x + self.cell_size * 0.1,
                    center_y,
                    self.cell_size * 0.8,
                    self.cell_size * 0.4,
                    SPIRIT,
                );
            }
            _ => {}
        }
    }
}
