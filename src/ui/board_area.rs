use crate::base::{Position, board::SIZE};
use log::trace;

/// Geometry of the square board canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoardArea {
    pub canvas_area: iced::Rectangle,
    pub col_width: f32,
    pub row_height: f32,
}

impl BoardArea {
    pub fn calculate(canvas_size: u32) -> Self {
        let size = canvas_size as f32;
        let area = BoardArea {
            canvas_area: iced::Rectangle {
                x: 0.0,
                y: 0.0,
                width: size,
                height: size,
            },
            col_width: size / SIZE as f32,
            row_height: size / SIZE as f32,
        };
        trace!("Board area: {:?}", area);
        area
    }

    pub fn cell_at(&self, pos: iced::Point) -> Option<Position> {
        let col = ((pos.x - self.canvas_area.x) / self.col_width).floor() as isize;
        let row = ((pos.y - self.canvas_area.y) / self.row_height).floor() as isize;

        if col < 0 || row < 0 {
            return None;
        }

        let position = Position::new(row as usize, col as usize);
        position.is_valid().then_some(position)
    }

    pub fn cell_rect(&self, position: Position) -> iced::Rectangle {
        iced::Rectangle {
            x: self.canvas_area.x + position.col as f32 * self.col_width,
            y: self.canvas_area.y + position.row as f32 * self.row_height,
            width: self.col_width,
            height: self.row_height,
        }
    }

    pub fn cell_center(&self, position: Position) -> iced::Point {
        self.cell_rect(position).center()
    }

    /// Two vertical then two horizontal separators.
    pub fn grid_lines(&self) -> [(iced::Point, iced::Point); 4] {
        let iced::Rectangle { x, y, width, height } = self.canvas_area;
        [
            (
                iced::Point::new(x + self.col_width, y),
                iced::Point::new(x + self.col_width, y + height),
            ),
            (
                iced::Point::new(x + 2.0 * self.col_width, y),
                iced::Point::new(x + 2.0 * self.col_width, y + height),
            ),
            (
                iced::Point::new(x, y + self.row_height),
                iced::Point::new(x + width, y + self.row_height),
            ),
            (
                iced::Point::new(x, y + 2.0 * self.row_height),
                iced::Point::new(x + width, y + 2.0 * self.row_height),
            ),
        ]
    }

    /// Symbols are drawn at a fifth of the canvas size.
    pub fn symbol_size(&self) -> f32 {
        self.canvas_area.width / 5.0
    }
}
