use serde::{Deserialize, Serialize};

pub const SIZE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::X => write!(f, "X"),
            Symbol::O => write!(f, "O"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Symbol),
}

impl Cell {
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Cell::Empty => None,
            Cell::Marked(symbol) => Some(*symbol),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_valid(&self) -> bool {
        self.row < SIZE && self.col < SIZE
    }
}

/// Three positions that win the game when they all hold the same symbol.
pub type Line = [Position; 3];

const fn line(a: (usize, usize), b: (usize, usize), c: (usize, usize)) -> Line {
    [
        Position { row: a.0, col: a.1 },
        Position { row: b.0, col: b.1 },
        Position { row: c.0, col: c.1 },
    ]
}

/// Columns first, then rows, then the two diagonals.
pub const LINES: [Line; 8] = [
    line((0, 0), (1, 0), (2, 0)),
    line((0, 1), (1, 1), (2, 1)),
    line((0, 2), (1, 2), (2, 2)),
    line((0, 0), (0, 1), (0, 2)),
    line((1, 0), (1, 1), (1, 2)),
    line((2, 0), (2, 1), (2, 2)),
    line((0, 0), (1, 1), (2, 2)),
    line((0, 2), (1, 1), (2, 0)),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell at `position`, `None` when it is off the board.
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.cells.get(position.row)?.get(position.col).copied()
    }

    pub fn is_empty(&self, position: Position) -> bool {
        self.cell(position) == Some(Cell::Empty)
    }

    /// Mark the cell at `position`. Off-board positions are ignored.
    pub fn set(&mut self, position: Position, symbol: Symbol) {
        if let Some(cell) = self
            .cells
            .get_mut(position.row)
            .and_then(|row| row.get_mut(position.col))
        {
            *cell = Cell::Marked(symbol);
        }
    }

    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (Position::new(row, col), *cell))
        })
    }

    fn compare_symbols(a: Cell, b: Cell, c: Cell) -> bool {
        a == b && b == c && c != Cell::Empty
    }

    /// First line holding three equal symbols, if any.
    pub fn winning_line(&self) -> Option<Line> {
        LINES.iter().copied().find(|[a, b, c]| {
            Self::compare_symbols(
                self.cells[a.row][a.col],
                self.cells[b.row][b.col],
                self.cells[c.row][c.col],
            )
        })
    }

    pub fn is_victory(&self) -> bool {
        self.winning_line().is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.cells.iter().flatten().all(|cell| *cell != Cell::Empty)
    }

    pub fn is_tie(&self) -> bool {
        !self.is_victory() && self.is_completed()
    }
}
