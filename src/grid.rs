use std::convert::TryFrom;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub type Coord = i32;

/// Number of cells along each side of the grid
pub const GRID_SIZE: Coord = 8;

/// A cell on the grid. Row 0 is the top row, column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: Coord,
    pub col: Coord,
}

impl Position {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// Whether the position lies on the grid
    pub fn in_bounds(&self) -> bool {
        (0..GRID_SIZE).contains(&self.row) && (0..GRID_SIZE).contains(&self.col)
    }

    /// The position one cell further along `heading`. The result may be off the grid.
    pub fn step(&self, heading: Heading) -> Self {
        let (dr, dc) = heading.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The direction the agent faces, in clockwise order
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(TryFromPrimitive, IntoPrimitive)]
pub enum Heading {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Heading {
    pub const ALL: &'static [Self] = &[Self::North, Self::East, Self::South, Self::West];

    /// Row and column offset of a single step
    pub fn delta(self) -> (Coord, Coord) {
        match self {
            Heading::North => (-1, 0),
            Heading::East => (0, 1),
            Heading::South => (1, 0),
            Heading::West => (0, -1),
        }
    }

    /// Turns clockwise by `quarter_turns` positions
    pub fn turn(self, quarter_turns: u8) -> Self {
        let index = (u8::from(self) + quarter_turns % 4) % 4;
        // index is always in 0..4
        Heading::try_from(index).unwrap_or(self)
    }

    /// Arrow used when drawing the agent
    pub fn arrow(self) -> char {
        match self {
            Heading::North => '↑',
            Heading::East => '→',
            Heading::South => '↓',
            Heading::West => '←',
        }
    }

    pub fn letter(self) -> char {
        match self {
            Heading::North => 'N',
            Heading::East => 'E',
            Heading::South => 'S',
            Heading::West => 'W',
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Position and heading of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
}

impl Default for AgentState {
    /// Top left corner, facing east
    fn default() -> Self {
        Self::new(0, 0, Heading::East)
    }
}

impl AgentState {
    pub const fn new(row: Coord, col: Coord, heading: Heading) -> Self {
        Self {
            position: Position::new(row, col),
            heading,
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.position.row, self.position.col, self.heading
        )
    }
}
