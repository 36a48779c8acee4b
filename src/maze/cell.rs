use std::fmt;

/// A cell coordinate in the maze. Carries no identity beyond its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

impl Cell {
    pub const fn new(x: u16, y: u16) -> Self {
        Cell { x, y }
    }

    /// The coordinate one step away in `direction`, or `None` when that step
    /// would leave the `u16` coordinate space. Grid bounds are not checked.
    pub fn step(self, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.offset();
        let x = u16::try_from(i32::from(self.x) + dx).ok()?;
        let y = u16::try_from(i32::from(self.y) + dy).ok()?;
        Some(Cell { x, y })
    }
}

impl From<(u16, u16)> for Cell {
    fn from((x, y): (u16, u16)) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal directions. `y` grows towards the south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions, in the canonical N, E, S, W order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit step `(dx, dy)` for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => write!(f, "North"),
            Direction::East => write!(f, "East"),
            Direction::South => write!(f, "South"),
            Direction::West => write!(f, "West"),
        }
    }
}

/// Walls around a single cell, one bit per [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallSet(u8);

impl WallSet {
    pub const ALL: WallSet = WallSet(0b1111);
    pub const NONE: WallSet = WallSet(0);

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Removes the wall in `direction`. Returns `true` if it was present.
    pub fn remove(&mut self, direction: Direction) -> bool {
        let present = self.contains(direction);
        self.0 &= !direction.bit();
        present
    }

    /// Adds the wall in `direction`. Returns `true` if it was absent.
    pub fn insert(&mut self, direction: Direction) -> bool {
        let absent = !self.contains(direction);
        self.0 |= direction.bit();
        absent
    }

    /// Number of walls present.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl Default for WallSet {
    fn default() -> Self {
        WallSet::ALL
    }
}
