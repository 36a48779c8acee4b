use std::fmt;

use crate::error::{MazeError, Result};
use crate::maze::cell::{Cell, Direction, WallSet};

/// An axis-aligned rectangle of cells opened up into a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    /// Left column of the room
    pub x: u16,
    /// Top row of the room
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Room {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Room {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let (x, y) = (u32::from(cell.x), u32::from(cell.y));
        x >= u32::from(self.x)
            && y >= u32::from(self.y)
            && x < u32::from(self.x) + u32::from(self.width)
            && y < u32::from(self.y) + u32::from(self.height)
    }

    /// Iterates over the room's cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let Room {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height).flat_map(move |cy| (x..x + width).map(move |cx| Cell::new(cx, cy)))
    }
}

/// The mutable wall matrix of a maze: one [`WallSet`] per cell, a room mask
/// and the position of the single exit.
///
/// Walls between two in-bounds cells are always kept consistent on both
/// sides. The only boundary wall that may be missing is the exit's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floorplan {
    walls: Box<[WallSet]>,
    in_room: Box<[bool]>,
    rooms: Vec<Room>,
    exit: Option<(Cell, Direction)>,
    width: u16,
    height: u16,
}

impl Floorplan {
    /// Creates a floorplan with every wall present, no rooms and no exit.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MazeError::InvalidDimension { width, height });
        }
        let size = width as usize * height as usize;
        Ok(Floorplan {
            walls: vec![WallSet::ALL; size].into_boxed_slice(),
            in_room: vec![false; size].into_boxed_slice(),
            rooms: Vec::new(),
            exit: None,
            width,
            height,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells in the floorplan.
    pub fn size(&self) -> usize {
        self.walls.len()
    }

    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Like [`Floorplan::is_in_bounds`] but for signed coordinates, as handed
    /// out by callers walking off the edge of the maze.
    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.width) && y < i32::from(self.height)
    }

    /// Checks whether the cell lies on the outer ring of the grid.
    pub fn is_on_perimeter(&self, cell: Cell) -> bool {
        self.is_in_bounds(cell)
            && (cell.x == 0 || cell.y == 0 || cell.x == self.width - 1 || cell.y == self.height - 1)
    }

    pub(crate) fn ravel_index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    pub(crate) fn unravel_index(&self, index: usize) -> Cell {
        let width = self.width as usize;
        Cell::new((index % width) as u16, (index / width) as u16)
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
    }

    /// The in-bounds neighbour of `cell` in `direction`, walls ignored.
    pub fn neighbour(&self, cell: Cell, direction: Direction) -> Option<Cell> {
        cell.step(direction).filter(|&c| self.is_in_bounds(c))
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if self.is_in_bounds(cell) {
            Ok(())
        } else {
            Err(MazeError::out_of_bounds(cell.x, cell.y))
        }
    }

    pub fn has_wall(&self, cell: Cell, direction: Direction) -> Result<bool> {
        self.check_bounds(cell)?;
        Ok(self[cell].contains(direction))
    }

    /// Removes the wall on `cell`'s side in `direction` and the matching wall
    /// of the neighbour, if there is one.
    ///
    /// Returns `true` if a wall was removed, `false` if there was none.
    pub fn remove_wall(&mut self, cell: Cell, direction: Direction) -> Result<bool> {
        self.check_bounds(cell)?;
        let idx = self.ravel_index(cell);
        let removed = self.walls[idx].remove(direction);
        if let Some(neighbour) = self.neighbour(cell, direction) {
            let idx = self.ravel_index(neighbour);
            self.walls[idx].remove(direction.opposite());
        }
        Ok(removed)
    }

    fn insert_wall(&mut self, cell: Cell, direction: Direction) {
        let idx = self.ravel_index(cell);
        self.walls[idx].insert(direction);
        if let Some(neighbour) = self.neighbour(cell, direction) {
            let idx = self.ravel_index(neighbour);
            self.walls[idx].insert(direction.opposite());
        }
    }

    /// Checks whether `cell` can move to its neighbour in `direction`.
    /// Stepping through the exit opening does not count.
    pub fn is_open(&self, cell: Cell, direction: Direction) -> bool {
        self.is_in_bounds(cell)
            && !self[cell].contains(direction)
            && self.neighbour(cell, direction).is_some()
    }

    /// Neighbours reachable from `cell` without crossing a wall.
    pub fn open_neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&d| self.is_open(cell, d))
            .filter_map(move |d| self.neighbour(cell, d))
    }

    /// Opens a rectangular room: every wall between two cells of the room is
    /// removed and the cells are flagged as room members. The room's outer
    /// walls are left alone.
    pub fn mark_room(&mut self, room: Room) -> Result<()> {
        if room.width == 0 || room.height == 0 {
            return Err(MazeError::InvalidDimension {
                width: room.width,
                height: room.height,
            });
        }
        let right = u32::from(room.x) + u32::from(room.width) - 1;
        let bottom = u32::from(room.y) + u32::from(room.height) - 1;
        if right >= u32::from(self.width) || bottom >= u32::from(self.height) {
            return Err(MazeError::out_of_bounds(right as i32, bottom as i32));
        }

        for cell in room.cells() {
            if u32::from(cell.x) < right {
                self.remove_wall(cell, Direction::East)?;
            }
            if u32::from(cell.y) < bottom {
                self.remove_wall(cell, Direction::South)?;
            }
            let idx = self.ravel_index(cell);
            self.in_room[idx] = true;
        }
        self.rooms.push(room);
        Ok(())
    }

    /// `false` for out-of-bounds cells.
    pub fn is_in_room(&self, cell: Cell) -> bool {
        self.is_in_bounds(cell) && self.in_room[self.ravel_index(cell)]
    }

    /// Rooms in the order they were opened.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Makes `cell` the exit by removing its outward wall. Corner cells open
    /// towards the first boundary side in N, E, S, W order. A previous exit
    /// gets its wall back, so there is never more than one opening.
    pub fn set_exit_position(&mut self, cell: Cell) -> Result<Direction> {
        self.check_bounds(cell)?;
        let direction = Direction::ALL
            .into_iter()
            .find(|&d| self.neighbour(cell, d).is_none())
            .ok_or(MazeError::NotOnPerimeter {
                x: cell.x,
                y: cell.y,
            })?;

        if let Some((old_cell, old_direction)) = self.exit.take() {
            self.insert_wall(old_cell, old_direction);
        }
        self.remove_wall(cell, direction)?;
        self.exit = Some((cell, direction));
        Ok(direction)
    }

    pub fn exit_position(&self) -> Option<Cell> {
        self.exit.map(|(cell, _)| cell)
    }

    /// The side of the exit cell that opens to the outside.
    pub fn exit_direction(&self) -> Option<Direction> {
        self.exit.map(|(_, direction)| direction)
    }

    pub fn is_exit_position(&self, cell: Cell) -> bool {
        self.exit_position() == Some(cell)
    }

    /// Counts the walls still standing between pairs of in-bounds cells.
    pub fn internal_wall_count(&self) -> usize {
        self.cells()
            .map(|cell| {
                let walls = self[cell];
                let east = cell.x + 1 < self.width && walls.contains(Direction::East);
                let south = cell.y + 1 < self.height && walls.contains(Direction::South);
                east as usize + south as usize
            })
            .sum()
    }

    /// Total number of walls between in-bounds cells in a fully walled grid.
    pub fn possible_internal_walls(&self) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        (w - 1) * h + w * (h - 1)
    }

    /// Counts the boundary walls that are missing.
    pub fn boundary_openings(&self) -> usize {
        self.cells()
            .map(|cell| {
                Direction::ALL
                    .into_iter()
                    .filter(|&d| self.neighbour(cell, d).is_none() && !self[cell].contains(d))
                    .count()
            })
            .sum()
    }
}

impl std::ops::Index<Cell> for Floorplan {
    type Output = WallSet;

    fn index(&self, index: Cell) -> &Self::Output {
        debug_assert!(self.is_in_bounds(index), "cell {index} is out of bounds");
        &self.walls[self.ravel_index(index)]
    }
}

/// Plain ASCII dump, one text row per wall line and one per cell row.
impl fmt::Display for Floorplan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let open = !self[Cell::new(x, y)].contains(Direction::North);
                write!(f, "+{}", if open { "  " } else { "--" })?;
            }
            writeln!(f, "+")?;
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let west = if self[cell].contains(Direction::West) {
                    "|"
                } else {
                    " "
                };
                let body = if self.is_exit_position(cell) {
                    "EX"
                } else if self.is_in_room(cell) {
                    "::"
                } else {
                    "  "
                };
                write!(f, "{west}{body}")?;
            }
            let last = Cell::new(self.width - 1, y);
            let east = if self[last].contains(Direction::East) {
                "|"
            } else {
                " "
            };
            writeln!(f, "{east}")?;
        }
        for x in 0..self.width {
            let open = !self[Cell::new(x, self.height - 1)].contains(Direction::South);
            write!(f, "+{}", if open { "  " } else { "--" })?;
        }
        writeln!(f, "+")
    }
}
