pub mod cell;
pub mod distance;
pub mod floorplan;

use std::fmt;

pub use cell::{Cell, Direction, WallSet};
pub use distance::Distances;
pub use floorplan::{Floorplan, Room};

use crate::{
    error::{MazeError, Result},
    generators::Builder,
    graph::EdgeWeights,
};

/// A finished maze: the carved floorplan together with its exit distance
/// field. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    floorplan: Floorplan,
    distances: Distances,
    builder: Builder,
    perfect: bool,
    /// Seed the maze was generated from, drawn from OS entropy if the order had none
    seed: u64,
    /// Only present for builders that weigh their edges
    edge_weights: Option<EdgeWeights>,
}

impl Maze {
    /// Computes the distance field of a finished floorplan and checks the
    /// maze invariants before wrapping everything up.
    ///
    /// Fails with [`MazeError::DisconnectedResult`] if a cell cannot reach the
    /// exit and with [`MazeError::InvariantViolation`] if the floorplan does
    /// not have exactly one boundary opening or, for perfect mazes, is not a
    /// spanning tree.
    pub fn assemble(
        floorplan: Floorplan,
        builder: Builder,
        perfect: bool,
        seed: u64,
        edge_weights: Option<EdgeWeights>,
    ) -> Result<Self> {
        let distances = Distances::compute(&floorplan)?;

        let unreachable = distances.unreachable_count();
        if unreachable > 0 {
            return Err(MazeError::DisconnectedResult { unreachable });
        }

        let openings = floorplan.boundary_openings();
        if openings != 1 {
            return Err(MazeError::InvariantViolation(format!(
                "expected a single boundary opening, found {openings}"
            )));
        }

        if perfect {
            let removed = floorplan.possible_internal_walls() - floorplan.internal_wall_count();
            if removed != floorplan.size() - 1 {
                return Err(MazeError::InvariantViolation(format!(
                    "perfect maze of {} cells has {removed} open internal walls",
                    floorplan.size()
                )));
            }
        }

        Ok(Maze {
            floorplan,
            distances,
            builder,
            perfect,
            seed,
            edge_weights,
        })
    }

    pub fn width(&self) -> u16 {
        self.floorplan.width()
    }

    pub fn height(&self) -> u16 {
        self.floorplan.height()
    }

    pub fn floorplan(&self) -> &Floorplan {
        &self.floorplan
    }

    pub fn distances(&self) -> &Distances {
        &self.distances
    }

    pub fn builder(&self) -> Builder {
        self.builder
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn has_wall(&self, x: u16, y: u16, direction: Direction) -> Result<bool> {
        self.floorplan.has_wall(Cell::new(x, y), direction)
    }

    pub fn is_in_room(&self, x: u16, y: u16) -> bool {
        self.floorplan.is_in_room(Cell::new(x, y))
    }

    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        self.floorplan.is_valid_position(x, y)
    }

    pub fn exit_position(&self) -> Cell {
        self.distances.exit_position()
    }

    pub fn is_exit_position(&self, x: u16, y: u16) -> bool {
        self.floorplan.is_exit_position(Cell::new(x, y))
    }

    /// The cell farthest from the exit, where a traversal should begin.
    pub fn start_position(&self) -> Cell {
        self.distances.start_position()
    }

    pub fn distance_to_exit(&self, x: u16, y: u16) -> Option<u32> {
        self.distances.distance_to_exit(Cell::new(x, y))
    }

    /// The open neighbour one step closer to the exit.
    pub fn neighbour_closer_to_exit(&self, x: u16, y: u16) -> Option<Cell> {
        self.distances
            .neighbour_closer_to_exit(&self.floorplan, Cell::new(x, y))
    }

    /// The weight the builder gave to the wall between `(x, y)` and its
    /// neighbour in `direction`. `None` if the builder did not weigh edges or
    /// the wall is on the boundary.
    pub fn edge_weight(&self, x: u16, y: u16, direction: Direction) -> Option<u32> {
        self.edge_weights
            .as_ref()
            .and_then(|w| w.weight(Cell::new(x, y), direction).ok())
    }

    pub fn edge_weights(&self) -> Option<&EdgeWeights> {
        self.edge_weights.as_ref()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.floorplan)
    }
}
