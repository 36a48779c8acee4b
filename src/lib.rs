//! Randomized maze generation.
//!
//! Mazes are carved as spanning trees of a rectangular grid by one of several
//! [`Builder`]s, optionally opened up with rooms, given a single exit on the
//! perimeter and annotated with every cell's distance to that exit. Builds
//! run on a [`MazeFactory`] worker thread and are handed back through an
//! [`Order`] exactly once.

pub mod config;
pub mod error;
pub mod factory;
pub mod generators;
pub mod graph;
pub mod maze;

pub use config::{BusyPolicy, FactoryConfig, SkillLevel};
pub use error::{MazeError, Result};
pub use factory::{MazeFactory, Order};
pub use generators::Builder;
pub use maze::{Cell, Direction, Maze};
