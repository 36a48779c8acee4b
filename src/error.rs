//! Error types for maze construction and delivery

use thiserror::Error;

/// Every failure a maze build or a floorplan query can report.
///
/// The type is `Clone` because a failed build is handed to every caller
/// waiting on the same order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("Invalid maze dimensions {width}x{height}")]
    InvalidDimension { width: u16, height: u16 },

    #[error("Cell ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Cell ({x}, {y}) is not on the maze perimeter")]
    NotOnPerimeter { x: u16, y: u16 },

    #[error("Floorplan has no exit")]
    NoExit,

    #[error("Maze is disconnected: {unreachable} cells cannot reach the exit")]
    DisconnectedResult { unreachable: usize },

    #[error("Maze invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Order has already been submitted")]
    DoubleSubmission,

    #[error("Order has already been delivered")]
    DoubleDelivery,

    #[error("Factory is busy with another order")]
    FactoryBusy,

    #[error("No maze dimensions configured for skill level {0}")]
    UnknownSkill(u8),

    #[error("Build was cancelled")]
    Cancelled,

    #[error("Maze worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Maze worker is no longer running")]
    WorkerStopped,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MazeError {
    pub(crate) fn out_of_bounds(x: impl Into<i32>, y: impl Into<i32>) -> Self {
        MazeError::OutOfBounds {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl From<toml::de::Error> for MazeError {
    fn from(e: toml::de::Error) -> Self {
        MazeError::Config(e.to_string())
    }
}

impl From<std::io::Error> for MazeError {
    fn from(e: std::io::Error) -> Self {
        MazeError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MazeError>;
