use std::str::FromStr;

use rand::{SeedableRng, rngs::StdRng};

mod boruvka;
mod dfs;
mod exit;
mod prim;
mod rooms;
mod union_find;

pub use boruvka::Boruvka;
pub use dfs::randomized_dfs;
pub use exit::place_exit;
pub use prim::randomized_prim;
pub use rooms::{MAX_ROOM_ATTEMPTS, open_rooms};

use crate::{
    error::{MazeError, Result},
    graph::{EdgeWeights, GridGraph},
    maze::{Floorplan, Maze},
};

/// Get a random number generator seeded for reproducibility.
pub fn get_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Spanning tree construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builder {
    Dfs,
    Prim,
    Boruvka,
}

impl Builder {
    pub const ALL: [Builder; 3] = [Builder::Dfs, Builder::Prim, Builder::Boruvka];
}

impl std::fmt::Display for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Builder::Dfs => write!(f, "Randomized Depth-First Search (DFS)"),
            Builder::Prim => write!(f, "Prim's Algorithm"),
            Builder::Boruvka => write!(f, "Borůvka's Algorithm"),
        }
    }
}

impl FromStr for Builder {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" => Ok(Builder::Dfs),
            "prim" => Ok(Builder::Prim),
            "boruvka" | "borůvka" => Ok(Builder::Boruvka),
            other => Err(MazeError::Config(format!("unknown builder '{other}'"))),
        }
    }
}

/// Receives progress from a running builder and tells it when to give up.
pub trait BuildObserver: Sync {
    fn is_cancelled(&self) -> bool {
        false
    }

    /// Called with a percentage in `0..=100` whenever it changes.
    fn report_progress(&self, _percent: u8) {}
}

/// Observer for builds nobody is watching.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unobserved;

impl BuildObserver for Unobserved {}

/// Tracks how many cells a builder has joined to the tree and forwards the
/// percentage to the observer, scaled into `0..=ceiling`.
pub struct Progress<'a> {
    observer: &'a dyn BuildObserver,
    total: usize,
    ceiling: u8,
    last: u8,
}

impl<'a> Progress<'a> {
    pub fn new(observer: &'a dyn BuildObserver, total: usize, ceiling: u8) -> Self {
        Progress {
            observer,
            total: total.max(1),
            ceiling,
            last: 0,
        }
    }

    /// Records that `done` cells are now connected. Fails with
    /// [`MazeError::Cancelled`] once the observer asks the build to stop.
    pub fn advance(&mut self, done: usize) -> Result<()> {
        if self.observer.is_cancelled() {
            return Err(MazeError::Cancelled);
        }
        let percent = (done.min(self.total) * self.ceiling as usize / self.total) as u8;
        if percent != self.last {
            self.last = percent;
            self.observer.report_progress(percent);
        }
        Ok(())
    }
}

/// Fails unless a builder joined every cell of the grid.
fn ensure_spanning(joined: usize, total: usize) -> Result<()> {
    if joined == total {
        Ok(())
    } else {
        Err(MazeError::DisconnectedResult {
            unreachable: total - joined,
        })
    }
}

/// Carve a spanning tree into a fully walled floorplan with the selected
/// builder. Returns the edge weights when the builder uses them.
pub fn carve_maze(
    floorplan: &mut Floorplan,
    builder: Builder,
    rng: &mut StdRng,
    progress: &mut Progress<'_>,
) -> Result<Option<EdgeWeights>> {
    tracing::debug!(
        "[builder] carving {}x{} floorplan with {}",
        floorplan.width(),
        floorplan.height(),
        builder
    );
    match builder {
        Builder::Dfs => randomized_dfs(floorplan, rng, progress).map(|_| None),
        Builder::Prim => randomized_prim(floorplan, rng, progress).map(|_| None),
        Builder::Boruvka => {
            let graph = GridGraph::new(floorplan.width(), floorplan.height());
            let boruvka = Boruvka::new(graph, rng);
            boruvka.carve(floorplan, progress)?;
            Ok(Some(boruvka.into_weights()))
        }
    }
}

/// Everything needed to generate one maze, with the skill level already
/// resolved to concrete dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blueprint {
    pub width: u16,
    pub height: u16,
    pub builder: Builder,
    pub perfect: bool,
    /// Rooms to open when the maze is not perfect. At least one is opened
    /// unless the floorplan is a single cell.
    pub rooms: usize,
    pub max_room_size: u16,
    pub seed: u64,
}

/// Share of the progress bar spent carving the tree; the rest covers rooms,
/// exit placement and the distance field.
const CARVE_PROGRESS: u8 = 90;

/// Runs the whole generation pipeline: carve a spanning tree, open rooms for
/// imperfect mazes, place the exit and compute the distance field.
///
/// The same blueprint always produces the same maze.
pub fn generate_maze(blueprint: &Blueprint, observer: &dyn BuildObserver) -> Result<Maze> {
    let mut floorplan = Floorplan::new(blueprint.width, blueprint.height)?;
    let mut rng = get_rng(blueprint.seed);

    let mut progress = Progress::new(observer, floorplan.size(), CARVE_PROGRESS);
    let edge_weights = carve_maze(&mut floorplan, blueprint.builder, &mut rng, &mut progress)?;

    if !blueprint.perfect {
        let opened = open_rooms(
            &mut floorplan,
            &mut rng,
            blueprint.rooms.max(1),
            blueprint.max_room_size,
        )?;
        tracing::debug!("[builder] opened {opened} rooms");
    }
    if observer.is_cancelled() {
        return Err(MazeError::Cancelled);
    }

    place_exit(&mut floorplan, &mut rng)?;
    let maze = Maze::assemble(
        floorplan,
        blueprint.builder,
        blueprint.perfect,
        blueprint.seed,
        edge_weights,
    )?;
    observer.report_progress(100);
    Ok(maze)
}
