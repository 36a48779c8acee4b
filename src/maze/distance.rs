use std::collections::VecDeque;

use crate::error::{MazeError, Result};
use crate::maze::cell::{Cell, Direction};
use crate::maze::floorplan::Floorplan;

/// Steps-to-exit for every cell of a finished floorplan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distances {
    /// Row-major distances, [`Distances::UNREACHABLE`] for cells the BFS never reached
    distances: Box<[u32]>,
    width: u16,
    height: u16,
    exit: Cell,
    max_distance: u32,
    /// Farthest cell from the exit
    start: Cell,
}

impl Distances {
    /// Sentinel stored for cells that have no path to the exit.
    pub const UNREACHABLE: u32 = u32::MAX;

    /// Breadth-first search from the floorplan's exit along open adjacencies.
    ///
    /// Fails with [`MazeError::NoExit`] if no exit has been placed yet.
    pub fn compute(floorplan: &Floorplan) -> Result<Self> {
        let exit = floorplan.exit_position().ok_or(MazeError::NoExit)?;

        let distances = flood_fill(floorplan, exit);

        // Row-major scan with a strict comparison keeps the lowest (y, x) on ties
        let (start_idx, max_distance) = distances
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, d)| d != Self::UNREACHABLE)
            .fold((floorplan.ravel_index(exit), 0), |best, (idx, d)| {
                if d > best.1 { (idx, d) } else { best }
            });

        Ok(Distances {
            distances,
            width: floorplan.width(),
            height: floorplan.height(),
            exit,
            max_distance,
            start: floorplan.unravel_index(start_idx),
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.x < self.width && cell.y < self.height)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Steps from `cell` to the exit. `None` for unreachable or out-of-bounds cells.
    pub fn distance_to_exit(&self, cell: Cell) -> Option<u32> {
        self.index(cell)
            .map(|idx| self.distances[idx])
            .filter(|&d| d != Self::UNREACHABLE)
    }

    pub fn is_reachable(&self, cell: Cell) -> bool {
        self.distance_to_exit(cell).is_some()
    }

    pub fn exit_position(&self) -> Cell {
        self.exit
    }

    /// The cell farthest from the exit, lowest row-major position on ties.
    pub fn start_position(&self) -> Cell {
        self.start
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn unreachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|&&d| d == Self::UNREACHABLE)
            .count()
    }

    /// An open neighbour of `cell` that is one step closer to the exit,
    /// checked in N, E, S, W order. `None` at the exit or for unreachable cells.
    pub fn neighbour_closer_to_exit(&self, floorplan: &Floorplan, cell: Cell) -> Option<Cell> {
        let here = self.distance_to_exit(cell)?;
        Direction::ALL
            .into_iter()
            .filter(|&d| floorplan.is_open(cell, d))
            .filter_map(|d| floorplan.neighbour(cell, d))
            .find(|&n| self.distance_to_exit(n).is_some_and(|d| d < here))
    }
}

/// Breadth-first steps from `source` to every cell, following open walls
/// only. Cells never reached keep [`Distances::UNREACHABLE`].
pub(crate) fn flood_fill(floorplan: &Floorplan, source: Cell) -> Box<[u32]> {
    let mut distances = vec![Distances::UNREACHABLE; floorplan.size()].into_boxed_slice();
    distances[floorplan.ravel_index(source)] = 0;

    // Edges are unweighted, so the first time a cell is reached is via a
    // shortest path and the distance never has to be revised.
    let mut frontier = VecDeque::from([source]);
    while let Some(cell) = frontier.pop_front() {
        let next = distances[floorplan.ravel_index(cell)] + 1;
        for neighbour in floorplan.open_neighbours(cell) {
            let idx = floorplan.ravel_index(neighbour);
            if distances[idx] == Distances::UNREACHABLE {
                distances[idx] = next;
                frontier.push_back(neighbour);
            }
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 open in a U shape:
    /// (0,0) (1,0) (2,0)
    /// (0,1)   |   (2,1)
    fn u_shaped() -> Floorplan {
        let mut plan = Floorplan::new(3, 2).unwrap();
        plan.remove_wall(Cell::new(0, 0), Direction::East).unwrap();
        plan.remove_wall(Cell::new(1, 0), Direction::East).unwrap();
        plan.remove_wall(Cell::new(0, 0), Direction::South).unwrap();
        plan.remove_wall(Cell::new(2, 0), Direction::South).unwrap();
        plan.set_exit_position(Cell::new(0, 1)).unwrap();
        plan
    }

    #[test]
    fn test_requires_exit() {
        let plan = Floorplan::new(3, 3).unwrap();
        assert_eq!(Distances::compute(&plan), Err(MazeError::NoExit));
    }

    #[test]
    fn test_distances_on_u_shape() {
        let plan = u_shaped();
        let dists = Distances::compute(&plan).unwrap();
        assert_eq!(dists.distance_to_exit(Cell::new(0, 1)), Some(0));
        assert_eq!(dists.distance_to_exit(Cell::new(0, 0)), Some(1));
        assert_eq!(dists.distance_to_exit(Cell::new(1, 0)), Some(2));
        assert_eq!(dists.distance_to_exit(Cell::new(2, 0)), Some(3));
        assert_eq!(dists.distance_to_exit(Cell::new(2, 1)), Some(4));
        // Walled-off cell
        assert_eq!(dists.distance_to_exit(Cell::new(1, 1)), None);
        assert_eq!(dists.unreachable_count(), 1);
        assert_eq!(dists.max_distance(), 4);
        assert_eq!(dists.start_position(), Cell::new(2, 1));
        assert_eq!(dists.distance_to_exit(Cell::new(9, 9)), None);
    }

    #[test]
    fn test_neighbour_closer_to_exit() {
        let plan = u_shaped();
        let dists = Distances::compute(&plan).unwrap();
        assert_eq!(
            dists.neighbour_closer_to_exit(&plan, Cell::new(2, 1)),
            Some(Cell::new(2, 0))
        );
        assert_eq!(
            dists.neighbour_closer_to_exit(&plan, Cell::new(0, 0)),
            Some(Cell::new(0, 1))
        );
        assert_eq!(dists.neighbour_closer_to_exit(&plan, Cell::new(0, 1)), None);
        assert_eq!(dists.neighbour_closer_to_exit(&plan, Cell::new(1, 1)), None);
    }

    #[test]
    fn test_start_ties_pick_lowest_row_major() {
        // Fully open 3x1 corridor with the exit in the middle: both ends are 1 away
        let mut plan = Floorplan::new(3, 1).unwrap();
        plan.remove_wall(Cell::new(0, 0), Direction::East).unwrap();
        plan.remove_wall(Cell::new(1, 0), Direction::East).unwrap();
        plan.set_exit_position(Cell::new(1, 0)).unwrap();
        let dists = Distances::compute(&plan).unwrap();
        assert_eq!(dists.max_distance(), 1);
        assert_eq!(dists.start_position(), Cell::new(0, 0));
    }

    #[test]
    fn test_single_cell() {
        let mut plan = Floorplan::new(1, 1).unwrap();
        plan.set_exit_position(Cell::new(0, 0)).unwrap();
        let dists = Distances::compute(&plan).unwrap();
        assert_eq!(dists.start_position(), Cell::new(0, 0));
        assert_eq!(dists.max_distance(), 0);
    }
}
