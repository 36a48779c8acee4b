//! Implicit 4-neighbour graph over the cells of a grid, and the per-edge
//! weights used by the minimum spanning tree builder.

use rand::Rng;

use crate::error::{MazeError, Result};
use crate::maze::{Cell, Direction};

/// Edge between two horizontally or vertically adjacent cells.
///
/// Edges only come out of [`GridGraph`], always in canonical form:
/// `direction` is either `East` or `South`, so each shared wall has exactly
/// one representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    cell: Cell,
    direction: Direction,
}

impl Edge {
    /// The western or northern end of the edge.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// `East` or `South`.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The cell on the far side of the edge.
    pub fn other(&self) -> Cell {
        match self.direction {
            Direction::East => Cell::new(self.cell.x + 1, self.cell.y),
            _ => Cell::new(self.cell.x, self.cell.y + 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGraph {
    width: u16,
    height: u16,
}

impl GridGraph {
    pub fn new(width: u16, height: u16) -> Self {
        GridGraph { width, height }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn node_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn east_edge_count(&self) -> usize {
        (self.width as usize).saturating_sub(1) * self.height as usize
    }

    pub fn edge_count(&self) -> usize {
        self.east_edge_count() + self.width as usize * (self.height as usize).saturating_sub(1)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major index of a cell, used as the node id.
    pub fn node_index(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    pub fn node_at(&self, index: usize) -> Cell {
        let width = self.width as usize;
        Cell::new((index % width) as u16, (index / width) as u16)
    }

    /// Adjacent in-bounds cells with the direction leading to each of them.
    pub fn neighbours(&self, cell: Cell) -> impl Iterator<Item = (Direction, Cell)> + use<> {
        let graph = *self;
        Direction::ALL.into_iter().filter_map(move |d| {
            cell.step(d)
                .filter(|&n| graph.contains(cell) && graph.contains(n))
                .map(|n| (d, n))
        })
    }

    /// Canonical form of the edge leaving `cell` in `direction`, or `None`
    /// when it would cross the grid boundary.
    pub fn canonical(&self, cell: Cell, direction: Direction) -> Option<Edge> {
        let neighbour = cell.step(direction).filter(|&n| self.contains(n))?;
        if !self.contains(cell) {
            return None;
        }
        Some(match direction {
            Direction::East | Direction::South => Edge { cell, direction },
            Direction::West => Edge {
                cell: neighbour,
                direction: Direction::East,
            },
            Direction::North => Edge {
                cell: neighbour,
                direction: Direction::South,
            },
        })
    }

    /// Dense index of the edge: East edges in row-major order first, then
    /// South edges in row-major order. The same wall seen from either side
    /// maps to the same index.
    pub fn edge_index(&self, cell: Cell, direction: Direction) -> Option<usize> {
        let edge = self.canonical(cell, direction)?;
        let (x, y) = (edge.cell.x as usize, edge.cell.y as usize);
        Some(match edge.direction {
            Direction::East => y * (self.width as usize - 1) + x,
            _ => self.east_edge_count() + y * self.width as usize + x,
        })
    }

    pub fn edge_at(&self, index: usize) -> Edge {
        let east = self.east_edge_count();
        if index < east {
            let row = self.width as usize - 1;
            Edge {
                cell: Cell::new((index % row) as u16, (index / row) as u16),
                direction: Direction::East,
            }
        } else {
            let index = index - east;
            let row = self.width as usize;
            Edge {
                cell: Cell::new((index % row) as u16, (index / row) as u16),
                direction: Direction::South,
            }
        }
    }

    /// All edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + use<> {
        let graph = *self;
        (0..graph.edge_count()).map(move |i| graph.edge_at(i))
    }
}

/// Random integer weight for every edge of a [`GridGraph`].
///
/// Weights are drawn once, when the table is built, and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWeights {
    graph: GridGraph,
    weights: Box<[u32]>,
}

impl EdgeWeights {
    pub fn random<R: Rng>(graph: GridGraph, rng: &mut R) -> Self {
        let weights = (0..graph.edge_count())
            .map(|_| rng.random::<u32>())
            .collect::<Box<[u32]>>();
        EdgeWeights { graph, weights }
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// Weight of the wall between `cell` and its neighbour in `direction`.
    pub fn weight(&self, cell: Cell, direction: Direction) -> Result<u32> {
        self.graph
            .edge_index(cell, direction)
            .map(|idx| self.weights[idx])
            .ok_or_else(|| {
                let (dx, dy) = direction.offset();
                if self.graph.contains(cell) {
                    MazeError::out_of_bounds(i32::from(cell.x) + dx, i32::from(cell.y) + dy)
                } else {
                    MazeError::out_of_bounds(cell.x, cell.y)
                }
            })
    }

    pub fn weight_at(&self, index: usize) -> u32 {
        self.weights[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_edge_count() {
        let graph = GridGraph::new(4, 3);
        assert_eq!(graph.edge_count(), 3 * 3 + 4 * 2);
        assert_eq!(graph.edges().count(), graph.edge_count());
        assert_eq!(GridGraph::new(1, 1).edge_count(), 0);
        assert_eq!(GridGraph::new(1, 5).edge_count(), 4);
    }

    #[test]
    fn test_edge_index_round_trips_and_is_symmetric() {
        let graph = GridGraph::new(5, 4);
        for (idx, edge) in graph.edges().enumerate() {
            assert_eq!(graph.edge_index(edge.cell, edge.direction), Some(idx));
            assert_eq!(
                graph.edge_index(edge.other(), edge.direction.opposite()),
                Some(idx)
            );
        }
    }

    #[test]
    fn test_canonical_edges_point_east_or_south() {
        let graph = GridGraph::new(3, 3);
        let centre = Cell::new(1, 1);
        for (direction, neighbour) in graph.neighbours(centre) {
            let edge = graph.canonical(centre, direction).unwrap();
            assert!(matches!(
                edge.direction(),
                Direction::East | Direction::South
            ));
            let ends = [edge.cell(), edge.other()];
            assert!(ends.contains(&centre) && ends.contains(&neighbour));
        }
        assert_eq!(graph.canonical(Cell::new(0, 0), Direction::West), None);
    }

    #[test]
    fn test_boundary_has_no_edge() {
        let graph = GridGraph::new(3, 3);
        assert_eq!(graph.edge_index(Cell::new(0, 0), Direction::North), None);
        assert_eq!(graph.edge_index(Cell::new(2, 1), Direction::East), None);
        assert_eq!(graph.edge_index(Cell::new(3, 1), Direction::West), None);
    }

    #[test]
    fn test_neighbours() {
        let graph = GridGraph::new(3, 3);
        let corner = graph.neighbours(Cell::new(0, 0)).collect::<Vec<_>>();
        assert_eq!(
            corner,
            vec![
                (Direction::East, Cell::new(1, 0)),
                (Direction::South, Cell::new(0, 1))
            ]
        );
        assert_eq!(graph.neighbours(Cell::new(1, 1)).count(), 4);
    }

    #[test]
    fn test_weights_are_stable_and_symmetric() {
        let graph = GridGraph::new(6, 6);
        let weights = EdgeWeights::random(graph, &mut StdRng::seed_from_u64(7));
        let w = weights.weight(Cell::new(0, 0), Direction::East).unwrap();
        assert_eq!(weights.weight(Cell::new(0, 0), Direction::East), Ok(w));
        assert_eq!(weights.weight(Cell::new(1, 0), Direction::West), Ok(w));
        assert_eq!(
            weights.weight(Cell::new(2, 3), Direction::South),
            weights.weight(Cell::new(2, 4), Direction::North)
        );
        assert_eq!(
            weights.weight(Cell::new(0, 0), Direction::West),
            Err(MazeError::OutOfBounds { x: -1, y: 0 })
        );
    }
}
