use rand::Rng;

use crate::{
    error::{MazeError, Result},
    generators::{Progress, union_find::UnionFind},
    graph::{EdgeWeights, GridGraph},
    maze::{Cell, Direction, Floorplan},
};

/// Borůvka minimum spanning tree over randomly weighted walls.
///
/// The weights are drawn when the builder is created, so they can be
/// inspected before and after carving and always read the same.
pub struct Boruvka {
    weights: EdgeWeights,
}

impl Boruvka {
    pub fn new<R: Rng>(graph: GridGraph, rng: &mut R) -> Self {
        Boruvka {
            weights: EdgeWeights::random(graph, rng),
        }
    }

    /// Weight of the wall between `cell` and its neighbour in `direction`.
    pub fn edge_weight(&self, cell: Cell, direction: Direction) -> Result<u32> {
        self.weights.weight(cell, direction)
    }

    pub fn weights(&self) -> &EdgeWeights {
        &self.weights
    }

    pub fn into_weights(self) -> EdgeWeights {
        self.weights
    }

    /// Edges compare by weight, then by index, so no two edges tie and every
    /// round picks a cycle-free set.
    fn key(&self, edge: usize) -> (u32, usize) {
        (self.weights.weight_at(edge), edge)
    }

    /// Removes the walls of the minimum spanning tree from `floorplan`, which
    /// must have the same dimensions as the weighted graph.
    pub fn carve(&self, floorplan: &mut Floorplan, progress: &mut Progress<'_>) -> Result<()> {
        let graph = *self.weights.graph();
        if graph.width() != floorplan.width() || graph.height() != floorplan.height() {
            return Err(MazeError::InvariantViolation(format!(
                "edge weights are for a {}x{} grid, floorplan is {}x{}",
                graph.width(),
                graph.height(),
                floorplan.width(),
                floorplan.height()
            )));
        }

        let nodes = graph.node_count();
        let mut components = UnionFind::new(nodes);
        let mut round = 0;

        while components.sets() > 1 {
            round += 1;

            // Cheapest outgoing edge per component, indexed by the component's root
            let mut cheapest: Vec<Option<usize>> = vec![None; nodes];
            for (idx, edge) in graph.edges().enumerate() {
                let a = components.find(graph.node_index(edge.cell()));
                let b = components.find(graph.node_index(edge.other()));
                if a == b {
                    continue;
                }
                for root in [a, b] {
                    let better = match cheapest[root] {
                        Some(current) => self.key(idx) < self.key(current),
                        None => true,
                    };
                    if better {
                        cheapest[root] = Some(idx);
                    }
                }
            }

            let mut added = 0;
            for idx in cheapest.into_iter().flatten() {
                let edge = graph.edge_at(idx);
                let a = graph.node_index(edge.cell());
                let b = graph.node_index(edge.other());
                // Two components can pick the same edge; only the first one joins them
                if components.unite(a, b) {
                    floorplan.remove_wall(edge.cell(), edge.direction())?;
                    added += 1;
                    progress.advance(nodes - components.sets() + 1)?;
                }
            }

            tracing::trace!(
                "[builder] boruvka round {round}: {added} edges, {} components left",
                components.sets()
            );
            if added == 0 {
                return Err(MazeError::DisconnectedResult {
                    unreachable: components.sets() - 1,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Unobserved, get_rng, tests::assert_spanning_tree};

    fn carved(width: u16, height: u16, seed: u64) -> (Boruvka, Floorplan) {
        let mut plan = Floorplan::new(width, height).unwrap();
        let boruvka = Boruvka::new(GridGraph::new(width, height), &mut get_rng(seed));
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        boruvka.carve(&mut plan, &mut progress).unwrap();
        (boruvka, plan)
    }

    #[test]
    fn test_boruvka_carves_spanning_tree() {
        let (_, plan) = carved(12, 15, 5);
        assert_spanning_tree(&plan);
    }

    #[test]
    fn test_edge_weights_are_stable() {
        let (boruvka, _) = carved(12, 12, 99);
        let corner = Cell::new(0, 0);
        let first = boruvka.edge_weight(corner, Direction::East).unwrap();
        let second = boruvka.edge_weight(corner, Direction::East).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_neighbour_edge_weights_match() {
        let (boruvka, _) = carved(12, 12, 99);
        assert_eq!(
            boruvka.edge_weight(Cell::new(0, 0), Direction::East),
            boruvka.edge_weight(Cell::new(1, 0), Direction::West)
        );
        assert_eq!(
            boruvka.edge_weight(Cell::new(4, 7), Direction::South),
            boruvka.edge_weight(Cell::new(4, 8), Direction::North)
        );
    }

    #[test]
    fn test_tree_is_minimum() {
        // The carved tree must weigh no more than the one Kruskal's greedy
        // scan over the same total order would build.
        let (boruvka, plan) = carved(8, 8, 17);
        let graph = *boruvka.weights().graph();

        let mut order = (0..graph.edge_count()).collect::<Vec<_>>();
        order.sort_by_key(|&idx| boruvka.key(idx));
        let mut uf = UnionFind::new(graph.node_count());
        let kruskal: u64 = order
            .into_iter()
            .filter(|&idx| {
                let edge = graph.edge_at(idx);
                let a = graph.node_index(edge.cell());
                uf.unite(a, graph.node_index(edge.other()))
            })
            .map(|idx| u64::from(boruvka.weights().weight_at(idx)))
            .sum();

        let carved: u64 = graph
            .edges()
            .enumerate()
            .filter(|(_, edge)| !plan[edge.cell()].contains(edge.direction()))
            .map(|(idx, _)| u64::from(boruvka.weights().weight_at(idx)))
            .sum();
        assert_eq!(carved, kruskal);
    }

    #[test]
    fn test_mismatched_floorplan() {
        let boruvka = Boruvka::new(GridGraph::new(4, 4), &mut get_rng(0));
        let mut plan = Floorplan::new(5, 4).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        assert!(matches!(
            boruvka.carve(&mut plan, &mut progress),
            Err(MazeError::InvariantViolation(_))
        ));
    }
}
