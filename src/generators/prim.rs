use rand::{Rng, rngs::StdRng};

use crate::{
    error::Result,
    generators::{Progress, ensure_spanning},
    graph::GridGraph,
    maze::{Cell, Direction, Floorplan},
};

/// Randomized Prim: grows the tree from a random cell by repeatedly taking a
/// uniformly random edge off the frontier.
pub fn randomized_prim(
    floorplan: &mut Floorplan,
    rng: &mut StdRng,
    progress: &mut Progress<'_>,
) -> Result<()> {
    let graph = GridGraph::new(floorplan.width(), floorplan.height());
    let mut in_tree = vec![false; graph.node_count()];

    // Initialize the starting point
    let start = Cell::new(
        rng.random_range(0..graph.width()),
        rng.random_range(0..graph.height()),
    );
    in_tree[graph.node_index(start)] = true;
    let mut joined = 1;

    // Edges leaving the tree, stored as (tree cell, direction, outside cell).
    // An edge may go stale once its outside cell joins through another edge.
    let mut frontier: Vec<(Cell, Direction, Cell)> = graph
        .neighbours(start)
        .map(|(d, n)| (start, d, n))
        .collect();

    while !frontier.is_empty() {
        // Randomly select an edge from the frontier
        let idx = rng.random_range(0..frontier.len());
        let (cell, direction, outside) = frontier.swap_remove(idx);
        if in_tree[graph.node_index(outside)] {
            continue;
        }

        // Carve a passage between the tree and the new cell
        floorplan.remove_wall(cell, direction)?;
        in_tree[graph.node_index(outside)] = true;
        joined += 1;
        progress.advance(joined)?;

        frontier.extend(
            graph
                .neighbours(outside)
                .filter(|&(_, n)| !in_tree[graph.node_index(n)])
                .map(|(d, n)| (outside, d, n)),
        );
    }

    ensure_spanning(joined, graph.node_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Unobserved, get_rng, tests::assert_spanning_tree};

    #[test]
    fn test_randomized_prim() {
        let mut plan = Floorplan::new(7, 7).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        randomized_prim(&mut plan, &mut get_rng(0), &mut progress).unwrap();
        assert_spanning_tree(&plan);
        assert_eq!(plan.boundary_openings(), 0);
    }

    #[test]
    fn test_randomized_prim_wide() {
        let mut plan = Floorplan::new(40, 3).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        randomized_prim(&mut plan, &mut get_rng(11), &mut progress).unwrap();
        assert_spanning_tree(&plan);
    }
}
