use rand::{Rng, rngs::StdRng};

use crate::{
    error::Result,
    generators::{Progress, ensure_spanning},
    graph::GridGraph,
    maze::{Cell, Floorplan},
};

/// Carves a spanning tree with an iterative randomized depth-first search.
pub fn randomized_dfs(
    floorplan: &mut Floorplan,
    rng: &mut StdRng,
    progress: &mut Progress<'_>,
) -> Result<()> {
    let graph = GridGraph::new(floorplan.width(), floorplan.height());
    let mut visited = vec![false; graph.node_count()];

    // Initialize the starting point
    let start = Cell::new(
        rng.random_range(0..graph.width()),
        rng.random_range(0..graph.height()),
    );
    visited[graph.node_index(start)] = true;
    let mut joined = 1;

    // The stack keeps only cells already in the tree
    let mut stack = vec![start];

    while let Some(cell) = stack.pop() {
        let neighbours = graph
            .neighbours(cell)
            .filter(|&(_, n)| !visited[graph.node_index(n)])
            .collect::<Vec<_>>();

        if !neighbours.is_empty() {
            let (direction, neighbour) = neighbours[rng.random_range(0..neighbours.len())];
            floorplan.remove_wall(cell, direction)?;
            visited[graph.node_index(neighbour)] = true;
            joined += 1;
            progress.advance(joined)?;

            // Put the cell back first so we can look at another neighbour of this cell later
            stack.push(cell);
            // Put the neighbour to carve the maze in that neighbour's direction
            stack.push(neighbour);
        }
    }

    ensure_spanning(joined, graph.node_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Unobserved, get_rng, tests::assert_spanning_tree};

    #[test]
    fn test_randomized_dfs() {
        let mut plan = Floorplan::new(7, 7).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        randomized_dfs(&mut plan, &mut get_rng(0), &mut progress).unwrap();
        assert_spanning_tree(&plan);
        // Carving never touches the boundary
        assert_eq!(plan.boundary_openings(), 0);
    }

    #[test]
    fn test_randomized_dfs_corridor() {
        let mut plan = Floorplan::new(1, 8).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        randomized_dfs(&mut plan, &mut get_rng(3), &mut progress).unwrap();
        assert_eq!(plan.internal_wall_count(), 0);
    }
}
