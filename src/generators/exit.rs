use rand::{Rng, rngs::StdRng};

use crate::{
    error::Result,
    maze::{Cell, Distances, Floorplan, distance::flood_fill},
};

/// Opens the exit on the perimeter cell farthest from a random cell.
///
/// Distances are measured through the carved passages. Ties go to the
/// lowest row-major position. Returns the exit cell.
pub fn place_exit(floorplan: &mut Floorplan, rng: &mut StdRng) -> Result<Cell> {
    let origin = Cell::new(
        rng.random_range(0..floorplan.width()),
        rng.random_range(0..floorplan.height()),
    );
    let distances = flood_fill(floorplan, origin);

    let mut exit = None;
    let mut farthest = 0;
    for cell in floorplan.cells().filter(|&c| floorplan.is_on_perimeter(c)) {
        let d = distances[floorplan.ravel_index(cell)];
        if d == Distances::UNREACHABLE {
            continue;
        }
        if exit.is_none() || d > farthest {
            exit = Some(cell);
            farthest = d;
        }
    }

    // The origin itself is always reachable, so an unreachable perimeter can
    // only happen on a disconnected floorplan; fall back to the corner.
    let exit = exit.unwrap_or(Cell::new(0, 0));
    let direction = floorplan.set_exit_position(exit)?;
    tracing::debug!(
        "[builder] exit placed at {} facing {}, {} steps from {}",
        exit,
        direction,
        farthest,
        origin
    );
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Progress, Unobserved, get_rng, randomized_prim};

    #[test]
    fn test_exit_is_single_perimeter_opening() {
        for seed in 0..10 {
            let mut plan = Floorplan::new(8, 5).unwrap();
            let mut rng = get_rng(seed);
            let mut progress = Progress::new(&Unobserved, plan.size(), 100);
            randomized_prim(&mut plan, &mut rng, &mut progress).unwrap();
            let exit = place_exit(&mut plan, &mut rng).unwrap();
            assert!(plan.is_on_perimeter(exit));
            assert!(plan.is_exit_position(exit));
            assert_eq!(plan.boundary_openings(), 1);
        }
    }

    #[test]
    fn test_exit_on_corridor_end() {
        // Straight corridor: wherever the origin lands, an end is farthest
        let mut plan = Floorplan::new(6, 1).unwrap();
        for x in 0..5 {
            plan.remove_wall(Cell::new(x, 0), crate::maze::Direction::East)
                .unwrap();
        }
        let exit = place_exit(&mut plan, &mut get_rng(1)).unwrap();
        assert!(exit == Cell::new(0, 0) || exit == Cell::new(5, 0));
    }
}
