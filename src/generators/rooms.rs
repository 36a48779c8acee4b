use rand::{Rng, rngs::StdRng};

use crate::{
    error::Result,
    maze::{Cell, Floorplan, Room},
};

/// How many placements are tried for each room before giving up on it.
pub const MAX_ROOM_ATTEMPTS: usize = 25;

/// Smallest room side, where the floorplan allows it.
const MIN_ROOM_SIZE: u16 = 2;

/// Dead ends of the carved tree that are not already part of a room.
fn dead_ends(floorplan: &Floorplan) -> Vec<Cell> {
    floorplan
        .cells()
        .filter(|&c| !floorplan.is_in_room(c) && floorplan.open_neighbours(c).count() == 1)
        .collect()
}

/// Opens up to `count` non-overlapping rectangular rooms in a carved
/// floorplan. Each room covers a random dead end of the tree and has sides
/// between 2 and `max_size` cells, clamped to the floorplan.
///
/// Returns the number of rooms opened. Only walls are removed, so every cell
/// stays reachable. A single-cell floorplan has no room to open and always
/// gets none.
pub fn open_rooms(
    floorplan: &mut Floorplan,
    rng: &mut StdRng,
    count: usize,
    max_size: u16,
) -> Result<usize> {
    let (width, height) = (floorplan.width(), floorplan.height());
    if width < MIN_ROOM_SIZE && height < MIN_ROOM_SIZE {
        return Ok(0);
    }
    let max_size = max_size.max(MIN_ROOM_SIZE);

    let mut opened = 0;
    for _ in 0..count {
        for _ in 0..MAX_ROOM_ATTEMPTS {
            let leaves = dead_ends(floorplan);
            if leaves.is_empty() {
                return Ok(opened);
            }
            let anchor = leaves[rng.random_range(0..leaves.len())];

            let room_width = rng.random_range(MIN_ROOM_SIZE..=max_size).min(width);
            let room_height = rng.random_range(MIN_ROOM_SIZE..=max_size).min(height);

            // Any top-left corner keeping the anchor inside and the room on the grid
            let x = rng.random_range(
                anchor.x.saturating_sub(room_width - 1)..=anchor.x.min(width - room_width),
            );
            let y = rng.random_range(
                anchor.y.saturating_sub(room_height - 1)..=anchor.y.min(height - room_height),
            );
            let room = Room::new(x, y, room_width, room_height);

            if room.cells().any(|c| floorplan.is_in_room(c)) {
                continue;
            }
            floorplan.mark_room(room)?;
            tracing::trace!(
                "[builder] opened room {:?} around dead end {}",
                room,
                anchor
            );
            opened += 1;
            break;
        }
    }
    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Progress, Unobserved, get_rng, randomized_dfs};
    use crate::maze::{Direction, Distances};

    fn carved(width: u16, height: u16, seed: u64) -> Floorplan {
        let mut plan = Floorplan::new(width, height).unwrap();
        let mut progress = Progress::new(&Unobserved, plan.size(), 100);
        randomized_dfs(&mut plan, &mut get_rng(seed), &mut progress).unwrap();
        plan
    }

    #[test]
    fn test_rooms_have_no_internal_walls() {
        let mut plan = carved(20, 20, 4);
        let opened = open_rooms(&mut plan, &mut get_rng(4), 5, 5).unwrap();
        assert!(opened >= 1);
        assert_eq!(plan.rooms().len(), opened);

        for room in plan.rooms() {
            for cell in room.cells() {
                assert!(plan.is_in_room(cell));
                if room.contains(Cell::new(cell.x + 1, cell.y)) {
                    assert_eq!(plan.has_wall(cell, Direction::East), Ok(false));
                }
                if room.contains(Cell::new(cell.x, cell.y + 1)) {
                    assert_eq!(plan.has_wall(cell, Direction::South), Ok(false));
                }
            }
        }
    }

    #[test]
    fn test_rooms_do_not_overlap() {
        let mut plan = carved(15, 15, 8);
        open_rooms(&mut plan, &mut get_rng(8), 10, 4).unwrap();
        let rooms = plan.rooms();
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(a.cells().all(|c| !b.contains(c)), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_rooms_keep_everything_reachable() {
        let mut plan = carved(12, 12, 2);
        open_rooms(&mut plan, &mut get_rng(2), 4, 4).unwrap();
        plan.set_exit_position(Cell::new(0, 0)).unwrap();
        assert_eq!(plan.boundary_openings(), 1);
        assert_eq!(Distances::compute(&plan).unwrap().unreachable_count(), 0);
    }

    #[test]
    fn test_narrow_floorplan_rooms() {
        let mut plan = carved(1, 6, 0);
        let opened = open_rooms(&mut plan, &mut get_rng(0), 1, 3).unwrap();
        assert_eq!(opened, 1);
        assert_eq!(plan.rooms()[0].width, 1);

        let mut single = carved(1, 1, 0);
        assert_eq!(open_rooms(&mut single, &mut get_rng(0), 3, 3), Ok(0));
    }
}
