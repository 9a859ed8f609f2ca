//! Breadth-first planar embedding of the intersections.
//!
//! The input gives each intersection's roads in clockwise order from north
//! but no coordinates, and neighbouring intersections may disagree on which
//! way "north" is.  Starting from intersection 0 at the origin, every road is
//! assigned an absolute heading and every intersection a grid position one
//! unit away from the neighbour it was discovered from.  Intersections on
//! the extreme row or column are flagged as boundary.

use std::collections::VecDeque;

use tp_core::{Approach, CrossId};

use crate::{Intersection, NetworkError, NetworkResult, Road};

/// Unit grid step for an absolute heading.
fn step(heading: Approach) -> (i32, i32) {
    match heading {
        Approach::North => (0, 1),
        Approach::East  => (1, 0),
        Approach::South => (0, -1),
        Approach::West  => (-1, 0),
    }
}

/// Assign `x`, `y`, and `boundary` on every intersection.
pub(crate) fn embed(roads: &[Road], crosses: &mut [Intersection]) -> NetworkResult<()> {
    let total = crosses.len();
    // Absolute heading of each road's forward direction, once known.
    let mut heading: Vec<Option<Approach>> = vec![None; roads.len()];
    let mut placed = vec![false; total];
    let mut queue = VecDeque::new();

    placed[0] = true;
    crosses[0].x = 0;
    crosses[0].y = 0;
    queue.push_back(CrossId(0));
    let mut reached = 1;

    while let Some(here) = queue.pop_front() {
        let cross = &crosses[here.index()];

        // Anchor: one local slot whose absolute heading is known.
        let anchor = if here.index() == 0 {
            Approach::ALL
                .into_iter()
                .find(|&s| cross.road_at(s).is_some())
                .map(|s| (s, s))
        } else {
            Approach::ALL.into_iter().find_map(|s| {
                let road = cross.road_at(s)?;
                let h = heading[road.index()]?;
                let abs = if roads[road.index()].from == here { h } else { h.opposite() };
                Some((s, abs))
            })
        };
        let Some((anchor_slot, anchor_abs)) = anchor else {
            if here.index() == 0 {
                continue;
            }
            return Err(NetworkError::Malformed(format!(
                "intersection {} was reached without a known road heading",
                cross.id
            )));
        };

        let (cx, cy) = (cross.x, cross.y);
        let approaches = cross.approaches;
        for slot in Approach::ALL {
            let Some(road) = approaches[slot.index()] else { continue };
            let abs = anchor_abs.rotate(anchor_slot.offset_to(slot));
            let r = &roads[road.index()];
            if heading[road.index()].is_none() {
                heading[road.index()] = Some(if r.from == here { abs } else { abs.opposite() });
            }
            let next = r.other_end(here);
            if !placed[next.index()] {
                placed[next.index()] = true;
                let (dx, dy) = step(abs);
                crosses[next.index()].x = cx + dx;
                crosses[next.index()].y = cy + dy;
                queue.push_back(next);
                reached += 1;
            }
        }
    }

    if reached < total {
        return Err(NetworkError::Disconnected { reached, total });
    }

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (i32::MAX, i32::MIN, i32::MAX, i32::MIN);
    for c in crosses.iter() {
        min_x = min_x.min(c.x);
        max_x = max_x.max(c.x);
        min_y = min_y.min(c.y);
        max_y = max_y.max(c.y);
    }
    for c in crosses.iter_mut() {
        c.boundary = c.x == min_x || c.x == max_x || c.y == min_y || c.y == max_y;
    }
    Ok(())
}
