// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional focus search over screen rectangles.
//!
//! A search from the focused rectangle in a direction works in two steps:
//!
//! 1) Filter: keep candidates whose near edge lies on the query side of the focused edge and
//!    inside the 45° cone grown from that edge. The perpendicular gap may not exceed the
//!    gap along the direction, so something directly beside wins structurally over
//!    something merely diagonal.
//! 2) Score: squared distance from the candidate's center to the center of the focused edge.
//!    The lowest score wins; among equal scores the first candidate in traversal order wins.
//!
//! ```
//! use kurbo::Rect;
//! use understory_focus::navigate::find_in_direction;
//! use understory_focus::types::Direction;
//!
//! let focused = Rect::new(0.0, 0.0, 100.0, 100.0);
//! let candidates = [
//!     ("right", Rect::new(150.0, 0.0, 250.0, 100.0)),
//!     ("below", Rect::new(0.0, 150.0, 100.0, 250.0)),
//! ];
//! assert_eq!(find_in_direction(Direction::Right, focused, candidates), Some("right"));
//! assert_eq!(find_in_direction(Direction::Down, focused, candidates), Some("below"));
//! assert_eq!(find_in_direction(Direction::Left, focused, candidates), None);
//! ```

use kurbo::{Point, Rect};

use crate::types::Direction;

/// Center of the focused rectangle's edge facing `direction`.
pub fn edge_center(direction: Direction, rect: Rect) -> Point {
    let c = rect.center();
    match direction {
        Direction::Left => Point::new(rect.x0, c.y),
        Direction::Right => Point::new(rect.x1, c.y),
        Direction::Up => Point::new(c.x, rect.y0),
        Direction::Down => Point::new(c.x, rect.y1),
    }
}

/// Returns true if `candidate` lies in `direction` from `focused`, inside the 45° cone.
pub fn in_direction(direction: Direction, focused: Rect, candidate: Rect) -> bool {
    // `along` is the gap in the search direction; `before`/`after` the perpendicular gaps.
    let (along, before, after) = match direction {
        Direction::Left => (
            focused.x0 - candidate.x1,
            focused.y0 - candidate.y1,
            candidate.y0 - focused.y1,
        ),
        Direction::Right => (
            candidate.x0 - focused.x1,
            focused.y0 - candidate.y1,
            candidate.y0 - focused.y1,
        ),
        Direction::Up => (
            focused.y0 - candidate.y1,
            focused.x0 - candidate.x1,
            candidate.x0 - focused.x1,
        ),
        Direction::Down => (
            candidate.y0 - focused.y1,
            focused.x0 - candidate.x1,
            candidate.x0 - focused.x1,
        ),
    };
    along >= 0.0 && before <= along && after <= along
}

/// Build the filter for a search in `direction` from `focused`.
pub fn direction_filter(direction: Direction, focused: Rect) -> impl Fn(Rect) -> bool {
    move |candidate| in_direction(direction, focused, candidate)
}

/// Build the score for a search in `direction` from `focused`.
pub fn direction_score(direction: Direction, focused: Rect) -> impl Fn(Rect) -> f64 {
    let edge = edge_center(direction, focused);
    move |candidate| {
        let d = candidate.center() - edge;
        d.hypot2()
    }
}

/// Pick the candidate passing `filter` with the lowest `score`.
///
/// Candidates are visited in the given order and a later candidate must score strictly lower
/// to replace the current best, so the first of several equal minima wins. Scenes pass
/// candidates in depth order, so ties go to the element nearest the front of the traversal
/// rather than the last one.
pub fn next_focusable<K, I, F, S>(candidates: I, mut filter: F, mut score: S) -> Option<K>
where
    I: IntoIterator<Item = K>,
    F: FnMut(&K) -> bool,
    S: FnMut(&K) -> f64,
{
    let mut best: Option<(K, f64)> = None;
    for candidate in candidates {
        if !filter(&candidate) {
            continue;
        }
        let s = score(&candidate);
        match &best {
            Some((_, best_score)) if *best_score <= s => {}
            _ => best = Some((candidate, s)),
        }
    }
    best.map(|(k, _)| k)
}

/// Directional search over `(key, screen rect)` candidates.
///
/// The caller excludes the focused element and anything that cannot currently take focus.
pub fn find_in_direction<K, I>(direction: Direction, focused: Rect, candidates: I) -> Option<K>
where
    I: IntoIterator<Item = (K, Rect)>,
{
    let filter = direction_filter(direction, focused);
    let score = direction_score(direction, focused);
    next_focusable(
        candidates,
        |(_, rect)| filter(*rect),
        |(_, rect)| score(*rect),
    )
    .map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    #[test]
    fn right_and_down_pick_the_aligned_neighbor() {
        let r1 = r(0.0, 0.0, 100.0, 100.0);
        let cands = [(2, r(150.0, 0.0, 100.0, 100.0)), (3, r(0.0, 150.0, 100.0, 100.0))];
        assert_eq!(find_in_direction(Direction::Right, r1, cands), Some(2));
        assert_eq!(find_in_direction(Direction::Down, r1, cands), Some(3));
        assert_eq!(find_in_direction(Direction::Up, r1, cands), None);
    }

    #[test]
    fn cone_rejects_far_diagonals() {
        let focused = r(100.0, 100.0, 50.0, 50.0);
        // 10 px to the left but 200 px below: outside the cone.
        assert!(!in_direction(Direction::Left, focused, r(0.0, 350.0, 90.0, 20.0)));
        // 60 px to the left and 40 px above: inside.
        assert!(in_direction(Direction::Left, focused, r(0.0, 40.0, 40.0, 20.0)));
        // Overlapping in x is never "left".
        assert!(!in_direction(Direction::Left, focused, r(90.0, 100.0, 20.0, 20.0)));
    }

    #[test]
    fn touching_edges_count() {
        let focused = r(0.0, 0.0, 100.0, 100.0);
        assert!(in_direction(Direction::Right, focused, r(100.0, 0.0, 10.0, 10.0)));
        assert!(in_direction(Direction::Up, r(0.0, 100.0, 10.0, 10.0), focused));
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let focused = r(100.0, 0.0, 100.0, 100.0);
        // Mirror images above and below the right edge center: identical scores.
        let cands = [
            ("upper", r(250.0, -60.0, 100.0, 100.0)),
            ("lower", r(250.0, 60.0, 100.0, 100.0)),
        ];
        assert_eq!(find_in_direction(Direction::Right, focused, cands), Some("upper"));
        let reversed = [cands[1], cands[0]];
        assert_eq!(find_in_direction(Direction::Right, focused, reversed), Some("lower"));
    }

    #[test]
    fn nearest_wins() {
        let focused = r(0.0, 0.0, 50.0, 50.0);
        let cands = [(1, r(300.0, 0.0, 50.0, 50.0)), (2, r(100.0, 0.0, 50.0, 50.0))];
        assert_eq!(find_in_direction(Direction::Right, focused, cands), Some(2));
    }

    #[test]
    fn score_is_squared_distance_to_edge_center() {
        let score = direction_score(Direction::Right, r(0.0, 0.0, 100.0, 100.0));
        // Candidate center (130, 50); edge center (100, 50).
        assert_eq!(score(r(120.0, 40.0, 20.0, 20.0)), 900.0);
    }

    #[test]
    fn equal_scores_keep_the_earliest_candidate() {
        let picked = next_focusable(["a", "b", "c"], |_| true, |_| 2.0);
        assert_eq!(picked, Some("a"));
        let score = |k: &&str| if *k == "c" { 1.0 } else { 2.0 };
        let picked = next_focusable(["a", "b", "c"], |k| *k != "a", score);
        assert_eq!(picked, Some("c"));
    }
}
