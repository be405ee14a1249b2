// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hover/focus transitions.
//!
//! [`PointerTracker`] remembers which focusable element was under the pointer last frame.
//! Given this frame's element plus the focused and hover elements, it derives the events to
//! deliver, in order:
//!
//! 1) Hover element: `MouseOver` while still under the pointer, or `MouseOut` (and hover
//!    is cleared) when the pointer has just left it.
//! 2) Focused element: `MouseOverFocus` while under the pointer, `MouseOutFocus` when the
//!    pointer has just left, `MouseInFocus` when the pointer has just arrived. Focus never
//!    changes here.
//! 3) A focusable element under the pointer that is neither focused nor hovered gets
//!    `MouseIn` and becomes the hover element.
//!
//! A left-button press over a focusable element that is not already focused requests focus.
//!
//! ```
//! use understory_focus::pointer::PointerTracker;
//! use understory_focus::types::InputEventKind;
//!
//! let mut tracker: PointerTracker<u32> = PointerTracker::new();
//! let step = tracker.update(Some(7), None, None, false);
//! assert_eq!(step.events, vec![(7, InputEventKind::MouseIn)]);
//! assert_eq!(step.hovered, Some(7));
//!
//! let step = tracker.update(None, None, step.hovered, false);
//! assert_eq!(step.events, vec![(7, InputEventKind::MouseOut)]);
//! assert_eq!(step.hovered, None);
//! ```

use crate::types::InputEventKind;

/// Result of one [`PointerTracker::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerStep<K> {
    /// Events to deliver, in order.
    pub events: Vec<(K, InputEventKind)>,
    /// The hover element after this step.
    pub hovered: Option<K>,
    /// Element that should take focus because the left button was pressed over it.
    pub focus_request: Option<K>,
}

/// Tracks the focusable element under the pointer across frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerTracker<K> {
    previous: Option<K>,
    current: Option<K>,
}

impl<K> Default for PointerTracker<K> {
    fn default() -> Self {
        Self {
            previous: None,
            current: None,
        }
    }
}

impl<K: Copy + Eq> PointerTracker<K> {
    /// A tracker with nothing under the pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Focusable element under the pointer this frame.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Focusable element under the pointer last frame.
    pub fn previous(&self) -> Option<K> {
        self.previous
    }

    /// Forget an element (for example one that was removed from the scene).
    pub fn forget(&mut self, element: K) {
        if self.previous == Some(element) {
            self.previous = None;
        }
        if self.current == Some(element) {
            self.current = None;
        }
    }

    /// Advance one frame. See the [module docs](self) for the rules.
    pub fn update(
        &mut self,
        under_pointer: Option<K>,
        focused: Option<K>,
        hovered: Option<K>,
        pressed: bool,
    ) -> PointerStep<K> {
        self.previous = self.current;
        self.current = under_pointer;
        let (prev, cur) = (self.previous, self.current);

        let mut events = Vec::new();
        let mut hovered = hovered;

        if let Some(h) = hovered {
            let now = cur == Some(h);
            let before = prev == Some(h);
            if now && before {
                events.push((h, InputEventKind::MouseOver));
            } else if !now && before {
                events.push((h, InputEventKind::MouseOut));
                hovered = None;
            }
        }

        if let Some(f) = focused {
            let now = cur == Some(f);
            let before = prev == Some(f);
            if now && before {
                events.push((f, InputEventKind::MouseOverFocus));
            } else if !now && before {
                events.push((f, InputEventKind::MouseOutFocus));
            } else if now && !before {
                events.push((f, InputEventKind::MouseInFocus));
            }
        }

        if let Some(c) = cur
            && focused != Some(c)
            && hovered != Some(c)
        {
            hovered = Some(c);
            events.push((c, InputEventKind::MouseIn));
        }

        let focus_request = cur.filter(|c| pressed && focused != Some(*c));

        PointerStep {
            events,
            hovered,
            focus_request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InputEventKind::*;

    #[test]
    fn hover_moves_between_elements() {
        let mut t = PointerTracker::new();
        let s = t.update(Some(1), None, None, false);
        assert_eq!(s.events, vec![(1, MouseIn)]);
        let s = t.update(Some(1), None, s.hovered, false);
        assert_eq!(s.events, vec![(1, MouseOver)]);
        let s = t.update(Some(2), None, s.hovered, false);
        assert_eq!(s.events, vec![(1, MouseOut), (2, MouseIn)]);
        assert_eq!(s.hovered, Some(2));
    }

    #[test]
    fn focused_element_keeps_focus_when_pointer_leaves() {
        let mut t = PointerTracker::new();
        let s = t.update(Some(5), Some(5), None, false);
        assert_eq!(s.events, vec![(5, MouseInFocus)]);
        assert_eq!(s.hovered, None);
        let s = t.update(Some(5), Some(5), None, false);
        assert_eq!(s.events, vec![(5, MouseOverFocus)]);
        let s = t.update(None, Some(5), None, false);
        assert_eq!(s.events, vec![(5, MouseOutFocus)]);
        let s = t.update(None, Some(5), None, false);
        assert!(s.events.is_empty());
    }

    #[test]
    fn press_requests_focus_only_for_unfocused() {
        let mut t = PointerTracker::new();
        let s = t.update(Some(3), Some(4), None, true);
        assert_eq!(s.focus_request, Some(3));
        let s = t.update(Some(4), Some(4), s.hovered, true);
        assert_eq!(s.focus_request, None);
        let s = t.update(None, Some(4), s.hovered, true);
        assert_eq!(s.focus_request, None);
    }

    #[test]
    fn forget_drops_stale_keys() {
        let mut t = PointerTracker::new();
        t.update(Some(9), None, None, false);
        t.forget(9);
        assert_eq!(t.current(), None);
        let s = t.update(Some(9), None, None, false);
        assert_eq!(s.events, vec![(9, MouseIn)]);
    }
}
