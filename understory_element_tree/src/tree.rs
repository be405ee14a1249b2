// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, registry, rectangles, traversal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};
use understory_style::{Edges, FrameCached, FrameClock, FrameNumber, Id, Style};

use crate::types::{Anchor, ElementFlags, ElementId, ElementProperties, HorizontalAnchor, VerticalAnchor};

/// The seven per-element frame caches. Always invalidated together.
#[derive(Clone, Debug, Default)]
struct RectCaches {
    size_ref: FrameCached<Size>,
    screen_ref: FrameCached<Rect>,
    screen_px: FrameCached<Rect>,
    padded_ref: FrameCached<Rect>,
    padded_px: FrameCached<Rect>,
    margined_ref: FrameCached<Rect>,
    margined_px: FrameCached<Rect>,
}

impl RectCaches {
    fn invalidate(&self) {
        self.size_ref.invalidate();
        self.screen_ref.invalidate();
        self.screen_px.invalidate();
        self.padded_ref.invalidate();
        self.padded_px.invalidate();
        self.margined_ref.invalidate();
        self.margined_px.invalidate();
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    id: Id,
    class_id: Id,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    sub_elements: Vec<ElementId>,
    props: ElementProperties,
    style: Option<Rc<Style>>,
    caches: RectCaches,
}

impl Node {
    fn new(generation: u32, id: Id, class_id: Id, mut props: ElementProperties) -> Self {
        props
            .flags
            .remove(ElementFlags::FOCUSED | ElementFlags::SUB_ELEMENT);
        Self {
            generation,
            id,
            class_id,
            parent: None,
            children: Vec::new(),
            sub_elements: Vec::new(),
            props,
            style: None,
            caches: RectCaches::default(),
        }
    }
}

/// Truncate toward zero, the way reference-unit and pixel rectangles are snapped.
fn snap(rect: Rect) -> Rect {
    Rect::new(rect.x0.trunc(), rect.y0.trunc(), rect.x1.trunc(), rect.y1.trunc())
}

fn scale_rect(rect: Rect, scale: f64) -> Rect {
    let x = (rect.x0 * scale).trunc();
    let y = (rect.y0 * scale).trunc();
    let w = (rect.width() * scale).trunc();
    let h = (rect.height() * scale).trunc();
    Rect::new(x, y, x + w, y + h)
}

/// The element hierarchy of one scene.
///
/// Holds every element in a generational arena, a synthetic root that is the ancestor of
/// everything on screen, the id registry, the frame clock, and the window metrics used to
/// map reference units to pixels.
pub struct ElementTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: ElementId,
    registry: HashMap<Id, ElementId>,
    clock: FrameClock,
    window: Size,
    scale: f64,
    scale_epsilon: f64,
    depth_order: RefCell<Option<Rc<[ElementId]>>>,
}

impl core::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("ElementTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("registered", &self.registry.len())
            .field("frame", &self.clock.current())
            .field("window", &self.window)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Id of the synthetic root element.
    pub const ROOT_ID: &'static str = "screen";
    /// Reference resolution used until [`set_window_size`](Self::set_window_size) is called.
    pub const DEFAULT_REFERENCE_SIZE: Size = Size::new(1920.0, 1080.0);
    /// Scales below this make the scene rectangle empty.
    pub const DEFAULT_SCALE_EPSILON: f64 = 1e-4;

    /// Create a tree holding only the root, for a window at the reference resolution.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: ElementId::new(0, 1),
            registry: HashMap::new(),
            clock: FrameClock::new(),
            window: Self::DEFAULT_REFERENCE_SIZE,
            scale: 1.0,
            scale_epsilon: Self::DEFAULT_SCALE_EPSILON,
            depth_order: RefCell::new(None),
        };
        let root_id = Id::new(Self::ROOT_ID);
        tree.root = tree.insert(root_id.clone(), root_id, ElementProperties::default(), false);
        tree
    }

    /// The synthetic root element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of live elements, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Returns true if only the root is alive.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    // --- frames ---

    /// The current frame number.
    pub fn frame(&self) -> FrameNumber {
        self.clock.current()
    }

    /// Advance the frame clock. Called once per scene update.
    pub fn advance_frame(&mut self) -> FrameNumber {
        let frame = self.clock.advance();
        tracing::trace!(frame, "advanced frame");
        frame
    }

    // --- structure ---

    /// Insert a new, detached element.
    ///
    /// When `register` is true the element becomes reachable through
    /// [`find_by_id`](Self::find_by_id).
    pub fn insert(
        &mut self,
        id: Id,
        class_id: Id,
        props: ElementProperties,
        register: bool,
    ) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, id.clone(), class_id, props));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, id.clone(), class_id, props)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let element = ElementId::new(idx, generation);
        if register {
            self.register(element);
        }
        element
    }

    /// Make `element` reachable by its id. A live element already registered under the same
    /// id is replaced.
    pub fn register(&mut self, element: ElementId) {
        let Some(id) = self.node(element).map(|n| n.id.clone()) else {
            return;
        };
        if let Some(previous) = self.registry.get(&id).copied()
            && previous != element
            && self.is_alive(previous)
        {
            debug_assert!(false, "duplicate element id `{id}`");
            tracing::warn!(element = %id, "replacing registered element with duplicate id");
        }
        self.registry.insert(id, element);
    }

    /// Remove `element` and its whole subtree, unregistering every removed element.
    ///
    /// Returns the removed handles in depth order. The root cannot be removed.
    pub fn remove(&mut self, element: ElementId) -> Vec<ElementId> {
        if element == self.root {
            tracing::warn!("the root element cannot be removed");
            return Vec::new();
        }
        if !self.is_alive(element) {
            return Vec::new();
        }
        if self.parent(element).is_some() {
            self.detach(element);
        }
        let removed = self.collect_depth_order(element);
        for &e in &removed {
            if let Some(node) = self.nodes[e.idx()].take() {
                if self.registry.get(&node.id) == Some(&e) {
                    self.registry.remove(&node.id);
                }
                self.free_list.push(e.idx());
            }
        }
        self.invalidate_order();
        removed
    }

    /// Attach `child` under `parent`, either as a full child or as a sub-element.
    ///
    /// Full children are detached from any previous parent first. Sub-elements are
    /// established once and must not already have a parent. Returns false (and logs) when
    /// either handle is stale or the attachment would create a cycle.
    pub fn attach_to(&mut self, child: ElementId, parent: ElementId, as_sub_element: bool) -> bool {
        if !self.is_alive(child) || !self.is_alive(parent) {
            tracing::warn!(
                child_alive = self.is_alive(child),
                parent_alive = self.is_alive(parent),
                "attach with a missing endpoint"
            );
            return false;
        }
        if child == parent || self.is_ancestor_of_me(parent, child) {
            tracing::warn!(
                child = %self.id_str(child),
                parent = %self.id_str(parent),
                "attach would create a cycle"
            );
            return false;
        }
        if as_sub_element {
            debug_assert!(
                self.parent(child).is_none(),
                "sub-element `{}` already has a parent",
                self.id_str(child)
            );
        }
        if self.parent(child).is_some() {
            self.detach(child);
        }

        tracing::trace!(
            child = %self.id_str(child),
            parent = %self.id_str(parent),
            as_sub_element,
            "attach"
        );
        if let Some(p) = self.node_mut(parent) {
            if as_sub_element {
                p.sub_elements.push(child);
            } else {
                p.children.push(child);
            }
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
            c.props.flags.set(ElementFlags::SUB_ELEMENT, as_sub_element);
        }
        self.invalidate_subtree(child);
        self.invalidate_order();
        true
    }

    /// Detach `child` from its parent. Detaching an unparented element logs and does nothing.
    pub fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.parent(child) else {
            tracing::warn!(child = %self.id_str(child), "detach of an element without a parent");
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != child);
            p.sub_elements.retain(|c| *c != child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
            c.props.flags.remove(ElementFlags::SUB_ELEMENT);
        }
        self.invalidate_subtree(child);
        self.invalidate_order();
    }

    /// Detach `element` and remove all of its full children.
    ///
    /// Must not be called while a traversal of the subtree is in progress.
    pub fn clear(&mut self, element: ElementId) -> Vec<ElementId> {
        if self.parent(element).is_some() {
            self.detach(element);
        }
        self.clear_children(element)
    }

    /// Remove every full child of `parent` (and their subtrees).
    pub fn clear_children(&mut self, parent: ElementId) -> Vec<ElementId> {
        let children = self.children(parent).to_vec();
        let mut removed = Vec::new();
        for child in children {
            removed.extend(self.remove(child));
        }
        self.invalidate_order();
        removed
    }

    /// Remove everything below the root and empty the registry.
    pub fn clear_all_elements(&mut self) -> Vec<ElementId> {
        let removed = self.clear_children(self.root);
        self.registry.clear();
        removed
    }

    // --- lookup ---

    /// Returns true if `element` refers to a live element.
    pub fn is_alive(&self, element: ElementId) -> bool {
        self.nodes
            .get(element.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == element.1)
    }

    /// Find a registered element by id, logging a warning when it is not found.
    pub fn find_by_id(&self, id: &Id) -> Option<ElementId> {
        let found = self.try_find_by_id(id);
        if found.is_none() {
            tracing::warn!(element = %id, "element not found");
        }
        found
    }

    /// Find a registered element by id without logging.
    pub fn try_find_by_id(&self, id: &Id) -> Option<ElementId> {
        self.registry
            .get(id)
            .copied()
            .filter(|e| self.is_alive(*e))
    }

    /// Find a full child of `parent` by id, optionally searching deeper children.
    pub fn child_by_id(&self, parent: ElementId, id: &Id, recursive: bool) -> Option<ElementId> {
        let children = self.children(parent);
        if let Some(found) = children.iter().copied().find(|c| self.id(*c) == Some(id)) {
            return Some(found);
        }
        if recursive {
            return children
                .iter()
                .find_map(|c| self.child_by_id(*c, id, true));
        }
        None
    }

    /// Find a sub-element of `parent` by id, optionally searching deeper sub-elements.
    pub fn sub_element_by_id(
        &self,
        parent: ElementId,
        id: &Id,
        recursive: bool,
    ) -> Option<ElementId> {
        let subs = self.sub_elements(parent);
        if let Some(found) = subs.iter().copied().find(|c| self.id(*c) == Some(id)) {
            return Some(found);
        }
        if recursive {
            return subs
                .iter()
                .find_map(|c| self.sub_element_by_id(*c, id, true));
        }
        None
    }

    /// The element's id.
    pub fn id(&self, element: ElementId) -> Option<&Id> {
        self.node(element).map(|n| &n.id)
    }

    /// The element's class id.
    pub fn class_id(&self, element: ElementId) -> Option<&Id> {
        self.node(element).map(|n| &n.class_id)
    }

    /// The element's parent.
    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).and_then(|n| n.parent)
    }

    /// Full children in order.
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.node(element).map_or(&[], |n| &n.children)
    }

    /// Sub-elements in order.
    pub fn sub_elements(&self, element: ElementId) -> &[ElementId] {
        self.node(element).map_or(&[], |n| &n.sub_elements)
    }

    /// Number of full children.
    pub fn child_count(&self, element: ElementId) -> usize {
        self.children(element).len()
    }

    /// Number of sub-elements.
    pub fn sub_element_count(&self, element: ElementId) -> usize {
        self.sub_elements(element).len()
    }

    /// Position of `child` among `parent`'s full children.
    pub fn child_index(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Returns true if `element` is attached to its parent as a sub-element.
    pub fn is_sub_element(&self, element: ElementId) -> bool {
        self.flags(element).contains(ElementFlags::SUB_ELEMENT)
    }

    /// Returns true if `candidate` is a strict ancestor of `element`.
    pub fn is_ancestor_of_me(&self, element: ElementId, candidate: ElementId) -> bool {
        let mut current = self.parent(element);
        while let Some(ancestor) = current {
            if ancestor == candidate {
                return true;
            }
            current = self.parent(ancestor);
        }
        false
    }

    /// Returns true if the root is an ancestor of `element`.
    pub fn is_attached(&self, element: ElementId) -> bool {
        self.is_ancestor_of_me(element, self.root)
    }

    // --- flags ---

    /// The element's own flags (empty for stale handles).
    pub fn flags(&self, element: ElementId) -> ElementFlags {
        self.node(element)
            .map_or(ElementFlags::empty(), |n| n.props.flags)
    }

    fn inherited(&self, element: ElementId, flag: ElementFlags) -> bool {
        let mut current = Some(element);
        while let Some(e) = current {
            let Some(node) = self.node(e) else {
                return false;
            };
            if !node.props.flags.contains(flag) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Visible itself and through every ancestor.
    pub fn is_visible(&self, element: ElementId) -> bool {
        self.inherited(element, ElementFlags::VISIBLE)
    }

    /// Enabled itself and through every ancestor.
    pub fn is_enabled(&self, element: ElementId) -> bool {
        self.inherited(element, ElementFlags::ENABLED)
    }

    /// The element's own focusable setting.
    pub fn is_focusable(&self, element: ElementId) -> bool {
        self.flags(element).contains(ElementFlags::FOCUSABLE)
    }

    /// Whether the element currently holds focus.
    pub fn is_focused(&self, element: ElementId) -> bool {
        self.flags(element).contains(ElementFlags::FOCUSED)
    }

    /// Visible, enabled, focusable, and attached to the scene.
    pub fn can_be_focused(&self, element: ElementId) -> bool {
        self.is_focusable(element)
            && self.is_visible(element)
            && self.is_enabled(element)
            && self.is_attached(element)
    }

    fn set_flag(&mut self, element: ElementId, flag: ElementFlags, value: bool) {
        if let Some(node) = self.node_mut(element) {
            node.props.flags.set(flag, value);
        }
    }

    /// Set the element's own visibility.
    pub fn set_visible(&mut self, element: ElementId, visible: bool) {
        self.set_flag(element, ElementFlags::VISIBLE, visible);
    }

    /// Set the element's own enabled state.
    pub fn set_enabled(&mut self, element: ElementId, enabled: bool) {
        self.set_flag(element, ElementFlags::ENABLED, enabled);
    }

    /// Set whether the element may take focus.
    pub fn set_focusable(&mut self, element: ElementId, focusable: bool) {
        self.set_flag(element, ElementFlags::FOCUSABLE, focusable);
    }

    /// Set the focused bit. Focus bookkeeping belongs to the scene; this only stores the bit.
    pub fn set_focused(&mut self, element: ElementId, focused: bool) {
        self.set_flag(element, ElementFlags::FOCUSED, focused);
    }

    // --- properties and geometry ---

    /// The element's properties.
    pub fn properties(&self, element: ElementId) -> Option<&ElementProperties> {
        self.node(element).map(|n| &n.props)
    }

    fn mutate_geometry(&mut self, element: ElementId, f: impl FnOnce(&mut ElementProperties)) {
        if let Some(node) = self.node_mut(element) {
            f(&mut node.props);
        }
        self.invalidate_subtree(element);
    }

    /// Set the positioning anchor.
    pub fn set_positioning_anchor(&mut self, element: ElementId, anchor: Anchor) {
        self.mutate_geometry(element, |p| p.positioning_anchor = anchor);
    }

    /// Set the sizing anchor.
    pub fn set_sizing_anchor(&mut self, element: ElementId, anchor: Anchor) {
        self.mutate_geometry(element, |p| p.sizing_anchor = anchor);
    }

    /// Set the position relative to the positioning anchor, in reference units.
    pub fn set_relative_position(&mut self, element: ElementId, position: Vec2) {
        self.mutate_geometry(element, |p| p.relative_position = position);
    }

    /// Set the size in reference units.
    pub fn set_relative_size(&mut self, element: ElementId, size: Size) {
        self.mutate_geometry(element, |p| p.relative_size = size);
    }

    /// Set the width, keeping the current height.
    pub fn set_width(&mut self, element: ElementId, width: f64) {
        let height = self.size_ref(element).height;
        self.set_relative_size(element, Size::new(width, height));
    }

    /// Set the height, keeping the current width.
    pub fn set_height(&mut self, element: ElementId, height: f64) {
        let width = self.size_ref(element).width;
        self.set_relative_size(element, Size::new(width, height));
    }

    /// The style id the element was configured with.
    pub fn style_id(&self, element: ElementId) -> Option<&Id> {
        self.node(element).map(|n| &n.props.style_id)
    }

    /// Change the configured style id. The resolved style is bound separately with
    /// [`set_style`](Self::set_style).
    pub fn set_style_id(&mut self, element: ElementId, style_id: Id) {
        if let Some(node) = self.node_mut(element) {
            node.props.style_id = style_id;
        }
    }

    /// Bind the resolved style.
    pub fn set_style(&mut self, element: ElementId, style: Option<Rc<Style>>) {
        if let Some(node) = self.node_mut(element) {
            node.style = style;
        }
        self.invalidate_subtree(element);
    }

    /// The resolved style, if bound.
    pub fn style(&self, element: ElementId) -> Option<&Rc<Style>> {
        self.node(element).and_then(|n| n.style.as_ref())
    }

    // --- scene metrics ---

    /// Record the window size in pixels and pick the reference-to-pixel scale.
    ///
    /// The scale is whichever of `width / reference.width` and `height / reference.height`
    /// is closer to `1.0`. Returns the chosen scale.
    pub fn set_window_size(&mut self, width: u32, height: u32, reference: Size) -> f64 {
        let scale_w = f64::from(width) / reference.width;
        let scale_h = f64::from(height) / reference.height;
        self.scale = if (1.0 - scale_w).abs() < (1.0 - scale_h).abs() {
            scale_w
        } else {
            scale_h
        };
        self.window = Size::new(f64::from(width), f64::from(height));
        self.invalidate_all();
        tracing::debug!(width, height, scale = self.scale, "window size changed");
        self.scale
    }

    /// Override the reference-to-pixel scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.invalidate_all();
    }

    /// Set the scale below which the scene rectangle is empty.
    pub fn set_scale_epsilon(&mut self, epsilon: f64) {
        self.scale_epsilon = epsilon;
    }

    /// Reference units to pixels.
    pub fn ref_to_pixel_scale(&self) -> f64 {
        self.scale
    }

    /// Pixels to reference units.
    pub fn pixel_to_ref_scale(&self) -> f64 {
        1.0 / self.scale
    }

    /// Window size in pixels.
    pub fn window_size(&self) -> Size {
        self.window
    }

    /// The whole window in reference units, or empty when the scale is degenerate.
    pub fn scene_rect_ref(&self) -> Rect {
        if self.scale < self.scale_epsilon {
            return Rect::ZERO;
        }
        let inv = 1.0 / self.scale;
        snap(Rect::new(0.0, 0.0, self.window.width * inv, self.window.height * inv))
    }

    // --- rectangles ---

    fn margin(&self, element: ElementId) -> Edges {
        self.style(element).map_or(Edges::ZERO, |s| s.margin())
    }

    /// Size in reference units. An undefined size fills the parent's padded rectangle.
    pub fn size_ref(&self, element: ElementId) -> Size {
        let Some(node) = self.node(element) else {
            return Size::ZERO;
        };
        node.caches.size_ref.get(self.frame(), || {
            if !node.props.has_undefined_size() {
                return node.props.relative_size;
            }
            match node.parent {
                Some(parent) => self.padded_rect_ref(parent).size(),
                None => self.scene_rect_ref().size(),
            }
        })
    }

    /// Screen rectangle in reference units (the anchoring algorithm).
    ///
    /// Elements without a parent cover the whole scene. Otherwise the element is positioned
    /// from its positioning anchor on the parent's padded rectangle (respecting its own
    /// margin on edge anchors), offset by its relative position, then shifted by its sizing
    /// anchor. The result is truncated to whole reference units.
    pub fn screen_rect_ref(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches.screen_ref.get(self.frame(), || {
            let Some(parent) = node.parent else {
                return self.scene_rect_ref();
            };
            let size = self.size_ref(element);
            let area = self.padded_rect_ref(parent);
            let margin = self.margin(element);
            let props = &node.props;

            let mut x = props.relative_position.x
                + match props.positioning_anchor.horizontal {
                    HorizontalAnchor::Left => area.x0 + f64::from(margin.left),
                    HorizontalAnchor::Center => area.center().x,
                    HorizontalAnchor::Right => area.x1 - f64::from(margin.right),
                };
            let mut y = props.relative_position.y
                + match props.positioning_anchor.vertical {
                    VerticalAnchor::Top => area.y0 + f64::from(margin.top),
                    VerticalAnchor::Middle => area.center().y,
                    VerticalAnchor::Bottom => area.y1 - f64::from(margin.bottom),
                };
            x -= match props.sizing_anchor.horizontal {
                HorizontalAnchor::Left => 0.0,
                HorizontalAnchor::Center => size.width * 0.5,
                HorizontalAnchor::Right => size.width,
            };
            y -= match props.sizing_anchor.vertical {
                VerticalAnchor::Top => 0.0,
                VerticalAnchor::Middle => size.height * 0.5,
                VerticalAnchor::Bottom => size.height,
            };

            let (x, y) = (x.trunc(), y.trunc());
            let rect = Rect::new(x, y, x + size.width.trunc(), y + size.height.trunc());
            tracing::trace!(element = %node.id, ?rect, "screen rect");
            rect
        })
    }

    /// Screen rectangle in pixels.
    pub fn screen_rect_px(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches
            .screen_px
            .get(self.frame(), || scale_rect(self.screen_rect_ref(element), self.scale))
    }

    /// Screen rectangle minus the style's padding, in reference units.
    pub fn padded_rect_ref(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches.padded_ref.get(self.frame(), || {
            let screen = self.screen_rect_ref(element);
            node.style
                .as_ref()
                .map_or(screen, |s| s.subtract_padding_from_rect(screen))
        })
    }

    /// Padded rectangle in pixels.
    pub fn padded_rect_px(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches
            .padded_px
            .get(self.frame(), || scale_rect(self.padded_rect_ref(element), self.scale))
    }

    /// Screen rectangle plus the style's margin, in reference units.
    pub fn margined_rect_ref(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches.margined_ref.get(self.frame(), || {
            let screen = self.screen_rect_ref(element);
            node.style
                .as_ref()
                .map_or(screen, |s| s.add_margin_to_rect(screen))
        })
    }

    /// Margined rectangle in pixels.
    pub fn margined_rect_px(&self, element: ElementId) -> Rect {
        let Some(node) = self.node(element) else {
            return Rect::ZERO;
        };
        node.caches
            .margined_px
            .get(self.frame(), || scale_rect(self.margined_rect_ref(element), self.scale))
    }

    /// Returns true if all seven rectangle caches hold a value for the current frame.
    pub fn rects_cached(&self, element: ElementId) -> bool {
        let frame = self.frame();
        self.node(element).is_some_and(|n| {
            let c = &n.caches;
            c.size_ref.is_valid(frame)
                && c.screen_ref.is_valid(frame)
                && c.screen_px.is_valid(frame)
                && c.padded_ref.is_valid(frame)
                && c.padded_px.is_valid(frame)
                && c.margined_ref.is_valid(frame)
                && c.margined_px.is_valid(frame)
        })
    }

    /// Returns true if none of the seven rectangle caches hold a value for the current frame.
    pub fn rects_invalidated(&self, element: ElementId) -> bool {
        let frame = self.frame();
        self.node(element).is_none_or(|n| {
            let c = &n.caches;
            !(c.size_ref.is_valid(frame)
                || c.screen_ref.is_valid(frame)
                || c.screen_px.is_valid(frame)
                || c.padded_ref.is_valid(frame)
                || c.padded_px.is_valid(frame)
                || c.margined_ref.is_valid(frame)
                || c.margined_px.is_valid(frame))
        })
    }

    /// Returns true if `point` (pixels) lies in the element's screen rectangle.
    pub fn hit_test_px(&self, element: ElementId, point: Point) -> bool {
        self.screen_rect_px(element).contains(point)
    }

    // --- traversal ---

    /// Pre-order traversal from `root`: each element, then its sub-elements (with their
    /// subtrees), then its full children, each group in insertion order.
    ///
    /// The order from the tree root is cached until the next structural change.
    pub fn depth_ordered(&self, root: ElementId) -> Rc<[ElementId]> {
        if root != self.root {
            return self.collect_depth_order(root).into();
        }
        if let Some(cached) = self.depth_order.borrow().as_ref() {
            return Rc::clone(cached);
        }
        tracing::debug!("recomputing element order");
        let order: Rc<[ElementId]> = self.collect_depth_order(root).into();
        *self.depth_order.borrow_mut() = Some(Rc::clone(&order));
        order
    }

    fn collect_depth_order(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(element) = stack.pop() {
            let Some(node) = self.node(element) else {
                continue;
            };
            out.push(element);
            stack.extend(node.children.iter().rev());
            stack.extend(node.sub_elements.iter().rev());
        }
        out
    }

    /// Topmost element whose pixel rectangle contains `point`.
    pub fn element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.depth_ordered(self.root)
            .iter()
            .rev()
            .copied()
            .find(|e| self.hit_test_px(*e, point))
    }

    /// Topmost visible element whose pixel rectangle contains `point`.
    pub fn visible_element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.depth_ordered(self.root)
            .iter()
            .rev()
            .copied()
            .find(|e| self.is_visible(*e) && self.hit_test_px(*e, point))
    }

    /// Topmost element under `point` that can currently be focused.
    pub fn focusable_element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.depth_ordered(self.root)
            .iter()
            .rev()
            .copied()
            .find(|e| self.can_be_focused(*e) && self.hit_test_px(*e, point))
    }

    /// Every element containing `point`, in depth order (topmost last).
    pub fn elements_under_pixel(&self, point: Point) -> Vec<ElementId> {
        self.depth_ordered(self.root)
            .iter()
            .copied()
            .filter(|e| self.hit_test_px(*e, point))
            .collect()
    }

    // --- internals ---

    fn node(&self, element: ElementId) -> Option<&Node> {
        let n = self.nodes.get(element.idx())?.as_ref()?;
        (n.generation == element.1).then_some(n)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(element.idx())?.as_mut()?;
        (n.generation == element.1).then_some(n)
    }

    fn id_str(&self, element: ElementId) -> &str {
        self.id(element).map_or("<stale>", Id::as_str)
    }

    fn invalidate_order(&self) {
        self.depth_order.borrow_mut().take();
    }

    fn invalidate_subtree(&self, element: ElementId) {
        for e in self.collect_depth_order(element) {
            if let Some(node) = self.node(e) {
                node.caches.invalidate();
            }
        }
    }

    fn invalidate_all(&self) {
        for node in self.nodes.iter().flatten() {
            node.caches.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_style::{BaseStyleProps, StyleKind};

    fn props(size: Size) -> ElementProperties {
        ElementProperties::default().with_size(size)
    }

    fn add(tree: &mut ElementTree, name: &str, parent: ElementId, sub: bool) -> ElementId {
        let e = tree.insert(Id::new(name), Id::new("Panel"), ElementProperties::default(), !sub);
        assert!(tree.attach_to(e, parent, sub), "attach {name}");
        e
    }

    #[test]
    fn anchored_rect_centered_in_parent() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let parent = tree.insert(Id::new("p"), Id::new("Panel"), props(Size::new(400.0, 300.0)), true);
        tree.attach_to(parent, root, false);
        let child = tree.insert(
            Id::new("c"),
            Id::new("Panel"),
            props(Size::new(100.0, 50.0)).with_anchors(Anchor::CENTER, Anchor::CENTER),
            true,
        );
        tree.attach_to(child, parent, false);

        assert_eq!(tree.padded_rect_ref(parent), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert_eq!(tree.screen_rect_ref(child), Rect::new(150.0, 125.0, 250.0, 175.0));
    }

    #[test]
    fn edge_anchors_respect_margin_and_padding() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let parent = tree.insert(Id::new("p"), Id::new("Panel"), props(Size::new(400.0, 300.0)), true);
        tree.attach_to(parent, root, false);
        let mut padded = Style::new("pad", StyleKind::Basic);
        padded.base.padding = Some(Edges::uniform(10));
        tree.set_style(parent, Some(Rc::new(padded)));

        let anchor = Anchor::new(HorizontalAnchor::Right, VerticalAnchor::Bottom);
        let child = tree.insert(
            Id::new("c"),
            Id::new("Panel"),
            props(Size::new(50.0, 20.0)).with_anchors(anchor, anchor),
            true,
        );
        tree.attach_to(child, parent, false);
        let margin = Style::new("margin", StyleKind::Basic).with_base(BaseStyleProps {
            margin: Some(Edges::new(0, 0, 5, 7)),
            ..Default::default()
        });
        tree.set_style(child, Some(Rc::new(margin)));

        // Padded parent is (10,10)-(390,290); right/bottom edges minus margin 5/7.
        assert_eq!(tree.screen_rect_ref(child), Rect::new(335.0, 263.0, 385.0, 283.0));
        assert_eq!(tree.margined_rect_ref(child), Rect::new(335.0, 263.0, 390.0, 290.0));
    }

    #[test]
    fn undefined_size_fills_parent_padded_rect() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let child = add(&mut tree, "fill", root, false);
        assert_eq!(tree.size_ref(child), Size::new(1920.0, 1080.0));
        assert_eq!(tree.screen_rect_ref(child), Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn rects_are_truncated_and_scaled() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let e = tree.insert(
            Id::new("e"),
            Id::new("Panel"),
            props(Size::new(10.7, 5.5)).with_position(Vec2::new(3.9, 2.2)),
            true,
        );
        tree.attach_to(e, root, false);
        assert_eq!(tree.screen_rect_ref(e), Rect::new(3.0, 2.0, 13.0, 7.0));

        let scale = tree.set_window_size(960, 400, ElementTree::DEFAULT_REFERENCE_SIZE);
        assert_eq!(scale, 0.5, "width scale 0.5 is closer to 1 than 0.37");
        assert_eq!(tree.scene_rect_ref(), Rect::new(0.0, 0.0, 1920.0, 800.0));
        assert_eq!(tree.screen_rect_px(e), Rect::new(1.0, 1.0, 6.0, 3.0));
    }

    #[test]
    fn degenerate_scale_gives_empty_scene() {
        let mut tree = ElementTree::new();
        tree.set_scale(0.0);
        assert_eq!(tree.scene_rect_ref(), Rect::ZERO);
    }

    #[test]
    fn rect_is_memoized_within_a_frame() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let e = tree.insert(Id::new("e"), Id::new("Panel"), props(Size::new(10.0, 10.0)), true);
        tree.attach_to(e, root, false);
        let first = tree.screen_rect_ref(e);
        assert!(tree.node(e).is_some_and(|n| n.caches.screen_ref.is_valid(tree.frame())));
        // Poke the stored props behind the tree's back: a cached read does not notice.
        if let Some(n) = tree.node_mut(e) {
            n.props.relative_position = Vec2::new(50.0, 0.0);
        }
        assert_eq!(tree.screen_rect_ref(e), first);
        tree.advance_frame();
        assert_eq!(tree.screen_rect_ref(e).x0, 50.0);
    }

    #[test]
    fn geometry_setters_invalidate_every_cache() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let e = tree.insert(Id::new("e"), Id::new("Panel"), props(Size::new(10.0, 10.0)), true);
        tree.attach_to(e, root, false);

        let touch = |tree: &ElementTree| {
            tree.size_ref(e);
            tree.screen_rect_px(e);
            tree.padded_rect_px(e);
            tree.margined_rect_px(e);
        };
        let setters: Vec<Box<dyn Fn(&mut ElementTree)>> = vec![
            Box::new(move |t: &mut ElementTree| t.set_positioning_anchor(e, Anchor::CENTER)),
            Box::new(move |t: &mut ElementTree| t.set_sizing_anchor(e, Anchor::CENTER)),
            Box::new(move |t: &mut ElementTree| t.set_relative_position(e, Vec2::new(1.0, 1.0))),
            Box::new(move |t: &mut ElementTree| t.set_relative_size(e, Size::new(20.0, 20.0))),
        ];
        for set in &setters {
            touch(&tree);
            assert!(tree.rects_cached(e));
            set(&mut tree);
            assert!(tree.rects_invalidated(e));
        }
        tree.advance_frame();
        touch(&tree);
        assert_eq!(tree.size_ref(e), Size::new(20.0, 20.0));
    }

    #[test]
    fn attach_then_detach_round_trips() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let a = add(&mut tree, "a", root, false);
        let b = add(&mut tree, "b", root, false);
        let before = tree.children(root).to_vec();

        let c = tree.insert(Id::new("c"), Id::new("Panel"), ElementProperties::default(), true);
        tree.attach_to(c, root, false);
        assert_eq!(tree.child_index(root, c), Some(2));
        tree.detach(c);

        assert_eq!(tree.children(root), before.as_slice());
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(c), None);
    }

    #[tracing_test::traced_test]
    #[test]
    fn detach_twice_is_a_logged_no_op() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let a = add(&mut tree, "a", root, false);
        tree.detach(a);
        tree.detach(a);
        assert_eq!(tree.parent(a), None);
        assert!(tree.children(root).is_empty());
        assert!(logs_contain("detach of an element without a parent"));
    }

    #[test]
    fn reattach_moves_full_children() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let p1 = add(&mut tree, "p1", root, false);
        let p2 = add(&mut tree, "p2", root, false);
        let c = add(&mut tree, "c", p1, false);
        assert!(tree.attach_to(c, p2, false));
        assert!(tree.children(p1).is_empty());
        assert_eq!(tree.children(p2), &[c]);
        assert!(!tree.attach_to(p2, c, false), "cycle refused");
    }

    #[test]
    fn depth_order_puts_sub_elements_first() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let s = add(&mut tree, "s", root, true);
        let c1 = add(&mut tree, "c1", root, false);
        let c2 = add(&mut tree, "c2", root, false);
        assert_eq!(&*tree.depth_ordered(root), &[root, s, c1, c2]);

        let s1 = add(&mut tree, "s1", s, false);
        assert_eq!(&*tree.depth_ordered(root), &[root, s, s1, c1, c2]);
        assert!(tree.is_sub_element(s));
        assert!(!tree.is_sub_element(s1));
    }

    #[test]
    fn depth_order_cache_is_reused_until_mutation() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        add(&mut tree, "a", root, false);
        let first = tree.depth_ordered(root);
        let second = tree.depth_ordered(root);
        assert!(Rc::ptr_eq(&first, &second));
        add(&mut tree, "b", root, false);
        let third = tree.depth_ordered(root);
        assert!(!Rc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 3);
    }

    #[test]
    fn visibility_and_enabling_inherit() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let p = add(&mut tree, "p", root, false);
        let c = add(&mut tree, "c", p, false);
        tree.set_focusable(c, true);
        assert!(tree.can_be_focused(c));
        tree.set_visible(p, false);
        assert!(!tree.is_visible(c));
        assert!(!tree.can_be_focused(c));
        tree.set_visible(p, true);
        tree.set_enabled(p, false);
        assert!(!tree.is_enabled(c));
        tree.set_enabled(p, true);
        tree.detach(p);
        assert!(!tree.is_attached(c));
        assert!(!tree.can_be_focused(c));
    }

    #[test]
    fn remove_unregisters_and_frees() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let p = add(&mut tree, "p", root, false);
        let c = add(&mut tree, "c", p, false);
        let removed = tree.remove(p);
        assert_eq!(removed, vec![p, c]);
        assert!(!tree.is_alive(p));
        assert_eq!(tree.try_find_by_id(&Id::new("p")), None);
        assert_eq!(tree.try_find_by_id(&Id::new("c")), None);

        // Slot reuse bumps the generation; old handles stay dead.
        let fresh = add(&mut tree, "fresh", root, false);
        assert!(tree.is_alive(fresh));
        assert!(!tree.is_alive(p) && !tree.is_alive(c));
    }

    #[test]
    fn clear_all_elements_empties_registry() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let p = add(&mut tree, "p", root, false);
        add(&mut tree, "c", p, false);
        tree.clear_all_elements();
        assert!(tree.is_empty());
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.try_find_by_id(&Id::new("p")), None);
    }

    #[test]
    fn lookups_by_id() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let p = add(&mut tree, "Panel1", root, false);
        let c = add(&mut tree, "Inner", p, false);
        let s = add(&mut tree, "Thumb", c, true);
        assert_eq!(tree.find_by_id(&Id::new("PANEL1")), Some(p));
        assert_eq!(tree.child_by_id(root, &Id::new("inner"), false), None);
        assert_eq!(tree.child_by_id(root, &Id::new("inner"), true), Some(c));
        assert_eq!(tree.sub_element_by_id(c, &Id::new("thumb"), false), Some(s));
        assert_eq!(tree.try_find_by_id(&Id::new("thumb")), None, "sub-elements are unregistered");
    }

    #[test]
    fn hit_testing_prefers_topmost() {
        let mut tree = ElementTree::new();
        let root = tree.root();
        let a = tree.insert(Id::new("a"), Id::new("Panel"), props(Size::new(100.0, 100.0)), true);
        tree.attach_to(a, root, false);
        let b = tree.insert(
            Id::new("b"),
            Id::new("Panel"),
            props(Size::new(100.0, 100.0)).with_position(Vec2::new(50.0, 50.0)),
            true,
        );
        tree.attach_to(b, root, false);
        assert_eq!(tree.element_under_pixel(Point::new(75.0, 75.0)), Some(b));
        assert_eq!(tree.element_under_pixel(Point::new(10.0, 10.0)), Some(a));
        tree.set_visible(b, false);
        assert_eq!(tree.visible_element_under_pixel(Point::new(75.0, 75.0)), Some(a));
        assert_eq!(tree.elements_under_pixel(Point::new(75.0, 75.0)), vec![root, a, b]);
        assert_eq!(tree.focusable_element_under_pixel(Point::new(75.0, 75.0)), None);
    }
}
