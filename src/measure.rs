use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::layout::Rect;
use crate::tree::{ExpansionState, TreeNode};

/// Measurement provider for rendered tree elements. This is the engine's
/// only view of the host's paint output; all rectangles must be reported in
/// one shared coordinate space. A `None` means the element is not mounted
/// (or not yet laid out) and its lines are skipped for the pass.
pub trait MeasureSource {
    /// Rectangle of the designated container element.
    fn container(&self) -> Option<Rect>;
    /// Rectangle of the node's card.
    fn card(&self, id: &str) -> Option<Rect>;
    /// Rectangle of the node's "create child" affordance.
    fn child_action(&self, id: &str) -> Option<Rect>;
    /// Rectangle of the node's painted children container.
    fn children_box(&self, id: &str) -> Option<Rect>;
}

/// Deterministic stand-in for a real rendering surface. Lays each top-level
/// subtree out as a column: card on top, "create child" affordance under it,
/// then the indented children container. Columns flow left to right and wrap
/// at the configured viewport width.
///
/// `layout` is the paint step; the [`MeasureSource`] getters serve the
/// committed frame afterwards, which mirrors the measure-after-paint
/// ordering the engine relies on. Per-node height overrides simulate card
/// content growing or shrinking between frames.
#[derive(Debug, Clone)]
pub struct HeadlessMeasurer {
    config: LayoutConfig,
    origin: (f32, f32),
    card_heights: HashMap<String, f32>,
    cards: BTreeMap<String, Rect>,
    actions: BTreeMap<String, Rect>,
    children_boxes: BTreeMap<String, Rect>,
    container: Option<Rect>,
}

impl HeadlessMeasurer {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            origin: (0.0, 0.0),
            card_heights: HashMap::new(),
            cards: BTreeMap::new(),
            actions: BTreeMap::new(),
            children_boxes: BTreeMap::new(),
            container: None,
        }
    }

    /// Moves the container away from the page origin. Element rectangles are
    /// reported in page coordinates, so consumers must still normalize
    /// against the container.
    pub fn set_origin(&mut self, left: f32, top: f32) {
        self.origin = (left, top);
    }

    /// Overrides one card's height for subsequent layouts.
    pub fn set_card_height(&mut self, id: &str, height: f32) {
        self.card_heights.insert(id.to_string(), height);
    }

    /// Paints the forest: computes every card, affordance, and children
    /// container rectangle plus the container extent.
    pub fn layout(&mut self, roots: &[TreeNode], expanded: &ExpansionState) {
        self.cards.clear();
        self.actions.clear();
        self.children_boxes.clear();

        let padding = self.config.container_padding;
        let left_edge = self.origin.0 + padding;
        let top_edge = self.origin.1 + padding;
        let wrap_limit = left_edge + self.config.viewport_width;

        let mut cursor_x = left_edge;
        let mut row_top = top_edge;
        let mut row_bottom = top_edge;
        let mut content_right = left_edge;

        for root in roots {
            let (column_width, _) = self.subtree_size(root, expanded, true);
            if cursor_x > left_edge && cursor_x + column_width > wrap_limit {
                cursor_x = left_edge;
                row_top = row_bottom + self.config.column_gap;
                row_bottom = row_top;
            }
            let (width, height) = self.place_subtree(root, cursor_x, row_top, expanded, true);
            row_bottom = row_bottom.max(row_top + height);
            content_right = content_right.max(cursor_x + width);
            cursor_x += width + self.config.column_gap;
        }

        self.container = Some(Rect::new(
            self.origin.0,
            self.origin.1,
            (content_right - self.origin.0) + padding,
            (row_bottom - self.origin.1) + padding,
        ));
    }

    fn card_height_for(&self, id: &str) -> f32 {
        self.card_heights
            .get(id)
            .copied()
            .unwrap_or(self.config.card_height)
    }

    fn subtree_size(
        &self,
        node: &TreeNode,
        expanded: &ExpansionState,
        with_action: bool,
    ) -> (f32, f32) {
        let mut width = self.config.card_width;
        let mut height = self.card_height_for(&node.id);
        if with_action {
            height += self.config.card_gap + self.config.child_action_height;
        }
        if expanded.is_expanded(&node.id) && node.has_children() {
            let mut children_width = 0.0f32;
            for child in &node.children {
                let (child_w, child_h) = self.subtree_size(child, expanded, false);
                children_width = children_width.max(child_w);
                height += self.config.card_gap + child_h;
            }
            width = width.max(self.config.indent_width + children_width);
        }
        (width, height)
    }

    fn place_subtree(
        &mut self,
        node: &TreeNode,
        x: f32,
        y: f32,
        expanded: &ExpansionState,
        with_action: bool,
    ) -> (f32, f32) {
        let card_width = self.config.card_width;
        let card_height = self.card_height_for(&node.id);
        self.cards
            .insert(node.id.clone(), Rect::new(x, y, card_width, card_height));

        let mut width = card_width;
        let mut bottom = y + card_height;

        if with_action {
            let action_width = self.config.child_action_width;
            let action_height = self.config.child_action_height;
            let action_x = x + (card_width - action_width) / 2.0;
            let action_y = bottom + self.config.card_gap;
            self.actions.insert(
                node.id.clone(),
                Rect::new(action_x, action_y, action_width, action_height),
            );
            bottom = action_y + action_height;
        }

        if expanded.is_expanded(&node.id) && node.has_children() {
            let child_x = x + self.config.indent_width;
            let children_top = bottom + self.config.card_gap;
            let mut child_y = children_top;
            let mut children_width = 0.0f32;
            for child in &node.children {
                let (child_w, child_h) = self.place_subtree(child, child_x, child_y, expanded, false);
                children_width = children_width.max(child_w);
                child_y += child_h + self.config.card_gap;
            }
            let children_height = child_y - self.config.card_gap - children_top;
            self.children_boxes.insert(
                node.id.clone(),
                Rect::new(child_x, children_top, children_width, children_height),
            );
            bottom = children_top + children_height;
            width = width.max(self.config.indent_width + children_width);
        }

        (width, bottom - y)
    }
}

impl MeasureSource for HeadlessMeasurer {
    fn container(&self) -> Option<Rect> {
        self.container
    }

    fn card(&self, id: &str) -> Option<Rect> {
        self.cards.get(id).copied()
    }

    fn child_action(&self, id: &str) -> Option<Rect> {
        self.actions.get(id).copied()
    }

    fn children_box(&self, id: &str) -> Option<Rect> {
        self.children_boxes.get(id).copied()
    }
}
