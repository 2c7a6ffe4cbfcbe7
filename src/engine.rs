use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument, trace, warn};

use crate::layout::{compute_lines, visible_nodes, ConnectorLines, NodeRects, Rect, VisibleNode};
use crate::measure::MeasureSource;
use crate::reflow::{ObservationRegistry, SizeObserver};
use crate::tree::{ExpansionState, TreeNode, UserIntent};

/// Owns the derived geometry of the card tree: the latest rectangle
/// snapshot and the connector lines computed from it. The tree and the
/// expansion set stay with the caller and are passed into every pass; the
/// engine never mutates either, and user interactions come back out as
/// [`UserIntent`] values instead of state changes.
///
/// Pass ordering contract: the host paints first, then calls
/// [`after_render`](Self::after_render) from its post-paint hook. Measuring
/// before the paint has committed would capture rectangles of the previous
/// frame.
pub struct TreeViewEngine {
    observer: Option<Box<dyn SizeObserver>>,
    registry: ObservationRegistry,
    rects: BTreeMap<String, NodeRects>,
    container: Option<Rect>,
    lines: ConnectorLines,
    intents: Vec<UserIntent>,
}

impl TreeViewEngine {
    /// Creates an engine, optionally wired to a size observation primitive.
    /// Without one the engine still computes lines after every structural
    /// pass but cannot follow resizes, so lines go stale until the next
    /// structural change.
    pub fn new(observer: Option<Box<dyn SizeObserver>>) -> Self {
        if observer.is_none() {
            warn!("size observation unavailable; connector lines will not track resizes");
        }
        Self {
            observer,
            registry: ObservationRegistry::new(),
            rects: BTreeMap::new(),
            container: None,
            lines: ConnectorLines::default(),
            intents: Vec::new(),
        }
    }

    /// Post-paint pass. Reconciles the observed element set with the
    /// current visible rows, snapshots their rectangles, and recomputes the
    /// connector lines. Call after every structural change (new tree data,
    /// expansion toggle) once the paint has committed.
    #[instrument(level = "trace", skip_all)]
    pub fn after_render(
        &mut self,
        roots: &[TreeNode],
        expanded: &ExpansionState,
        source: &dyn MeasureSource,
    ) {
        let visible = visible_nodes(roots, expanded);
        if let Some(observer) = self.observer.as_mut() {
            let desired: BTreeSet<String> = visible
                .iter()
                .map(|row| row.node.id.clone())
                .collect();
            self.registry.sync(&desired, observer.as_mut());
        }
        self.recompute(&visible, source);
    }

    /// Size-change pass, called by the host's observation callback. One
    /// call performs exactly one remeasure and recompute; the observation
    /// primitive is expected to have coalesced the burst already. The
    /// observed element set is left untouched.
    #[instrument(level = "trace", skip_all)]
    pub fn notify_resized(
        &mut self,
        roots: &[TreeNode],
        expanded: &ExpansionState,
        source: &dyn MeasureSource,
    ) {
        if self.observer.is_none() {
            debug!("resize notification without size observation; ignoring");
            return;
        }
        let visible = visible_nodes(roots, expanded);
        self.recompute(&visible, source);
    }

    fn recompute(&mut self, visible: &[VisibleNode<'_>], source: &dyn MeasureSource) {
        let Some(container) = source.container() else {
            debug!("container not measurable; keeping previous connector lines");
            return;
        };

        let mut rects = BTreeMap::new();
        for row in visible {
            let id = row.node.id.as_str();
            let Some(card) = source.card(id) else {
                trace!(node = id, "card not measurable; skipping");
                continue;
            };
            let children = if row.is_expanded && row.has_children {
                source.children_box(id)
            } else {
                None
            };
            rects.insert(
                id.to_string(),
                NodeRects {
                    card,
                    child_action: source.child_action(id),
                    children,
                },
            );
        }

        self.lines = compute_lines(visible, &rects, container);
        self.rects = rects;
        self.container = Some(container);
        trace!(
            nodes = self.rects.len(),
            lines = self.lines.len(),
            "connector lines recomputed"
        );
    }

    /// Connector lines from the most recent successful pass.
    pub fn lines(&self) -> &ConnectorLines {
        &self.lines
    }

    /// Rectangle snapshot from the most recent successful pass.
    pub fn rects(&self) -> &BTreeMap<String, NodeRects> {
        &self.rects
    }

    /// Container rectangle from the most recent successful pass.
    pub fn container(&self) -> Option<Rect> {
        self.container
    }

    pub fn click(&mut self, id: &str) {
        self.intents.push(UserIntent::NodeClicked { id: id.to_string() });
    }

    pub fn request_toggle(&mut self, id: &str) {
        self.intents
            .push(UserIntent::ExpandToggled { id: id.to_string() });
    }

    pub fn request_create_child(&mut self, id: &str) {
        self.intents
            .push(UserIntent::CreateChildRequested { id: id.to_string() });
    }

    /// Drains the queued user intents in emission order.
    pub fn take_intents(&mut self) -> Vec<UserIntent> {
        std::mem::take(&mut self.intents)
    }
}

impl Drop for TreeViewEngine {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            self.registry.release(observer.as_mut());
        }
    }
}
