use std::collections::BTreeMap;

use crate::tree::TreeNode;

/// Axis-aligned rectangle in the shared container coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a rectangle from edge coordinates instead of extents.
    pub fn from_extents(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Translates this rectangle into `origin`'s coordinate space.
    pub fn relative_to(&self, origin: Rect) -> Self {
        Self {
            left: self.left - origin.left,
            top: self.top - origin.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// Measured rectangles for one rendered node. `child_action` is present only
/// when the node renders a "create child" affordance, `children` only when
/// the node is expanded with a painted children container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRects {
    pub card: Rect,
    pub child_action: Option<Rect>,
    pub children: Option<Rect>,
}

/// One row of the flattened visible tree.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
    pub is_expanded: bool,
    pub has_children: bool,
}

/// Right-angle connector from a parent card's lower edge into its children
/// container. Routed vertical-then-horizontal; collinear points are
/// compressed away, so a straight drop has two points.
#[derive(Debug, Clone, PartialEq)]
pub struct ElbowLine {
    pub from_id: String,
    pub to_id: String,
    pub points: Vec<(f32, f32)>,
}

/// Horizontal run between the "create child" affordances of two adjacent
/// top-level siblings. Owned by the left sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct SiblingHorizontalLine {
    pub node_id: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

/// Vertical drop between stacked "create child" affordances of consecutive
/// top-level siblings in wrapped rows. Owned by the upper sibling.
#[derive(Debug, Clone, PartialEq)]
pub struct SiblingVerticalLine {
    pub node_id: String,
    pub left: f32,
    pub top: f32,
    pub height: f32,
}

/// Full connector-line set for one layout pass. Sibling maps are keyed by
/// the owning node id so consumers render exactly one line set per node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorLines {
    pub elbow: Vec<ElbowLine>,
    pub sibling_horizontal: BTreeMap<String, SiblingHorizontalLine>,
    pub sibling_vertical: BTreeMap<String, SiblingVerticalLine>,
}

impl ConnectorLines {
    pub fn is_empty(&self) -> bool {
        self.elbow.is_empty()
            && self.sibling_horizontal.is_empty()
            && self.sibling_vertical.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elbow.len() + self.sibling_horizontal.len() + self.sibling_vertical.len()
    }
}
