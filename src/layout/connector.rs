use std::collections::BTreeMap;

use super::types::{
    ConnectorLines, ElbowLine, NodeRects, Rect, SiblingHorizontalLine, SiblingVerticalLine,
    VisibleNode,
};

// ── Geometry tolerance ──────────────────────────────────────────────
/// Coordinate tolerance below which points are considered coincident.
const POINT_EPS: f32 = 1e-4;

/// Computes the full connector-line set for one pass: elbow lines for every
/// expanded parent, sibling lines for adjacent top-level affordances. Pure
/// function of the visible rows, the measured rectangles, and the container;
/// nodes without measurements are skipped rather than reported.
pub fn compute_lines(
    visible: &[VisibleNode<'_>],
    rects: &BTreeMap<String, NodeRects>,
    container: Rect,
) -> ConnectorLines {
    let mut lines = ConnectorLines::default();

    for entry in visible {
        if !(entry.has_children && entry.is_expanded) {
            continue;
        }
        let Some(first_child) = entry.node.children.first() else {
            continue;
        };
        let Some(node_rects) = rects.get(&entry.node.id) else {
            continue;
        };
        let Some(children_rect) = node_rects.children else {
            continue;
        };
        let card = node_rects.card.relative_to(container);
        let target = children_rect.relative_to(container);
        let anchor = (card.center_x(), card.bottom());
        let entry_point = (target.left, target.top);
        let points = route_elbow(anchor, entry_point);
        if points.len() < 2 {
            continue;
        }
        lines.elbow.push(ElbowLine {
            from_id: entry.node.id.clone(),
            to_id: first_child.id.clone(),
            points,
        });
    }

    let top_level: Vec<&VisibleNode<'_>> = visible.iter().filter(|row| row.depth == 0).collect();
    for pair in top_level.windows(2) {
        let current = pair[0];
        let next = pair[1];
        let (Some(current_rects), Some(next_rects)) =
            (rects.get(&current.node.id), rects.get(&next.node.id))
        else {
            continue;
        };
        let (Some(current_action), Some(next_action)) =
            (current_rects.child_action, next_rects.child_action)
        else {
            continue;
        };
        let current_action = current_action.relative_to(container);
        let next_action = next_action.relative_to(container);

        let width = next_action.left - current_action.right();
        if width > 0.0 {
            lines.sibling_horizontal.insert(
                current.node.id.clone(),
                SiblingHorizontalLine {
                    node_id: current.node.id.clone(),
                    left: current_action.right(),
                    top: current_action.center_y(),
                    width,
                },
            );
        }

        let height = next_action.top - current_action.bottom();
        if height > 0.0 {
            lines.sibling_vertical.insert(
                current.node.id.clone(),
                SiblingVerticalLine {
                    node_id: current.node.id.clone(),
                    left: current_action.center_x(),
                    top: current_action.bottom(),
                    height,
                },
            );
        }
    }

    lines
}

/// Routes a parent anchor to a children-container entry point as a vertical
/// drop followed by a horizontal run. Degenerate legs collapse away; a
/// zero-length route comes back with fewer than two points.
fn route_elbow(anchor: (f32, f32), entry: (f32, f32)) -> Vec<(f32, f32)> {
    compress_points(&[anchor, (anchor.0, entry.1), entry])
}

/// Drops duplicate and collinear points from an orthogonal polyline.
fn compress_points(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for &point in points {
        if let Some(&last) = out.last()
            && (point.0 - last.0).abs() <= POINT_EPS
            && (point.1 - last.1).abs() <= POINT_EPS
        {
            continue;
        }
        out.push(point);
    }
    let mut idx = 1;
    while idx + 1 < out.len() {
        let prev = out[idx - 1];
        let curr = out[idx];
        let next = out[idx + 1];
        let same_column = (curr.0 - prev.0).abs() <= POINT_EPS && (next.0 - curr.0).abs() <= POINT_EPS;
        let same_row = (curr.1 - prev.1).abs() <= POINT_EPS && (next.1 - curr.1).abs() <= POINT_EPS;
        if same_column || same_row {
            out.remove(idx);
        } else {
            idx += 1;
        }
    }
    out
}
