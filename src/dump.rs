use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::layout::{ConnectorLines, NodeRects, Rect, VisibleNode};

/// Serializable snapshot of one layout pass: every visible card with its
/// measured boxes, plus the connector lines, all in container-relative
/// coordinates. The container itself keeps its absolute placement.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutDump {
    pub container: RectDump,
    pub cards: Vec<CardDump>,
    pub elbow: Vec<ElbowDump>,
    pub sibling_horizontal: Vec<SiblingHorizontalDump>,
    pub sibling_vertical: Vec<SiblingVerticalDump>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RectDump {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rect> for RectDump {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardDump {
    pub id: String,
    pub depth: usize,
    pub title: String,
    pub expanded: bool,
    pub has_children: bool,
    pub card: RectDump,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_action: Option<RectDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_box: Option<RectDump>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElbowDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiblingHorizontalDump {
    pub node: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiblingVerticalDump {
    pub node: String,
    pub left: f32,
    pub top: f32,
    pub height: f32,
}

impl LayoutDump {
    /// Rows without a card measurement are dropped, matching how the line
    /// calculator degrades.
    pub fn from_pass(
        visible: &[VisibleNode<'_>],
        rects: &BTreeMap<String, NodeRects>,
        container: Rect,
        lines: &ConnectorLines,
    ) -> Self {
        let mut cards = Vec::with_capacity(visible.len());
        for row in visible {
            let Some(node_rects) = rects.get(&row.node.id) else {
                continue;
            };
            cards.push(CardDump {
                id: row.node.id.clone(),
                depth: row.depth,
                title: row.node.payload.title.clone(),
                expanded: row.is_expanded,
                has_children: row.has_children,
                card: node_rects.card.relative_to(container).into(),
                child_action: node_rects
                    .child_action
                    .map(|r| r.relative_to(container).into()),
                children_box: node_rects
                    .children
                    .map(|r| r.relative_to(container).into()),
            });
        }

        let elbow = lines
            .elbow
            .iter()
            .map(|line| ElbowDump {
                from: line.from_id.clone(),
                to: line.to_id.clone(),
                points: line.points.iter().map(|&(x, y)| [x, y]).collect(),
            })
            .collect();
        let sibling_horizontal = lines
            .sibling_horizontal
            .values()
            .map(|line| SiblingHorizontalDump {
                node: line.node_id.clone(),
                left: line.left,
                top: line.top,
                width: line.width,
            })
            .collect();
        let sibling_vertical = lines
            .sibling_vertical
            .values()
            .map(|line| SiblingVerticalDump {
                node: line.node_id.clone(),
                left: line.left,
                top: line.top,
                height: line.height,
            })
            .collect();

        Self {
            container: container.into(),
            cards,
            elbow,
            sibling_horizontal,
            sibling_vertical,
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create layout dump {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), dump)
        .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_lines, visible_nodes};
    use crate::tree::{ExpansionState, TreeNode};

    fn rect(left: f32, top: f32, width: f32, height: f32) -> Rect {
        Rect::new(left, top, width, height)
    }

    #[test]
    fn dump_normalizes_cards_and_keeps_line_order() {
        let roots = vec![
            TreeNode::titled("a", "Alpha").child(TreeNode::titled("a1", "First")),
            TreeNode::titled("b", "Beta"),
        ];
        let expanded: ExpansionState = ["a"].into_iter().collect();
        let visible = visible_nodes(&roots, &expanded);

        let container = rect(100.0, 100.0, 400.0, 300.0);
        let mut rects = BTreeMap::new();
        rects.insert(
            "a".to_string(),
            NodeRects {
                card: rect(110.0, 110.0, 100.0, 50.0),
                child_action: Some(rect(140.0, 162.0, 40.0, 20.0)),
                children: Some(rect(130.0, 190.0, 120.0, 80.0)),
            },
        );
        rects.insert(
            "a1".to_string(),
            NodeRects {
                card: rect(130.0, 190.0, 100.0, 50.0),
                child_action: None,
                children: None,
            },
        );
        rects.insert(
            "b".to_string(),
            NodeRects {
                card: rect(260.0, 110.0, 100.0, 50.0),
                child_action: Some(rect(290.0, 162.0, 40.0, 20.0)),
                children: None,
            },
        );

        let lines = compute_lines(&visible, &rects, container);
        let dump = LayoutDump::from_pass(&visible, &rects, container, &lines);

        assert_eq!(dump.cards.len(), 3);
        assert_eq!(dump.cards[0].id, "a");
        assert_eq!(dump.cards[0].card.left, 10.0);
        assert_eq!(dump.cards[0].card.top, 10.0);
        assert!(dump.cards[0].expanded);
        assert_eq!(dump.cards[1].depth, 1);

        assert_eq!(dump.elbow.len(), 1);
        assert_eq!(dump.elbow[0].from, "a");
        assert_eq!(dump.elbow[0].to, "a1");
        assert!(dump.elbow[0].points.len() >= 2);
        assert_eq!(dump.sibling_horizontal.len(), 1);
        assert_eq!(dump.sibling_horizontal[0].node, "a");
    }

    #[test]
    fn rows_without_measurements_are_dropped() {
        let roots = vec![TreeNode::titled("a", "Alpha"), TreeNode::titled("b", "Beta")];
        let expanded = ExpansionState::new();
        let visible = visible_nodes(&roots, &expanded);

        let mut rects = BTreeMap::new();
        rects.insert(
            "a".to_string(),
            NodeRects {
                card: rect(0.0, 0.0, 100.0, 50.0),
                child_action: None,
                children: None,
            },
        );
        let container = rect(0.0, 0.0, 200.0, 100.0);
        let lines = ConnectorLines::default();
        let dump = LayoutDump::from_pass(&visible, &rects, container, &lines);

        assert_eq!(dump.cards.len(), 1);
        assert_eq!(dump.cards[0].id, "a");
    }

    #[test]
    fn dump_serializes_points_as_pairs() {
        let dump = LayoutDump {
            container: rect(0.0, 0.0, 10.0, 10.0).into(),
            cards: Vec::new(),
            elbow: vec![ElbowDump {
                from: "p".to_string(),
                to: "c".to_string(),
                points: vec![[1.0, 2.0], [1.0, 5.0]],
            }],
            sibling_horizontal: Vec::new(),
            sibling_vertical: Vec::new(),
        };
        let json = serde_json::to_string(&dump).unwrap();
        assert!(json.contains("[1.0,2.0]"));
        assert!(json.contains("\"sibling_horizontal\":[]"));
    }
}
