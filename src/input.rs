use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::tree::{CardData, TreeNode};

static ATTR_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(?P<attrs>[^\]]*)\]\s*$").unwrap());
static RANGE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?P<start>\d{4}-\d{2}-\d{2})?\.\.(?P<end>\d{4}-\d{2}-\d{2})?\)\s*$").unwrap()
});

#[derive(Debug, Error)]
pub enum InputError {
    #[error("duplicate goal id: {0}")]
    DuplicateId(String),

    #[error("goal {child} references missing parent {parent}")]
    DanglingParent { child: String, parent: String },

    #[error("goal {0} is unreachable from any root (cycle in parent links)")]
    CycleDetected(String),

    #[error("goal {0:?} has an empty id")]
    EmptyId(String),

    #[error("line {line}: {reason}")]
    MalformedOutline { line: usize, reason: String },

    #[error("failed to parse goal data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type InputResult<T> = Result<T, InputError>;

/// External goal record as delivered by the surrounding application. Both
/// shapes are accepted: nested `children`, or a flat list linked through
/// `parentId`. Nested placement wins when a record carries both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalEntity {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub parent_id: Option<String>,
    pub level_name: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<String>,
    pub children: Vec<GoalEntity>,
}

struct FlatGoal {
    id: String,
    payload: CardData,
    parent: Option<String>,
}

/// Maps external goal records into the render tree. The mapper owns the
/// tree guarantee: ids must be unique and non-empty, parent links must
/// resolve, and parent chains must be acyclic.
pub fn build_tree(entities: Vec<GoalEntity>) -> InputResult<Vec<TreeNode>> {
    let mut flat: Vec<FlatGoal> = Vec::new();
    for entity in entities {
        flatten_entity(entity, None, &mut flat);
    }

    let mut index_of: HashMap<String, usize> = HashMap::new();
    for (idx, goal) in flat.iter().enumerate() {
        if goal.id.is_empty() {
            return Err(InputError::EmptyId(goal.payload.title.clone()));
        }
        if index_of.insert(goal.id.clone(), idx).is_some() {
            return Err(InputError::DuplicateId(goal.id.clone()));
        }
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut root_indices: Vec<usize> = Vec::new();
    for (idx, goal) in flat.iter().enumerate() {
        match goal.parent.as_deref() {
            None => root_indices.push(idx),
            Some(parent_id) => {
                let Some(&parent_idx) = index_of.get(parent_id) else {
                    return Err(InputError::DanglingParent {
                        child: goal.id.clone(),
                        parent: parent_id.to_string(),
                    });
                };
                children_of[parent_idx].push(idx);
            }
        }
    }

    let mut visited = vec![false; flat.len()];
    let roots = root_indices
        .iter()
        .map(|&idx| assemble(idx, &flat, &children_of, &mut visited))
        .collect();

    // Every node has at most one parent, so anything the root walk missed
    // sits in (or under) a parent-link cycle.
    if let Some(stranded) = visited.iter().position(|&seen| !seen) {
        return Err(InputError::CycleDetected(flat[stranded].id.clone()));
    }

    Ok(roots)
}

fn flatten_entity(entity: GoalEntity, inherited_parent: Option<String>, out: &mut Vec<FlatGoal>) {
    let parent = if inherited_parent.is_some() {
        inherited_parent
    } else {
        entity.parent_id
    };
    let payload = CardData {
        title: entity.title,
        subtitle: entity.description,
        metadata: format_date_range(entity.start_date.as_deref(), entity.end_date.as_deref()),
        level_name: entity.level_name,
        kind: entity.kind,
    };
    let own_id = entity.id.clone();
    out.push(FlatGoal {
        id: entity.id,
        payload,
        parent,
    });
    for child in entity.children {
        flatten_entity(child, Some(own_id.clone()), out);
    }
}

fn assemble(
    idx: usize,
    flat: &[FlatGoal],
    children_of: &[Vec<usize>],
    visited: &mut [bool],
) -> TreeNode {
    visited[idx] = true;
    let goal = &flat[idx];
    let mut node = TreeNode::new(&goal.id, goal.payload.clone());
    for &child_idx in &children_of[idx] {
        node.children.push(assemble(child_idx, flat, children_of, visited));
    }
    node
}

fn format_date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (Some(start), None) => Some(format!("from {start}")),
        (None, Some(end)) => Some(format!("until {end}")),
        (None, None) => None,
    }
}

/// Parses a JSON document holding either a list of goal records or a single
/// record.
pub fn parse_goals_json(input: &str) -> InputResult<Vec<TreeNode>> {
    let entities: Vec<GoalEntity> = if input.trim_start().starts_with('[') {
        serde_json::from_str(input)?
    } else {
        vec![serde_json::from_str(input)?]
    };
    build_tree(entities)
}

/// Parses the indented outline format, two spaces per level:
///
/// ```text
/// Quarterly objectives (2024-01-01..2024-03-31) [id=q1, level=Objective]
///   Ship the importer [kind=deliverable]
///     Cut a release candidate
///   Raise test coverage
/// Hiring
/// ```
///
/// Both the date range and the `[key=value, ...]` attribute block are
/// optional; recognized attributes are `id`, `subtitle`, `level`, and
/// `kind`. Lines starting with `#` are comments. Nodes without an explicit
/// id get `g1`, `g2`, ... in file order, skipping values an earlier
/// explicit id already claimed.
pub fn parse_outline(input: &str) -> InputResult<Vec<TreeNode>> {
    let mut roots: Vec<TreeNode> = Vec::new();
    let mut stack: Vec<TreeNode> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut auto_id = 0usize;

    for (line_idx, raw_line) in input.lines().enumerate() {
        let line = line_idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let body = raw_line.trim_start_matches(' ');
        if body.starts_with('\t') {
            return Err(InputError::MalformedOutline {
                line,
                reason: "indent with spaces, two per level".to_string(),
            });
        }
        let indent = raw_line.len() - body.len();
        if indent % 2 != 0 {
            return Err(InputError::MalformedOutline {
                line,
                reason: "odd indentation; use two spaces per level".to_string(),
            });
        }
        let depth = indent / 2;
        if depth > stack.len() {
            return Err(InputError::MalformedOutline {
                line,
                reason: format!("indent jumps from depth {} to {}", stack.len(), depth),
            });
        }
        while stack.len() > depth {
            close_top(&mut stack, &mut roots);
        }

        let parsed = parse_outline_line(body.trim_end(), line)?;
        let id = match parsed.id {
            Some(id) => id,
            None => loop {
                auto_id += 1;
                let candidate = format!("g{auto_id}");
                if !seen_ids.contains(&candidate) {
                    break candidate;
                }
            },
        };
        if id.is_empty() {
            return Err(InputError::EmptyId(parsed.title));
        }
        if !seen_ids.insert(id.clone()) {
            return Err(InputError::DuplicateId(id));
        }
        let payload = CardData {
            title: parsed.title,
            subtitle: parsed.subtitle,
            metadata: format_date_range(parsed.start.as_deref(), parsed.end.as_deref()),
            level_name: parsed.level,
            kind: parsed.kind,
        };
        stack.push(TreeNode::new(&id, payload));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }
    Ok(roots)
}

fn close_top(stack: &mut Vec<TreeNode>, roots: &mut Vec<TreeNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

#[derive(Debug, Default)]
struct OutlineLine {
    title: String,
    id: Option<String>,
    subtitle: Option<String>,
    level: Option<String>,
    kind: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

fn parse_outline_line(body: &str, line: usize) -> InputResult<OutlineLine> {
    let mut parsed = OutlineLine::default();
    let mut working = body;

    if let Some(caps) = ATTR_SUFFIX_RE.captures(working)
        && let (Some(whole), Some(attrs)) = (caps.get(0), caps.name("attrs"))
    {
        for pair in attrs.as_str().split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                return Err(InputError::MalformedOutline {
                    line,
                    reason: format!("attribute {pair:?} is not key=value"),
                });
            };
            let value = value.trim().to_string();
            match key.trim() {
                "id" => parsed.id = Some(value),
                "subtitle" => parsed.subtitle = Some(value),
                "level" => parsed.level = Some(value),
                "kind" => parsed.kind = Some(value),
                other => {
                    return Err(InputError::MalformedOutline {
                        line,
                        reason: format!("unknown attribute {other:?}"),
                    });
                }
            }
        }
        working = working[..whole.start()].trim_end();
    }

    if let Some(caps) = RANGE_SUFFIX_RE.captures(working)
        && let Some(whole) = caps.get(0)
    {
        parsed.start = caps.name("start").map(|m| m.as_str().to_string());
        parsed.end = caps.name("end").map(|m| m.as_str().to_string());
        working = working[..whole.start()].trim_end();
    }

    parsed.title = working.trim().to_string();
    if parsed.title.is_empty() {
        return Err(InputError::MalformedOutline {
            line,
            reason: "missing title".to_string(),
        });
    }
    Ok(parsed)
}
