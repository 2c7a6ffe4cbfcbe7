use std::collections::HashSet;

/// Display payload carried by every tree node. Opaque to the layout engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardData {
    pub title: String,
    pub subtitle: Option<String>,
    pub metadata: Option<String>,
    pub level_name: Option<String>,
    pub kind: Option<String>,
}

impl CardData {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

/// One goal in the hierarchy. Child order is render order; the node owns its
/// subtree exclusively (no shared or aliased subtrees). Ids must be unique
/// across the whole tree and stable across data refreshes, since expansion
/// state and measured rectangles are keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub payload: CardData,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: &str, payload: CardData) -> Self {
        Self {
            id: id.to_string(),
            payload,
            children: Vec::new(),
        }
    }

    pub fn titled(id: &str, title: &str) -> Self {
        Self::new(id, CardData::titled(title))
    }

    pub fn child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::subtree_len)
            .sum::<usize>()
    }
}

/// Set of node ids whose children are currently rendered. Owned by the
/// caller; the engine only reads it and emits [`UserIntent::ExpandToggled`]
/// requests instead of mutating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Flips the state for `id` and returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    /// Expands every node in `roots` that has children.
    pub fn expand_all(&mut self, roots: &[TreeNode]) {
        for node in roots {
            if node.has_children() {
                self.expanded.insert(node.id.clone());
                self.expand_all(&node.children);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl FromIterator<String> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// User interactions surfaced by the engine. The surrounding page applies
/// them (navigation, expansion mutation, child creation); the engine never
/// applies them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    NodeClicked { id: String },
    ExpandToggled { id: String },
    CreateChildRequested { id: String },
}
