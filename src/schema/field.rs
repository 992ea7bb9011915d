use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural or scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Any,
    Object,
    Array,
}

impl FieldType {
    /// Maps a schema type name onto a field type. Unknown names become `Any`.
    pub fn from_type_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" => FieldType::String,
            "number" | "double" | "float" | "decimal" => FieldType::Number,
            "integer" | "int" | "long" => FieldType::Integer,
            "boolean" | "bool" => FieldType::Boolean,
            "date" | "datetime" | "date-time" => FieldType::Date,
            "object" => FieldType::Object,
            "array" => FieldType::Array,
            _ => FieldType::Any,
        }
    }

    /// Whether this type can hold children.
    pub fn is_structural(self) -> bool {
        matches!(self, FieldType::Object | FieldType::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Any => "any",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One position in a hierarchical schema tree.
///
/// Children are owned exclusively by their parent. A tree is a plain `Vec<FieldNode>` of
/// roots and is treated as a value: operations that change it return a new tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,
    #[serde(default)]
    pub expanded: bool,
}

impl FieldNode {
    /// Creates a leaf whose id is its path.
    pub fn leaf(name: impl Into<String>, path: impl Into<String>, field_type: FieldType) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            name: name.into(),
            field_type,
            path,
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Creates a structural node whose id is its path.
    pub fn branch(
        name: impl Into<String>,
        path: impl Into<String>,
        field_type: FieldType,
        children: Vec<FieldNode>,
    ) -> Self {
        Self {
            children,
            ..Self::leaf(name, path, field_type)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A node can take part in a node mapping when it is an object or array with at
    /// least one child.
    pub fn is_node_mappable(&self) -> bool {
        self.field_type.is_structural() && !self.children.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.field_type == FieldType::Array
    }

    /// The join key used to match fields across trees.
    pub fn field_name(&self) -> &str {
        field_name(&self.name)
    }
}

/// Derives the matching key from a field name: the last dot-separated segment with any
/// array brackets stripped. `"Order.items[0]"` and `"items[]"` both yield `"items"`.
pub fn field_name(name: &str) -> &str {
    let last = name.rsplit('.').next().unwrap_or(name);
    match last.find('[') {
        Some(idx) => &last[..idx],
        None => last,
    }
}

/// Returns a copy of `tree` with the `expanded` flag of the first node matching
/// `node_id` inverted. Unknown ids yield an unchanged copy.
pub fn toggle_expanded(tree: &[FieldNode], node_id: &str) -> Vec<FieldNode> {
    let mut next = tree.to_vec();
    toggle_in_place(&mut next, node_id);
    next
}

fn toggle_in_place(nodes: &mut [FieldNode], node_id: &str) -> bool {
    for node in nodes.iter_mut() {
        if node.id == node_id {
            node.expanded = !node.expanded;
            return true;
        }
        if toggle_in_place(&mut node.children, node_id) {
            return true;
        }
    }
    false
}

/// Collects every node of the tree (roots, branches and leaves) in pre-order.
pub fn collect_all(tree: &[FieldNode]) -> Vec<&FieldNode> {
    let mut out = Vec::new();
    for node in tree {
        collect_into(node, &mut out);
    }
    out
}

fn collect_into<'a>(node: &'a FieldNode, out: &mut Vec<&'a FieldNode>) {
    out.push(node);
    for child in &node.children {
        collect_into(child, out);
    }
}

/// Collects only the leaves, in pre-order.
pub fn leaves(tree: &[FieldNode]) -> Vec<&FieldNode> {
    collect_all(tree)
        .into_iter()
        .filter(|n| n.is_leaf())
        .collect()
}

/// Depth-first search for the first node with the given id.
pub fn find_by_id<'a>(tree: &'a [FieldNode], id: &str) -> Option<&'a FieldNode> {
    tree.iter().find_map(|node| {
        if node.id == id {
            Some(node)
        } else {
            find_by_id(&node.children, id)
        }
    })
}

/// Depth-first search for the node at `path`.
pub fn find_by_path<'a>(tree: &'a [FieldNode], path: &str) -> Option<&'a FieldNode> {
    tree.iter().find_map(|node| {
        if node.path == path {
            Some(node)
        } else {
            find_by_path(&node.children, path)
        }
    })
}
