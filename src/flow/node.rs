use super::functions::FunctionDescriptor;
use crate::schema::{FieldNode, FieldType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle every producing node emits its value on.
pub const OUTPUT_HANDLE: &str = "output";
/// The single input of target-field and conditional nodes.
pub const INPUT_HANDLE: &str = "input";

/// Canvas coordinates. Layout only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A typed literal placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(String),
}

impl ConstantValue {
    /// Reads a constant typed as `field_type` from its text form.
    pub fn parse(field_type: FieldType, text: &str) -> Option<Self> {
        match field_type {
            FieldType::Number | FieldType::Integer => {
                text.trim().parse().ok().map(ConstantValue::Number)
            }
            FieldType::Boolean => text.trim().parse().ok().map(ConstantValue::Boolean),
            FieldType::Date => Some(ConstantValue::Date(text.to_string())),
            FieldType::String | FieldType::Any => Some(ConstantValue::String(text.to_string())),
            FieldType::Object | FieldType::Array => None,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            ConstantValue::String(_) => FieldType::String,
            ConstantValue::Number(_) => FieldType::Number,
            ConstantValue::Boolean(_) => FieldType::Boolean,
            ConstantValue::Date(_) => FieldType::Date,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::String(s) | ConstantValue::Date(s) => write!(f, "{}", s),
            ConstantValue::Number(n) => write!(f, "{}", n),
            ConstantValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    StartsWith,
    IsEmpty,
    IsNotEmpty,
}

/// The test a conditional node applies to its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: ComparisonOperator,
    /// Right-hand side of the comparison. Unused by the emptiness checks.
    #[serde(default)]
    pub operand: String,
}

impl Condition {
    pub fn new(operator: ComparisonOperator, operand: impl Into<String>) -> Self {
        Self {
            operator,
            operand: operand.into(),
        }
    }
}

/// The kind-specific payload of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeData {
    SourceField {
        field: FieldNode,
    },
    Function {
        function: FunctionDescriptor,
        /// Constant arguments for parameters that are not wired.
        #[serde(default)]
        parameters: BTreeMap<String, String>,
    },
    Constant {
        value: ConstantValue,
    },
    /// Emits `value` when `condition` holds for its input.
    Conditional {
        condition: Condition,
        value: String,
    },
    TargetField {
        field: FieldNode,
    },
}

/// Node kinds without their payload; also the layout lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    SourceField,
    Constant,
    Conditional,
    Function,
    TargetField,
}

/// What an input handle accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputArity {
    /// One producer; a new edge replaces the old one.
    Single,
    /// Any number of producers.
    Many,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::SourceField { .. } => NodeKind::SourceField,
            NodeData::Function { .. } => NodeKind::Function,
            NodeData::Constant { .. } => NodeKind::Constant,
            NodeData::Conditional { .. } => NodeKind::Conditional,
            NodeData::TargetField { .. } => NodeKind::TargetField,
        }
    }

    pub fn has_output(&self) -> bool {
        !matches!(self, NodeData::TargetField { .. })
    }

    /// Resolves an input handle, or explains why the node has no such input.
    pub(crate) fn input_arity(&self, handle: &str) -> Result<InputArity, String> {
        match self {
            NodeData::SourceField { .. } | NodeData::Constant { .. } => {
                Err("node has no inputs".to_string())
            }
            NodeData::TargetField { .. } | NodeData::Conditional { .. } => {
                if handle == INPUT_HANDLE {
                    Ok(InputArity::Single)
                } else {
                    Err(format!("expected handle '{}'", INPUT_HANDLE))
                }
            }
            NodeData::Function { function, .. } => function
                .parameter(handle)
                .map(|p| {
                    if p.variadic {
                        InputArity::Many
                    } else {
                        InputArity::Single
                    }
                })
                .ok_or_else(|| format!("function '{}' has no such parameter", function.name)),
        }
    }
}

/// A node of the transformation flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// The field carried by source-field and target-field nodes.
    pub fn field(&self) -> Option<&FieldNode> {
        match &self.data {
            NodeData::SourceField { field } | NodeData::TargetField { field } => Some(field),
            _ => None,
        }
    }
}

/// A connection from a node's output handle to another node's input handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub source_handle: String,
    pub target: String,
    pub target_handle: String,
}

impl GraphEdge {
    pub fn new(source: &str, source_handle: &str, target: &str, target_handle: &str) -> Self {
        Self {
            id: format!(
                "edge-{}-{}-{}-{}",
                source, source_handle, target, target_handle
            ),
            source: source.to_string(),
            source_handle: source_handle.to_string(),
            target: target.to_string(),
            target_handle: target_handle.to_string(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Whether both edges join the same handles, whatever their ids.
    pub fn same_endpoints(&self, other: &GraphEdge) -> bool {
        self.source == other.source
            && self.source_handle == other.source_handle
            && self.target == other.target
            && self.target_handle == other.target_handle
    }
}
