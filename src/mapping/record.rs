use crate::flow::{FlowGraph, Position};
use crate::ids::IdGenerator;
use crate::schema::{FieldNode, FieldType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Function name marking a mapping between two structural fields.
pub const NODE_MAPPING: &str = "nodeMapping";
/// Function name marking a mapping produced by the flow editor.
pub const VISUAL_FLOW: &str = "visual_flow";

/// A single transformation function bound into a mapping (the non-graph form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionNodeData {
    pub id: String,
    pub function_name: String,
    /// Constant arguments, keyed by parameter name.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Source paths feeding each parameter.
    #[serde(default)]
    pub source_connections: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub position: Position,
}

impl FunctionNodeData {
    pub fn new(id: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            function_name: function_name.into(),
            parameters: BTreeMap::new(),
            source_connections: BTreeMap::new(),
            position: Position::default(),
        }
    }

    /// Marker for a structural mapping. Records both types and which sides are arrays so
    /// the execution engine can map descendants recursively.
    pub fn node_mapping(id: impl Into<String>, source: &FieldNode, target: &FieldNode) -> Self {
        let mut data = Self::new(id, NODE_MAPPING);
        data.parameters = BTreeMap::from([
            ("sourceType".to_string(), source.field_type.to_string()),
            ("targetType".to_string(), target.field_type.to_string()),
            ("isSourceArray".to_string(), source.is_array().to_string()),
            ("isTargetArray".to_string(), target.is_array().to_string()),
        ]);
        data
    }

    pub fn visual_flow(id: impl Into<String>) -> Self {
        Self::new(id, VISUAL_FLOW)
    }
}

/// What a mapping asks the execution engine to do, decoded from its function node.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingKind<'a> {
    /// Copy the source value(s) as they are.
    Direct,
    /// Map the descendants of two structural fields.
    Node {
        source_type: FieldType,
        target_type: FieldType,
        source_is_array: bool,
        target_is_array: bool,
    },
    /// Evaluate the embedded flow graph.
    VisualFlow,
    /// Apply a single legacy function.
    Function(&'a FunctionNodeData),
}

/// One persisted source-to-target binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub id: String,
    pub name: String,
    /// Display names, parallel to `source_paths`.
    #[serde(default)]
    pub source_fields: Vec<String>,
    #[serde(default)]
    pub source_paths: Vec<String>,
    pub target_field: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_node: Option<FunctionNodeData>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_flow_data"
    )]
    pub visual_flow_data: Option<FlowGraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_transformation: Option<bool>,
}

impl FieldMapping {
    /// Creates a mapping from one source field to one target field. When both fields
    /// are node-mappable it is tagged as a node mapping.
    pub fn between<G: IdGenerator>(ids: &mut G, source: &FieldNode, target: &FieldNode) -> Self {
        let id = ids.next_id("mapping");
        let function_node = (source.is_node_mappable() && target.is_node_mappable())
            .then(|| FunctionNodeData::node_mapping(ids.next_id("fn"), source, target));

        Self {
            id,
            name: format!("{} -> {}", source.name, target.name),
            source_fields: vec![source.name.clone()],
            source_paths: vec![source.path.clone()],
            target_field: target.name.clone(),
            target_path: target.path.clone(),
            function_node,
            visual_flow_data: None,
            requires_transformation: None,
        }
    }

    pub fn kind(&self) -> MappingKind<'_> {
        let Some(function) = &self.function_node else {
            return MappingKind::Direct;
        };
        match function.function_name.as_str() {
            NODE_MAPPING => {
                let param = |key: &str| function.parameters.get(key).map(String::as_str);
                MappingKind::Node {
                    source_type: FieldType::from_type_name(param("sourceType").unwrap_or("")),
                    target_type: FieldType::from_type_name(param("targetType").unwrap_or("")),
                    source_is_array: param("isSourceArray") == Some("true"),
                    target_is_array: param("isTargetArray") == Some("true"),
                }
            }
            VISUAL_FLOW => MappingKind::VisualFlow,
            _ => MappingKind::Function(function),
        }
    }

    pub fn is_node_mapping(&self) -> bool {
        matches!(self.kind(), MappingKind::Node { .. })
    }

    /// `requires_transformation` with its default applied.
    pub fn needs_transformation(&self) -> bool {
        self.requires_transformation.unwrap_or(true)
    }

    /// Appends a source unless its path is already present. Returns whether it was added.
    pub fn add_source(&mut self, name: impl Into<String>, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.source_paths.contains(&path) {
            return false;
        }
        self.source_fields.push(name.into());
        self.source_paths.push(path);
        true
    }
}

/// Flow data is normally an embedded object, but older exports stored it as a JSON
/// string. Both are accepted.
fn deserialize_flow_data<'de, D>(deserializer: D) -> Result<Option<FlowGraph>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlow {
        Graph(FlowGraph),
        Encoded(String),
    }

    match Option::<RawFlow>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawFlow::Graph(graph)) => Ok(Some(graph)),
        Some(RawFlow::Encoded(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
