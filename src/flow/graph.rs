use super::functions::FunctionDescriptor;
use super::layout::lane_position;
use super::node::{
    Condition, ConstantValue, GraphEdge, GraphNode, INPUT_HANDLE, InputArity, NodeData, NodeKind,
    OUTPUT_HANDLE, Position,
};
use crate::error::GraphError;
use crate::schema::{FieldNode, find_by_id};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Id of the target-field node in graphs created by this crate.
pub const TARGET_NODE_ID: &str = "target";

/// A directed acyclic graph describing how one target field's value is computed.
///
/// The graph is built only through its methods, which keep it free of dangling edges,
/// cycles and competing producers on single-valued inputs. A failing method returns an
/// error and leaves the graph untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// The number used for the next node id.
    pub node_id_counter: u64,
}

impl FlowGraph {
    /// Creates a graph holding only the target-field node.
    pub fn new(target: FieldNode) -> Self {
        Self {
            nodes: vec![GraphNode {
                id: TARGET_NODE_ID.to_string(),
                position: lane_position(NodeKind::TargetField, 0),
                data: NodeData::TargetField { field: target },
            }],
            edges: Vec::new(),
            node_id_counter: 1,
        }
    }

    // --- Queries ---

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn target_node(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.kind() == NodeKind::TargetField)
    }

    pub fn target_field(&self) -> Option<&FieldNode> {
        self.target_node().and_then(GraphNode::field)
    }

    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// A graph can be saved once something feeds its target field.
    pub fn is_valid(&self) -> bool {
        self.target_node()
            .is_some_and(|target| self.incoming(&target.id).next().is_some())
    }

    /// Whether anything besides the target node has been placed.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.kind() == NodeKind::TargetField)
    }

    /// Source-field nodes with at least one outgoing edge, in placement order.
    pub fn wired_source_fields(&self) -> Vec<&FieldNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::SourceField)
            .filter(|n| self.outgoing(&n.id).next().is_some())
            .filter_map(GraphNode::field)
            .collect()
    }

    // --- Node placement ---

    fn push_node(&mut self, data: NodeData) -> String {
        let kind = data.kind();
        let id = format!("node-{}", self.node_id_counter);
        self.node_id_counter += 1;

        let lane_index = self.nodes.iter().filter(|n| n.kind() == kind).count();
        self.nodes.push(GraphNode {
            id: id.clone(),
            position: lane_position(kind, lane_index),
            data,
        });
        id
    }

    /// Places the source field with id `field_id` from `tree`.
    pub fn add_source_field(
        &mut self,
        tree: &[FieldNode],
        field_id: &str,
    ) -> Result<String, GraphError> {
        let field = find_by_id(tree, field_id)
            .ok_or_else(|| GraphError::FieldNotFound(field_id.to_string()))?;
        Ok(self.add_source_node(field.clone()))
    }

    /// Places a source-field node for a field that is already at hand.
    pub fn add_source_node(&mut self, field: FieldNode) -> String {
        self.push_node(NodeData::SourceField { field })
    }

    pub fn add_function(&mut self, function: FunctionDescriptor) -> String {
        self.push_node(NodeData::Function {
            function,
            parameters: BTreeMap::new(),
        })
    }

    pub fn add_constant(&mut self, value: ConstantValue) -> String {
        self.push_node(NodeData::Constant { value })
    }

    pub fn add_conditional(&mut self, condition: Condition, value: impl Into<String>) -> String {
        self.push_node(NodeData::Conditional {
            condition,
            value: value.into(),
        })
    }

    /// Sets a constant argument on a function node.
    pub fn set_parameter(
        &mut self,
        node_id: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

        match &mut node.data {
            NodeData::Function {
                function,
                parameters,
            } if function.parameter(name).is_some() => {
                parameters.insert(name.to_string(), value.into());
                Ok(())
            }
            _ => Err(GraphError::InvalidConnection {
                source_node: String::new(),
                target_node: node_id.to_string(),
                handle: name.to_string(),
                message: "not a parameter of this node".to_string(),
            }),
        }
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.position = position;
        Ok(())
    }

    // --- Edges ---

    /// Connects `source`'s output to `target`'s `target_handle` input.
    ///
    /// Inputs that take a single producer (the target field, conditionals and
    /// non-variadic function parameters) drop their previous edge. Connecting an edge
    /// that already exists is a no-op. Returns the edge id.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<String, GraphError> {
        let invalid = |message: String| GraphError::InvalidConnection {
            source_node: source.to_string(),
            target_node: target.to_string(),
            handle: target_handle.to_string(),
            message,
        };

        let source_node = self
            .node(source)
            .ok_or_else(|| GraphError::NodeNotFound(source.to_string()))?;
        let target_node = self
            .node(target)
            .ok_or_else(|| GraphError::NodeNotFound(target.to_string()))?;

        if !source_node.data.has_output() {
            return Err(invalid("the target field has no output".to_string()));
        }
        if source_handle != OUTPUT_HANDLE {
            return Err(invalid(format!(
                "unknown output handle '{}'",
                source_handle
            )));
        }
        let arity = target_node.data.input_arity(target_handle).map_err(invalid)?;
        if source == target || self.reaches(target, source) {
            return Err(GraphError::CycleDetected {
                source_node: source.to_string(),
                target_node: target.to_string(),
            });
        }

        let edge = GraphEdge::new(source, source_handle, target, target_handle);
        if let Some(existing) = self.edges.iter().find(|e| e.same_endpoints(&edge)) {
            return Ok(existing.id.clone());
        }

        if arity == InputArity::Single {
            self.edges
                .retain(|e| !(e.target == target && e.target_handle == target_handle));
        }
        debug!(edge = %edge.id, "connected flow nodes");
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(id)
    }

    /// Convenience for wiring a node straight into the target field.
    pub fn connect_to_target(&mut self, source: &str) -> Result<String, GraphError> {
        let target = self
            .target_node()
            .map(|n| n.id.clone())
            .ok_or_else(|| GraphError::NodeNotFound(TARGET_NODE_ID.to_string()))?;
        self.connect(source, OUTPUT_HANDLE, &target, INPUT_HANDLE)
    }

    /// Removes one edge. Returns whether it existed.
    pub fn disconnect(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        self.edges.len() != before
    }

    /// Removes a node together with every edge touching it.
    pub fn remove(&mut self, node_id: &str) -> Result<GraphNode, GraphError> {
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        if self.nodes[idx].kind() == NodeKind::TargetField {
            return Err(GraphError::CannotRemoveTarget);
        }

        self.edges.retain(|e| !e.touches(node_id));
        Ok(self.nodes.remove(idx))
    }

    /// Whether `to` can be reached from `from` by following edges.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut visited = AHashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.outgoing(current).map(|e| e.target.as_str()));
            }
        }
        false
    }

    // --- Encoding ---

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(self).map_err(|e| GraphError::DecodeError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        serde_json::from_str(json).map_err(|e| GraphError::DecodeError(e.to_string()))
    }
}
