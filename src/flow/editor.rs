use super::functions::FunctionDescriptor;
use super::graph::FlowGraph;
use super::node::{Condition, ConstantValue, GraphNode, Position};
use crate::error::GraphError;
use crate::ids::IdGenerator;
use crate::mapping::FieldMapping;
use crate::schema::FieldNode;

/// Where an editor session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// Only the target field is on the canvas.
    Empty,
    /// Nodes have been placed; `valid` once something feeds the target.
    Populated { valid: bool },
    /// The graph was saved. No further edits are accepted.
    Saved,
}

/// One editing session over the flow graph of a single target field.
///
/// Dropping the editor discards unsaved work; mappings saved earlier are untouched.
#[derive(Debug, Clone)]
pub struct FlowEditor {
    target: FieldNode,
    graph: FlowGraph,
    saved: bool,
}

impl FlowEditor {
    /// Starts a session on an empty canvas.
    pub fn new(target: FieldNode) -> Self {
        Self {
            graph: FlowGraph::new(target.clone()),
            target,
            saved: false,
        }
    }

    /// Starts a session on the graph of an existing mapping.
    pub fn open(mapping: &FieldMapping, source_tree: &[FieldNode], target: FieldNode) -> Self {
        Self {
            graph: FlowGraph::restore(mapping, source_tree, &target),
            target,
            saved: false,
        }
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn target(&self) -> &FieldNode {
        &self.target
    }

    pub fn state(&self) -> EditorState {
        if self.saved {
            EditorState::Saved
        } else if self.graph.is_empty() {
            EditorState::Empty
        } else {
            EditorState::Populated {
                valid: self.graph.is_valid(),
            }
        }
    }

    fn ensure_open(&self) -> Result<(), GraphError> {
        if self.saved {
            Err(GraphError::AlreadySaved)
        } else {
            Ok(())
        }
    }

    pub fn add_source_field(
        &mut self,
        tree: &[FieldNode],
        field_id: &str,
    ) -> Result<String, GraphError> {
        self.ensure_open()?;
        self.graph.add_source_field(tree, field_id)
    }

    pub fn add_function(&mut self, function: FunctionDescriptor) -> Result<String, GraphError> {
        self.ensure_open()?;
        Ok(self.graph.add_function(function))
    }

    pub fn add_constant(&mut self, value: ConstantValue) -> Result<String, GraphError> {
        self.ensure_open()?;
        Ok(self.graph.add_constant(value))
    }

    pub fn add_conditional(
        &mut self,
        condition: Condition,
        value: impl Into<String>,
    ) -> Result<String, GraphError> {
        self.ensure_open()?;
        Ok(self.graph.add_conditional(condition, value))
    }

    pub fn set_parameter(
        &mut self,
        node_id: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.graph.set_parameter(node_id, name, value)
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), GraphError> {
        self.ensure_open()?;
        self.graph.move_node(node_id, position)
    }

    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<String, GraphError> {
        self.ensure_open()?;
        self.graph
            .connect(source, source_handle, target, target_handle)
    }

    pub fn connect_to_target(&mut self, source: &str) -> Result<String, GraphError> {
        self.ensure_open()?;
        self.graph.connect_to_target(source)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Result<bool, GraphError> {
        self.ensure_open()?;
        Ok(self.graph.disconnect(edge_id))
    }

    pub fn remove(&mut self, node_id: &str) -> Result<GraphNode, GraphError> {
        self.ensure_open()?;
        self.graph.remove(node_id)
    }

    /// Saves the graph as a mapping and closes the session.
    pub fn save<G: IdGenerator>(&mut self, ids: &mut G) -> Result<FieldMapping, GraphError> {
        self.ensure_open()?;
        let mapping = self.graph.save(&self.target, ids)?;
        self.saved = true;
        Ok(mapping)
    }
}
