use super::functions::BuiltinFunction;
use super::graph::{FlowGraph, TARGET_NODE_ID};
use super::node::{GraphNode, NodeData, OUTPUT_HANDLE, Position};
use crate::error::GraphError;
use crate::ids::IdGenerator;
use crate::mapping::{FieldMapping, FunctionNodeData, MappingKind};
use crate::schema::{FieldNode, FieldType, collect_all, field_name, find_by_path};
use itertools::Itertools;
use tracing::{debug, warn};

impl FlowGraph {
    /// Turns the graph into a mapping for `target_field`.
    ///
    /// Only source fields that are wired into the flow are listed in the flattened
    /// `source_fields`/`source_paths`; the whole graph travels along as flow data.
    pub fn save<G: IdGenerator>(
        &self,
        target_field: &FieldNode,
        ids: &mut G,
    ) -> Result<FieldMapping, GraphError> {
        if !self.is_valid() {
            return Err(GraphError::TargetNotConnected(target_field.path.clone()));
        }

        let (source_fields, source_paths): (Vec<String>, Vec<String>) = self
            .wired_source_fields()
            .into_iter()
            .unique_by(|field| field.path.clone())
            .map(|field| (field.name.clone(), field.path.clone()))
            .unzip();

        let id = ids.next_id("mapping");
        let mapping = FieldMapping {
            id,
            name: format!("{} (visual flow)", target_field.name),
            source_fields,
            source_paths,
            target_field: target_field.name.clone(),
            target_path: target_field.path.clone(),
            function_node: Some(FunctionNodeData::visual_flow(ids.next_id("fn"))),
            visual_flow_data: Some(self.clone()),
            requires_transformation: Some(true),
        };
        debug!(target = %mapping.target_path, nodes = self.nodes.len(), "saved flow graph");
        Ok(mapping)
    }

    /// Rebuilds the graph for an existing mapping.
    ///
    /// Saved flow data is returned as it was stored. Other mappings get a graph with one
    /// source node per stored source wired into the target; several sources go through
    /// a `concat` node, and a legacy function mapping gets its function node back.
    /// Sources missing from `source_tree` are fabricated from the stored name and path.
    pub fn restore(
        mapping: &FieldMapping,
        source_tree: &[FieldNode],
        target_field: &FieldNode,
    ) -> FlowGraph {
        if let Some(graph) = &mapping.visual_flow_data {
            return graph.clone();
        }

        let mut graph = FlowGraph::new(target_field.clone());
        let by_name = mapping.source_paths.is_empty();
        let sources: Vec<(String, String)> = stored_sources(mapping)
            .into_iter()
            .map(|(name, path)| {
                let field = locate_source(source_tree, &name, &path, by_name);
                let node_id = graph.add_source_node(field);
                (node_id, path)
            })
            .collect();

        let legacy = match mapping.kind() {
            MappingKind::Function(function) => Some(function),
            _ => None,
        };
        let result = match (legacy, sources.len()) {
            (Some(function), _) => restore_legacy_function(&mut graph, function, &sources),
            (None, 0) => Ok(()),
            (None, 1) => graph.connect_to_target(&sources[0].0).map(|_| ()),
            (None, _) => restore_concat(&mut graph, &sources),
        };
        if let Err(e) = result {
            warn!(mapping = %mapping.id, error = %e, "could not wire restored flow graph");
        }
        graph
    }

    /// Wires one more source field into the value reaching the target field.
    ///
    /// A target already fed by a `concat` node gets the source as another value.
    /// Otherwise a `concat` node is placed between the current producer and the target.
    /// Returns the id of the new source node; on error the graph is left untouched.
    pub fn merge_source(&mut self, field: FieldNode) -> Result<String, GraphError> {
        let target = self
            .target_node()
            .map(|n| n.id.clone())
            .ok_or_else(|| GraphError::NodeNotFound(TARGET_NODE_ID.to_string()))?;
        let producer = self.incoming(&target).next().map(|e| e.source.clone());

        let mut graph = self.clone();
        let source = graph.add_source_node(field);
        match producer {
            Some(concat) if graph.node(&concat).is_some_and(is_concat) => {
                graph.connect(&source, OUTPUT_HANDLE, &concat, "values")?;
            }
            Some(previous) => {
                let concat = graph.add_function(BuiltinFunction::Concat.descriptor());
                graph.connect(&previous, OUTPUT_HANDLE, &concat, "values")?;
                graph.connect(&source, OUTPUT_HANDLE, &concat, "values")?;
                graph.connect_to_target(&concat)?;
            }
            None => {
                graph.connect_to_target(&source)?;
            }
        }
        debug!(source = %source, "merged source into flow graph");
        *self = graph;
        Ok(source)
    }
}

fn is_concat(node: &GraphNode) -> bool {
    matches!(&node.data, NodeData::Function { function, .. }
        if function.builtin() == Some(BuiltinFunction::Concat))
}

/// `(name, path)` pairs of a mapping's sources. Paths fall back to the names.
fn stored_sources(mapping: &FieldMapping) -> Vec<(String, String)> {
    if mapping.source_paths.is_empty() {
        return mapping
            .source_fields
            .iter()
            .map(|name| (field_name(name).to_string(), name.clone()))
            .collect();
    }
    mapping
        .source_paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let name = mapping
                .source_fields
                .get(i)
                .cloned()
                .unwrap_or_else(|| field_name(path).to_string());
            (name, path.clone())
        })
        .collect()
}

fn locate_source(tree: &[FieldNode], name: &str, path: &str, by_name: bool) -> FieldNode {
    let found = if by_name {
        collect_all(tree).into_iter().find(|f| f.name == name)
    } else {
        find_by_path(tree, path)
    };
    match found {
        Some(field) => field.clone(),
        None => {
            debug!(path, "source field missing from structure, fabricating leaf");
            FieldNode::leaf(name, path, FieldType::Any)
        }
    }
}

fn restore_concat(graph: &mut FlowGraph, sources: &[(String, String)]) -> Result<(), GraphError> {
    let concat = graph.add_function(BuiltinFunction::Concat.descriptor());
    for (node_id, _) in sources {
        graph.connect(node_id, OUTPUT_HANDLE, &concat, "values")?;
    }
    graph.connect_to_target(&concat)?;
    Ok(())
}

/// Recreates a single-function mapping: sources are wired to the parameters listed in
/// `source_connections`, or to the parameters in declaration order when none are.
fn restore_legacy_function(
    graph: &mut FlowGraph,
    function: &FunctionNodeData,
    sources: &[(String, String)],
) -> Result<(), GraphError> {
    let Some(builtin) = BuiltinFunction::from_name(&function.function_name) else {
        warn!(function = %function.function_name, "unknown legacy function, wiring sources directly");
        if let Some((node_id, _)) = sources.first() {
            graph.connect_to_target(node_id)?;
        }
        return Ok(());
    };

    let descriptor = builtin.descriptor();
    let function_id = graph.add_function(descriptor.clone());
    if function.position != Position::default() {
        graph.move_node(&function_id, function.position)?;
    }
    for (name, value) in &function.parameters {
        if descriptor.parameter(name).is_some() {
            graph.set_parameter(&function_id, name, value.clone())?;
        }
    }

    if function.source_connections.is_empty() {
        let mut parameters = descriptor.parameters.iter();
        let mut current = parameters.next();
        for (node_id, _) in sources {
            let Some(parameter) = current else { break };
            graph.connect(node_id, OUTPUT_HANDLE, &function_id, &parameter.name)?;
            if !parameter.variadic {
                current = parameters.next();
            }
        }
    } else {
        for (parameter, paths) in &function.source_connections {
            for path in paths {
                if let Some((node_id, _)) = sources.iter().find(|(_, p)| p == path) {
                    graph.connect(node_id, OUTPUT_HANDLE, &function_id, parameter)?;
                }
            }
        }
    }

    graph.connect_to_target(&function_id)?;
    Ok(())
}
