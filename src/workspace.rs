//! A mapping session: two loaded structures, their mappings, and the operations a
//! mapping editor performs on them.

use crate::error::{ExecutionError, GraphError, MappingError, SchemaError};
use crate::execution::{MappingExecutor, TestRequest, run_test};
use crate::flow::FlowEditor;
use crate::ids::{IdGenerator, SequentialIds};
use crate::mapping::{
    AssociationMode, AssociationOutcome, AutoMapReport, AutoMapper, FieldMapping, MappingSet,
    MatchOptions, Selection,
};
use crate::message::{MessageKind, filter_xml_by_message_type};
use crate::schema::{
    FieldNode, StructureFormat, find_by_path, parse_structure, strip_bom, toggle_expanded,
};
use tracing::{debug, info};

/// Which side of the mapping a structure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// A structure document as provided, the part of it used for `kind`, and its tree.
#[derive(Debug, Clone, Default, PartialEq)]
struct LoadedStructure {
    raw: String,
    document: String,
    tree: Vec<FieldNode>,
}

impl LoadedStructure {
    fn load(raw: &str, kind: MessageKind) -> Result<Self, SchemaError> {
        let content = strip_bom(raw);
        let document = match StructureFormat::detect(content) {
            Some(StructureFormat::Xml) => filter_xml_by_message_type(content, kind),
            _ => content.to_string(),
        };
        let tree = parse_structure(&document)?;
        Ok(Self {
            raw: raw.to_string(),
            document,
            tree,
        })
    }
}

/// State of one mapping session.
///
/// Structures are filtered to the session's message kind before parsing. A structure
/// that fails to load leaves the previously loaded one in place.
#[derive(Debug, Clone)]
pub struct MappingWorkspace<G: IdGenerator = SequentialIds> {
    kind: MessageKind,
    source: LoadedStructure,
    target: LoadedStructure,
    mappings: MappingSet,
    options: MatchOptions,
    ids: G,
}

impl MappingWorkspace<SequentialIds> {
    pub fn new(kind: MessageKind) -> Self {
        Self::with_ids(kind, SequentialIds::new())
    }
}

impl<G: IdGenerator> MappingWorkspace<G> {
    pub fn with_ids(kind: MessageKind, ids: G) -> Self {
        Self {
            kind,
            source: LoadedStructure::default(),
            target: LoadedStructure::default(),
            mappings: MappingSet::new(),
            options: MatchOptions::default(),
            ids,
        }
    }

    pub fn with_match_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn message_kind(&self) -> MessageKind {
        self.kind
    }

    pub fn source_tree(&self) -> &[FieldNode] {
        &self.source.tree
    }

    pub fn target_tree(&self) -> &[FieldNode] {
        &self.target.tree
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    pub fn mappings_mut(&mut self) -> &mut MappingSet {
        &mut self.mappings
    }

    fn side(&self, side: Side) -> &LoadedStructure {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut LoadedStructure {
        match side {
            Side::Source => &mut self.source,
            Side::Target => &mut self.target,
        }
    }

    // --- Structures ---

    /// Loads a structure document (XML sample or JSON schema) for one side.
    pub fn load(&mut self, side: Side, document: &str) -> Result<&[FieldNode], SchemaError> {
        let loaded = LoadedStructure::load(document, self.kind)?;
        info!(?side, roots = loaded.tree.len(), "loaded structure");
        let slot = self.side_mut(side);
        *slot = loaded;
        Ok(&slot.tree)
    }

    pub fn load_source(&mut self, document: &str) -> Result<&[FieldNode], SchemaError> {
        self.load(Side::Source, document)
    }

    pub fn load_target(&mut self, document: &str) -> Result<&[FieldNode], SchemaError> {
        self.load(Side::Target, document)
    }

    /// Switches the message kind and re-derives both trees from their raw documents.
    ///
    /// Both sides are parsed before either is replaced, so a failure changes nothing.
    /// Mappings whose fields are gone from the new trees are removed and returned.
    pub fn set_message_kind(
        &mut self,
        kind: MessageKind,
    ) -> Result<Vec<FieldMapping>, SchemaError> {
        let reload = |loaded: &LoadedStructure| {
            if loaded.raw.is_empty() {
                Ok(LoadedStructure::default())
            } else {
                LoadedStructure::load(&loaded.raw, kind)
            }
        };
        let source = reload(&self.source)?;
        let target = reload(&self.target)?;

        debug!(from = %self.kind, to = %kind, "switched message kind");
        self.kind = kind;
        self.source = source;
        self.target = target;

        let dropped = self
            .mappings
            .remove_unresolved(&self.source.tree, &self.target.tree);
        if !dropped.is_empty() {
            info!(dropped = dropped.len(), "removed mappings outside the new message kind");
        }
        Ok(dropped)
    }

    pub fn toggle_expanded(&mut self, side: Side, node_id: &str) {
        let slot = self.side_mut(side);
        slot.tree = toggle_expanded(&slot.tree, node_id);
    }

    // --- Mappings ---

    /// Drops the source field at `source_path` onto the target field at `target_path`.
    pub fn associate(
        &mut self,
        source_path: &str,
        target_path: &str,
        mode: AssociationMode,
    ) -> Result<AssociationOutcome, MappingError> {
        let source = find_by_path(&self.source.tree, source_path)
            .ok_or_else(|| MappingError::FieldNotFound(source_path.to_string()))?;
        let target = find_by_path(&self.target.tree, target_path)
            .ok_or_else(|| MappingError::FieldNotFound(target_path.to_string()))?;
        Ok(self
            .mappings
            .associate(source, target, mode, &mut self.ids))
    }

    /// Runs the auto-mapper over the whole trees, or over a selected `(source, target)`
    /// pair of paths, and adds what it proposes.
    pub fn auto_map(
        &mut self,
        selection: Option<(&str, &str)>,
    ) -> Result<AutoMapReport, MappingError> {
        let selection = match selection {
            Some((source_path, target_path)) => Some(Selection {
                source: find_by_path(&self.source.tree, source_path)
                    .ok_or_else(|| MappingError::FieldNotFound(source_path.to_string()))?,
                target: find_by_path(&self.target.tree, target_path)
                    .ok_or_else(|| MappingError::FieldNotFound(target_path.to_string()))?,
            }),
            None => None,
        };

        let mut mapper = AutoMapper::builder()
            .with_options(self.options)
            .with_id_generator(&mut self.ids)
            .build();
        let report = mapper.auto_map(
            &self.source.tree,
            &self.target.tree,
            self.mappings.as_slice(),
            selection,
        );
        let added = self.mappings.apply_auto_map(&report);
        info!(added, status = ?report.status, "applied auto-map");
        Ok(report)
    }

    // --- Flow editing ---

    /// Opens the flow editor for the target field at `target_path`, restoring the graph
    /// of its current mapping if there is one.
    pub fn open_flow_editor(&self, target_path: &str) -> Result<FlowEditor, MappingError> {
        let target = find_by_path(&self.target.tree, target_path)
            .ok_or_else(|| MappingError::FieldNotFound(target_path.to_string()))?
            .clone();
        Ok(match self.mappings.for_target(target_path) {
            Some(mapping) => FlowEditor::open(mapping, &self.source.tree, target),
            None => FlowEditor::new(target),
        })
    }

    /// Saves the editor's graph into the mapping set. Returns the stored mapping's id.
    pub fn commit_flow(&mut self, editor: &mut FlowEditor) -> Result<String, GraphError> {
        let mapping = editor.save(&mut self.ids)?;
        Ok(self.mappings.upsert_flow(mapping))
    }

    // --- Testing ---

    /// Builds the request for a test run of the current mappings against `input_xml`.
    pub fn test_request(&self, input_xml: impl Into<String>) -> TestRequest {
        TestRequest {
            input_xml: input_xml.into(),
            mappings: self.mappings.as_slice().to_vec(),
            mapping_type: self.kind,
            source_structure_xml: self.side(Side::Source).document.clone(),
            target_structure_xml: self.side(Side::Target).document.clone(),
        }
    }

    /// Tests the current mappings against `input_xml`. The mapping set is never changed.
    pub fn run_test<E: MappingExecutor + ?Sized>(
        &self,
        executor: &E,
        input_xml: impl Into<String>,
    ) -> Result<String, ExecutionError> {
        run_test(executor, &self.test_request(input_xml))
    }
}
