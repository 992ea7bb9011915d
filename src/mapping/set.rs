use super::matcher::AutoMapReport;
use super::record::FieldMapping;
use crate::error::MappingError;
use crate::ids::IdGenerator;
use crate::schema::{FieldNode, find_by_path};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do when a field is dropped onto a target that is already mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationMode {
    /// Add the new source to the existing mapping.
    #[default]
    Merge,
    /// Discard the existing mapping and create a new one.
    Replace,
}

/// The effect of a single association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationOutcome {
    Created(String),
    Merged(String),
    Replaced(String),
    /// The source was already part of the mapping for this target.
    Unchanged(String),
}

impl AssociationOutcome {
    pub fn mapping_id(&self) -> &str {
        match self {
            AssociationOutcome::Created(id)
            | AssociationOutcome::Merged(id)
            | AssociationOutcome::Replaced(id)
            | AssociationOutcome::Unchanged(id) => id,
        }
    }
}

/// The mappings of one session, holding at most one mapping per target path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingSet {
    mappings: Vec<FieldMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from existing mappings, rejecting two mappings for one target.
    pub fn from_mappings(mappings: Vec<FieldMapping>) -> Result<Self, MappingError> {
        if let Some(duplicate) = mappings.iter().map(|m| &m.target_path).duplicates().next() {
            return Err(MappingError::DuplicateTarget(duplicate.clone()));
        }
        Ok(Self { mappings })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter()
    }

    pub fn as_slice(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn get(&self, id: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    pub fn for_target(&self, target_path: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.target_path == target_path)
    }

    pub fn is_target_mapped(&self, target_path: &str) -> bool {
        self.for_target(target_path).is_some()
    }

    /// Associates one source field with one target field, as a drop onto the target.
    pub fn associate<G: IdGenerator>(
        &mut self,
        source: &FieldNode,
        target: &FieldNode,
        mode: AssociationMode,
        ids: &mut G,
    ) -> AssociationOutcome {
        let existing = self
            .mappings
            .iter()
            .position(|m| m.target_path == target.path);

        match (existing, mode) {
            (None, _) => {
                let mapping = FieldMapping::between(ids, source, target);
                let id = mapping.id.clone();
                self.mappings.push(mapping);
                AssociationOutcome::Created(id)
            }
            (Some(idx), AssociationMode::Merge) => {
                let mapping = &mut self.mappings[idx];
                if mapping.source_paths.contains(&source.path) {
                    return AssociationOutcome::Unchanged(mapping.id.clone());
                }
                // A saved flow graph must wire every listed source.
                let wired = match &mut mapping.visual_flow_data {
                    Some(graph) => graph.merge_source(source.clone()).map(|_| ()),
                    None => Ok(()),
                };
                if let Err(e) = wired {
                    warn!(target = %target.path, error = %e, "flow graph cannot take another source, replacing mapping");
                    return self.replace(idx, source, target, ids);
                }

                mapping.add_source(&source.name, &source.path);
                // Several sources are no longer a structural pair.
                if mapping.is_node_mapping() {
                    mapping.function_node = None;
                }
                debug!(target = %target.path, sources = mapping.source_paths.len(), "merged source into mapping");
                AssociationOutcome::Merged(mapping.id.clone())
            }
            (Some(idx), AssociationMode::Replace) => self.replace(idx, source, target, ids),
        }
    }

    fn replace<G: IdGenerator>(
        &mut self,
        idx: usize,
        source: &FieldNode,
        target: &FieldNode,
        ids: &mut G,
    ) -> AssociationOutcome {
        let mapping = FieldMapping::between(ids, source, target);
        let id = mapping.id.clone();
        self.mappings[idx] = mapping;
        AssociationOutcome::Replaced(id)
    }

    /// Adds the mappings of an auto-map run. Any proposal whose target became mapped in
    /// the meantime is skipped. Returns how many were added.
    pub fn apply_auto_map(&mut self, report: &AutoMapReport) -> usize {
        let mut added = 0;
        for mapping in &report.mappings {
            if self.is_target_mapped(&mapping.target_path) {
                debug!(target = %mapping.target_path, "skipping auto-mapped target, already mapped");
                continue;
            }
            self.mappings.push(mapping.clone());
            added += 1;
        }
        added
    }

    /// Inserts a mapping saved from the flow editor.
    ///
    /// If the target is already mapped, the existing mapping keeps its id and name and
    /// takes over the sources, function node and flow data of `mapping`. Returns the id
    /// of the stored mapping.
    pub fn upsert_flow(&mut self, mapping: FieldMapping) -> String {
        match self
            .mappings
            .iter_mut()
            .find(|m| m.target_path == mapping.target_path)
        {
            Some(existing) => {
                existing.source_fields = mapping.source_fields;
                existing.source_paths = mapping.source_paths;
                existing.function_node = mapping.function_node;
                existing.visual_flow_data = mapping.visual_flow_data;
                existing.requires_transformation = mapping.requires_transformation;
                existing.id.clone()
            }
            None => {
                let id = mapping.id.clone();
                self.mappings.push(mapping);
                id
            }
        }
    }

    /// Removes every mapping whose target or sources are missing from the given trees
    /// and returns them. An empty tree is treated as not loaded and checks nothing.
    pub fn remove_unresolved(
        &mut self,
        source_tree: &[FieldNode],
        target_tree: &[FieldNode],
    ) -> Vec<FieldMapping> {
        let resolves = |tree: &[FieldNode], path: &str| {
            tree.is_empty() || find_by_path(tree, path).is_some()
        };
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.mappings)
            .into_iter()
            .partition(|m| {
                resolves(target_tree, &m.target_path)
                    && m.source_paths.iter().all(|p| resolves(source_tree, p))
            });
        self.mappings = kept;
        for mapping in &dropped {
            debug!(target = %mapping.target_path, "dropping mapping that no longer resolves");
        }
        dropped
    }

    pub fn remove(&mut self, id: &str) -> Result<FieldMapping, MappingError> {
        let idx = self
            .mappings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| MappingError::MappingNotFound(id.to_string()))?;
        Ok(self.mappings.remove(idx))
    }

    pub fn remove_for_target(&mut self, target_path: &str) -> Option<FieldMapping> {
        let idx = self
            .mappings
            .iter()
            .position(|m| m.target_path == target_path)?;
        Some(self.mappings.remove(idx))
    }

    /// Removes every mapping whose id is listed. Returns how many were removed.
    pub fn remove_many(&mut self, ids: &[&str]) -> usize {
        let before = self.mappings.len();
        self.mappings.retain(|m| !ids.contains(&m.id.as_str()));
        before - self.mappings.len()
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    /// Serializes the set in the export format: a JSON array of mappings.
    pub fn to_json(&self) -> Result<String, MappingError> {
        serde_json::to_string_pretty(&self.mappings)
            .map_err(|e| MappingError::ExportError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let mappings: Vec<FieldMapping> =
            serde_json::from_str(json).map_err(|e| MappingError::ImportError(e.to_string()))?;
        Self::from_mappings(mappings)
    }
}

impl<'de> Deserialize<'de> for MappingSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mappings = Vec::<FieldMapping>::deserialize(deserializer)?;
        Self::from_mappings(mappings).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a FieldMapping;
    type IntoIter = std::slice::Iter<'a, FieldMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}
