use super::record::FieldMapping;
use crate::ids::{IdGenerator, SequentialIds};
use crate::schema::{FieldNode, collect_all};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// A source node and a target node explicitly selected by the user.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub source: &'a FieldNode,
    pub target: &'a FieldNode,
}

/// How an auto-map run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoMapStatus {
    Created(usize),
    /// Nothing matched. Not an error.
    NoMatches,
    /// A scoped leaf mapping was requested onto a target that is already mapped.
    Conflict { target_path: String },
}

/// The mappings proposed by one auto-map run.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoMapReport {
    pub mappings: Vec<FieldMapping>,
    pub status: AutoMapStatus,
}

impl AutoMapReport {
    fn from_mappings(mappings: Vec<FieldMapping>) -> Self {
        let status = match mappings.len() {
            0 => AutoMapStatus::NoMatches,
            n => AutoMapStatus::Created(n),
        };
        Self { mappings, status }
    }

    fn conflict(target_path: &str) -> Self {
        Self {
            mappings: Vec::new(),
            status: AutoMapStatus::Conflict {
                target_path: target_path.to_string(),
            },
        }
    }

    pub fn created(&self) -> usize {
        self.mappings.len()
    }
}

/// Tunables for the name-based matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Prefer a same-named candidate of equal type over the first same-named one.
    pub prefer_same_type: bool,
    /// Let objects and arrays take part in bulk matching, not only leaves.
    pub include_structural: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            prefer_same_type: true,
            include_structural: true,
        }
    }
}

/// Proposes mappings between two field trees by field name, preferring equal types.
pub struct AutoMapper<G: IdGenerator = SequentialIds> {
    options: MatchOptions,
    ids: G,
}

pub struct AutoMapperBuilder<G: IdGenerator> {
    options: MatchOptions,
    ids: G,
}

impl AutoMapperBuilder<SequentialIds> {
    pub fn new() -> Self {
        Self {
            options: MatchOptions::default(),
            ids: SequentialIds::new(),
        }
    }
}

impl Default for AutoMapperBuilder<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> AutoMapperBuilder<G> {
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }
    pub fn with_type_preference(mut self, prefer_same_type: bool) -> Self {
        self.options.prefer_same_type = prefer_same_type;
        self
    }
    pub fn with_structural_nodes(mut self, include_structural: bool) -> Self {
        self.options.include_structural = include_structural;
        self
    }
    pub fn with_id_generator<H: IdGenerator>(self, ids: H) -> AutoMapperBuilder<H> {
        AutoMapperBuilder {
            options: self.options,
            ids,
        }
    }
    pub fn build(self) -> AutoMapper<G> {
        AutoMapper {
            options: self.options,
            ids: self.ids,
        }
    }
}

impl AutoMapper<SequentialIds> {
    pub fn builder() -> AutoMapperBuilder<SequentialIds> {
        AutoMapperBuilder::new()
    }
}

impl<G: IdGenerator> AutoMapper<G> {
    /// Proposes mappings from `source` to `target`.
    ///
    /// Without a selection every node of both trees takes part. With a selection of two
    /// node-mappable fields, the pair itself is always mapped (unless its target is
    /// taken) and matching continues over their descendants; with a leaf on either side
    /// exactly that pair is mapped, or a conflict is reported.
    ///
    /// Targets already mapped in `existing` are never proposed again.
    pub fn auto_map(
        &mut self,
        source: &[FieldNode],
        target: &[FieldNode],
        existing: &[FieldMapping],
        selection: Option<Selection<'_>>,
    ) -> AutoMapReport {
        let mut used: AHashSet<String> =
            existing.iter().map(|m| m.target_path.clone()).collect();

        let report = match selection {
            Some(selection) => self.map_selection(selection, &mut used),
            None => {
                let mappings =
                    self.match_by_name(&collect_all(source), &collect_all(target), &mut used);
                AutoMapReport::from_mappings(mappings)
            }
        };

        debug!(
            scoped = selection.is_some(),
            status = ?report.status,
            "auto-map finished"
        );
        report
    }

    fn map_selection(
        &mut self,
        selection: Selection<'_>,
        used: &mut AHashSet<String>,
    ) -> AutoMapReport {
        let Selection { source, target } = selection;

        if !(source.is_node_mappable() && target.is_node_mappable()) {
            if used.contains(&target.path) {
                return AutoMapReport::conflict(&target.path);
            }
            let mapping = FieldMapping::between(&mut self.ids, source, target);
            return AutoMapReport::from_mappings(vec![mapping]);
        }

        // The selected pair is mapped whatever their names.
        let mut mappings = Vec::new();
        if used.insert(target.path.clone()) {
            mappings.push(FieldMapping::between(&mut self.ids, source, target));
        }

        let descendants = self.match_by_name(
            &collect_all(&source.children),
            &collect_all(&target.children),
            used,
        );
        mappings.extend(descendants);
        AutoMapReport::from_mappings(mappings)
    }

    /// Pairs every source node with the first unused same-named target, preferring one
    /// of the same type. Sources are visited in traversal order, so earlier sources win.
    fn match_by_name(
        &mut self,
        sources: &[&FieldNode],
        targets: &[&FieldNode],
        used: &mut AHashSet<String>,
    ) -> Vec<FieldMapping> {
        let include_structural = self.options.include_structural;

        let mut by_name: AHashMap<&str, Vec<&FieldNode>> = AHashMap::new();
        for target in targets.iter().filter(|t| include_structural || t.is_leaf()) {
            by_name.entry(target.field_name()).or_default().push(*target);
        }

        let mut pairs = Vec::new();
        for source in sources.iter().filter(|s| include_structural || s.is_leaf()) {
            let name = source.field_name();
            if name.is_empty() {
                continue;
            }
            let Some(candidates) = by_name.get(name) else {
                continue;
            };

            let unused = || candidates.iter().filter(|t| !used.contains(&t.path));
            let picked = self
                .options
                .prefer_same_type
                .then(|| unused().find(|t| t.field_type == source.field_type))
                .flatten()
                .or_else(|| unused().next());

            if let Some(target) = picked {
                used.insert(target.path.clone());
                pairs.push((*source, *target));
            }
        }

        pairs
            .into_iter()
            .map(|(source, target)| FieldMapping::between(&mut self.ids, source, target))
            .collect()
    }
}
