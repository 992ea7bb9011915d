use super::field::{FieldNode, FieldType};
use crate::error::SchemaError;
use serde_json::Value;
use tracing::debug;
use xot::{Node, Xot};

/// The kind of document a structure string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Xml,
    JsonSchema,
}

impl StructureFormat {
    /// Guesses the format from the first non-whitespace character after any byte order mark.
    pub fn detect(document: &str) -> Option<Self> {
        match strip_bom(document).trim_start().chars().next()? {
            '<' => Some(StructureFormat::Xml),
            '{' => Some(StructureFormat::JsonSchema),
            _ => None,
        }
    }
}

/// Drops a leading UTF-8 byte order mark.
pub fn strip_bom(document: &str) -> &str {
    document.strip_prefix('\u{feff}').unwrap_or(document)
}

/// A trait for structure documents that can be converted into a field tree.
///
/// This is the extension point for structure sources beyond the built-in XML and JSON
/// schema parsers: implement it on your own representation and the rest of the engine
/// works on the resulting tree.
pub trait IntoFieldTree {
    fn into_field_tree(self) -> Result<Vec<FieldNode>, SchemaError>;
}

impl IntoFieldTree for &str {
    fn into_field_tree(self) -> Result<Vec<FieldNode>, SchemaError> {
        parse_structure(self)
    }
}

/// Parses an XML sample or a JSON schema, detecting which one it is.
pub fn parse_structure(document: &str) -> Result<Vec<FieldNode>, SchemaError> {
    let document = strip_bom(document);
    match StructureFormat::detect(document) {
        Some(StructureFormat::Xml) => parse_xml_structure(document),
        Some(StructureFormat::JsonSchema) => parse_json_schema(document),
        None => Err(SchemaError::InvalidSchema {
            path: "#".to_string(),
            message: "document is neither XML nor a JSON schema".to_string(),
        }),
    }
}

// --- XML ---

/// Parses an XML sample document into a single-root field tree.
///
/// Elements with element children become objects; repeated sibling elements collapse
/// into one array node shaped like their first occurrence. Leaf types are inferred
/// from the text content.
pub fn parse_xml_structure(xml: &str) -> Result<Vec<FieldNode>, SchemaError> {
    let mut xot = Xot::new();
    let doc = xot
        .parse(xml)
        .map_err(|e| SchemaError::XmlParseError(e.to_string()))?;
    let root = xot
        .document_element(doc)
        .map_err(|_| SchemaError::MissingRoot)?;
    let name = element_name(&xot, root).ok_or(SchemaError::MissingRoot)?;

    let mut tree = build_xml_node(&xot, root, &name, &name);
    if tree.is_leaf() {
        tree.field_type = FieldType::Object;
    }
    debug!(root = %name, "parsed XML structure");
    Ok(vec![tree])
}

pub(crate) fn element_name(xot: &Xot, node: Node) -> Option<String> {
    xot.element(node)
        .map(|element| xot.local_name_str(element.name()).to_string())
}

fn build_xml_node(xot: &Xot, node: Node, name: &str, path: &str) -> FieldNode {
    // (name, first occurrence, occurrence count), in document order
    let mut groups: Vec<(String, Node, usize)> = Vec::new();
    for child in xot.children(node) {
        if let Some(child_name) = element_name(xot, child) {
            match groups.iter_mut().find(|(n, _, _)| *n == child_name) {
                Some(group) => group.2 += 1,
                None => groups.push((child_name, child, 1)),
            }
        }
    }

    if groups.is_empty() {
        let text: String = xot.children(node).filter_map(|c| xot.text_str(c)).collect();
        return FieldNode::leaf(name, path, infer_scalar_type(text.trim()));
    }

    let children = groups
        .into_iter()
        .map(|(child_name, first, count)| {
            let child_path = format!("{}.{}", path, child_name);
            let mut child = build_xml_node(xot, first, &child_name, &child_path);
            if count > 1 {
                child.field_type = FieldType::Array;
            }
            child
        })
        .collect();

    FieldNode::branch(name, path, FieldType::Object, children)
}

fn infer_scalar_type(text: &str) -> FieldType {
    if text.is_empty() {
        FieldType::String
    } else if text.parse::<f64>().is_ok_and(f64::is_finite) {
        FieldType::Number
    } else if text == "true" || text == "false" {
        FieldType::Boolean
    } else {
        FieldType::String
    }
}

// --- JSON schema ---

/// Parses a JSON schema. Each top-level property becomes a root of the tree.
pub fn parse_json_schema(json: &str) -> Result<Vec<FieldNode>, SchemaError> {
    let schema: Value =
        serde_json::from_str(json).map_err(|e| SchemaError::JsonParseError(e.to_string()))?;
    let builder = SchemaTreeBuilder { document: &schema };

    let mut active_refs = Vec::new();
    let top = builder.resolve(&schema, &mut active_refs)?;
    let properties = top
        .and_then(|s| s.get("properties"))
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::InvalidSchema {
            path: "#".to_string(),
            message: "top-level schema has no properties".to_string(),
        })?;

    let roots = properties
        .iter()
        .map(|(name, prop)| builder.build(name, name, prop, &mut active_refs))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(roots = roots.len(), "parsed JSON schema structure");
    Ok(roots)
}

struct SchemaTreeBuilder<'a> {
    document: &'a Value,
}

impl<'a> SchemaTreeBuilder<'a> {
    /// Follows `$ref` chains. Returns `None` when the reference is already being
    /// expanded further up, which is how recursive schemas are cut.
    fn resolve(
        &self,
        schema: &'a Value,
        active_refs: &mut Vec<String>,
    ) -> Result<Option<&'a Value>, SchemaError> {
        let mut current = schema;
        let mut hops = 0;
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            if active_refs.iter().any(|r| r == reference) {
                return Ok(None);
            }
            hops += 1;
            if hops > 16 {
                return Err(SchemaError::UnresolvedReference(reference.to_string()));
            }
            current = self.lookup(reference)?;
        }
        Ok(Some(current))
    }

    fn lookup(&self, reference: &str) -> Result<&'a Value, SchemaError> {
        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))?;
        self.document
            .pointer(pointer)
            .ok_or_else(|| SchemaError::UnresolvedReference(reference.to_string()))
    }

    fn build(
        &self,
        name: &str,
        path: &str,
        schema: &'a Value,
        active_refs: &mut Vec<String>,
    ) -> Result<FieldNode, SchemaError> {
        let reference = schema.get("$ref").and_then(Value::as_str);
        let Some(resolved) = self.resolve(schema, active_refs)? else {
            debug!(path, "recursive schema reference cut");
            return Ok(FieldNode::leaf(name, path, FieldType::Object));
        };

        if let Some(r) = reference {
            active_refs.push(r.to_string());
        }
        let node = self.build_resolved(name, path, resolved, active_refs);
        if reference.is_some() {
            active_refs.pop();
        }
        node
    }

    fn build_resolved(
        &self,
        name: &str,
        path: &str,
        schema: &'a Value,
        active_refs: &mut Vec<String>,
    ) -> Result<FieldNode, SchemaError> {
        let field_type = schema_type(schema);
        let children = match field_type {
            FieldType::Object => self.build_properties(path, schema, active_refs)?,
            FieldType::Array => match schema.get("items") {
                Some(items) => match self.resolve(items, active_refs)? {
                    Some(resolved) if schema_type(resolved) == FieldType::Object => {
                        self.build_properties(path, resolved, active_refs)?
                    }
                    _ => Vec::new(),
                },
                None => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(FieldNode::branch(name, path, field_type, children))
    }

    fn build_properties(
        &self,
        path: &str,
        schema: &'a Value,
        active_refs: &mut Vec<String>,
    ) -> Result<Vec<FieldNode>, SchemaError> {
        let Some(properties) = schema.get("properties") else {
            return Ok(Vec::new());
        };
        let properties = properties
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema {
                path: path.to_string(),
                message: "'properties' must be an object".to_string(),
            })?;
        properties
            .iter()
            .map(|(child_name, child)| {
                let child_path = format!("{}.{}", path, child_name);
                self.build(child_name, &child_path, child, active_refs)
            })
            .collect()
    }
}

fn schema_type(schema: &Value) -> FieldType {
    let declared = match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    };

    match declared {
        Some("string") => match schema.get("format").and_then(Value::as_str) {
            Some("date") | Some("date-time") => FieldType::Date,
            _ => FieldType::String,
        },
        Some(other) => FieldType::from_type_name(other),
        None if schema.get("properties").is_some() => FieldType::Object,
        None if schema.get("items").is_some() => FieldType::Array,
        None => FieldType::Any,
    }
}
