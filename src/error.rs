use thiserror::Error;

/// Errors that can occur while parsing a structure document into a field tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Failed to parse structure XML: {0}")]
    XmlParseError(String),

    #[error("Failed to parse JSON schema: {0}")]
    JsonParseError(String),

    #[error("Structure document has no root element")]
    MissingRoot,

    #[error("Invalid schema at '{path}': {message}")]
    InvalidSchema { path: String, message: String },

    #[error("Schema reference '{0}' could not be resolved")]
    UnresolvedReference(String),
}

/// Errors raised inside the message-type filter.
///
/// These never escape `filter_xml_by_message_type`, which degrades to the unfiltered
/// document instead. They are public so callers of the lower-level `try_filter` can
/// inspect what went wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Failed to parse XML for filtering: {0}")]
    ParseError(String),

    #[error("Document has no root element: {0}")]
    MissingRoot(String),

    #[error("Failed to rebuild filtered document: {0}")]
    TreeError(String),
}

/// Errors produced while manipulating a set of field mappings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Mapping '{0}' not found")]
    MappingNotFound(String),

    #[error("Field '{0}' not found in the loaded structure")]
    FieldNotFound(String),

    #[error("Failed to serialize mappings: {0}")]
    ExportError(String),

    #[error("Failed to read mappings: {0}")]
    ImportError(String),

    #[error("Mapping set contains more than one mapping for target '{0}'")]
    DuplicateTarget(String),
}

/// Errors produced by transformation flow graph operations.
///
/// Every variant is raised before the graph is touched, so a failed operation leaves
/// the graph exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{0}' not found in the flow graph")]
    NodeNotFound(String),

    #[error("Field '{0}' not found in the source structure")]
    FieldNotFound(String),

    #[error("Cannot connect '{source_node}' -> '{target_node}' on handle '{handle}': {message}")]
    InvalidConnection {
        source_node: String,
        target_node: String,
        handle: String,
        message: String,
    },

    #[error("Connecting '{source_node}' -> '{target_node}' would create a cycle")]
    CycleDetected {
        source_node: String,
        target_node: String,
    },

    #[error("The target field node cannot be removed")]
    CannotRemoveTarget,

    #[error("Target field '{0}' has no incoming connection")]
    TargetNotConnected(String),

    #[error("The flow editor session was already saved")]
    AlreadySaved,

    #[error("Failed to decode flow data: {0}")]
    DecodeError(String),
}

/// Errors reported by the external mapping execution service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Mapping test failed: {0}")]
    Backend(String),

    #[error("Could not reach the mapping test service: {0}")]
    Transport(String),

    #[error("Mapping test succeeded but returned no output")]
    EmptyOutput,
}
