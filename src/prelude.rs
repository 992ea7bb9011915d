//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the mapflow
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use mapflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let source = std::fs::read_to_string("path/to/source.xml")?;
//! let target = std::fs::read_to_string("path/to/target.json")?;
//!
//! let source_tree = parse_structure(&filter_xml_by_message_type(&source, MessageKind::Request))?;
//! let target_tree = parse_structure(&target)?;
//!
//! let mut mapper = AutoMapper::builder().with_type_preference(true).build();
//! let report = mapper.auto_map(&source_tree, &target_tree, &[], None);
//! println!("{} mappings proposed", report.created());
//! # Ok(())
//! # }
//! ```

// Structures
pub use crate::message::{MessageKind, filter_xml_by_message_type};
pub use crate::schema::{FieldNode, FieldType, IntoFieldTree, parse_structure};

// Mappings
pub use crate::mapping::{
    AssociationMode, AssociationOutcome, AutoMapReport, AutoMapStatus, AutoMapper,
    FieldMapping, MappingSet, MatchOptions, Selection,
};

// Flow graphs
pub use crate::flow::{
    BuiltinFunction, ComparisonOperator, Condition, ConstantValue, EditorState, FlowEditor,
    FlowGraph, OUTPUT_HANDLE,
};

// Sessions and execution
pub use crate::execution::{MappingExecutor, TestRequest, TestResponse};
pub use crate::ids::{IdGenerator, SequentialIds};
pub use crate::workspace::{MappingWorkspace, Side};

// Error types
pub use crate::error::{ExecutionError, GraphError, MappingError, SchemaError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
