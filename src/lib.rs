//! # mapflow - Field Mapping and Transformation Graph Engine
//!
//! **mapflow** is the model behind a schema mapping editor. It turns a source and a
//! target structure (XML samples or JSON schemas) into field trees, proposes
//! source-to-target field mappings by name, and lets individual target fields be
//! computed by a small transformation graph of source fields, constants, conditionals
//! and functions. The resulting mappings serialize to a JSON format consumed by an
//! external execution engine.
//!
//! ## Core Workflow
//!
//! 1.  **Load Structures**: Parse both sides into field trees. Combined XML documents
//!     holding request, response and fault messages are first narrowed to one kind by
//!     the message filter.
//! 2.  **Map**: Drop fields onto each other, or let the `AutoMapper` pair fields by
//!     name. Fields that need more than a copy get a `FlowGraph`.
//! 3.  **Export or Test**: Serialize the `MappingSet`, or hand it to a
//!     `MappingExecutor` together with an input document.
//!
//! `MappingWorkspace` strings these steps together for one session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut workspace = MappingWorkspace::new(MessageKind::Request);
//!     workspace.load_source(
//!         "<Order><orderId>1</orderId><customer><name>A</name></customer></Order>",
//!     )?;
//!     workspace.load_target(
//!         "<PurchaseOrder><orderId>1</orderId><customerName>A</customerName></PurchaseOrder>",
//!     )?;
//!
//!     // Pair fields by name.
//!     let report = workspace.auto_map(None)?;
//!     println!("auto-map: {:?}", report.status);
//!
//!     // Compute customerName with a flow graph: upper-case the customer's name.
//!     let mut editor = workspace.open_flow_editor("PurchaseOrder.customerName")?;
//!     let name = editor.add_source_field(workspace.source_tree(), "Order.customer.name")?;
//!     let upper = editor.add_function(BuiltinFunction::ToUpperCase.descriptor())?;
//!     editor.connect(&name, OUTPUT_HANDLE, &upper, "value")?;
//!     editor.connect_to_target(&upper)?;
//!     workspace.commit_flow(&mut editor)?;
//!
//!     println!("{}", workspace.mappings().to_json()?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod flow;
pub mod ids;
pub mod mapping;
pub mod message;
pub mod prelude;
pub mod schema;
pub mod workspace;
