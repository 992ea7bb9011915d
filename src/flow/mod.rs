pub mod editor;
pub mod functions;
pub mod graph;
pub mod layout;
pub mod node;
mod persist;

pub use editor::*;
pub use functions::*;
pub use graph::*;
pub use node::*;
