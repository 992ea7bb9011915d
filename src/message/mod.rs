pub mod filter;
pub mod kind;

pub use filter::*;
pub use kind::*;
