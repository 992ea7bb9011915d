pub mod matcher;
pub mod record;
pub mod set;

pub use matcher::*;
pub use record::*;
pub use set::*;
