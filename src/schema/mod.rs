pub mod field;
pub mod parsing;

pub use field::*;
pub use parsing::{
    IntoFieldTree, StructureFormat, parse_json_schema, parse_structure, parse_xml_structure,
    strip_bom,
};
