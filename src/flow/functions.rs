use crate::schema::FieldType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCategory {
    String,
    Numeric,
    Date,
    Conversion,
    Lookup,
    Custom,
}

/// One input of a transformation function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub required: bool,
    /// Accepts any number of connections.
    #[serde(default)]
    pub variadic: bool,
}

/// The signature of a transformation function as placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub name: String,
    pub category: FunctionCategory,
    pub parameters: Vec<ParameterSpec>,
    pub output_type: FieldType,
}

impl FunctionDescriptor {
    /// A descriptor for a function outside the built-in catalog.
    pub fn custom(name: impl Into<String>, parameters: Vec<ParameterSpec>, output_type: FieldType) -> Self {
        Self {
            name: name.into(),
            category: FunctionCategory::Custom,
            parameters,
            output_type,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The built-in function this descriptor names, if any.
    pub fn builtin(&self) -> Option<BuiltinFunction> {
        BuiltinFunction::from_name(&self.name)
    }
}

/// Defines the built-in function enum along with its name lookup and descriptors.
macro_rules! define_functions {
    ( $( ($variant:ident, $name:literal, $category:ident, $output:ident, [ $( ($param:literal, $kind:ident, $required:literal, $variadic:literal) ),* $(,)? ]) ),* $(,)? ) => {
        /// The transformation functions every runtime is expected to support.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BuiltinFunction {
            $( $variant, )*
        }

        impl BuiltinFunction {
            pub const ALL: &'static [BuiltinFunction] = &[ $( BuiltinFunction::$variant, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( BuiltinFunction::$variant => $name, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(BuiltinFunction::$variant), )*
                    _ => None,
                }
            }

            pub fn descriptor(self) -> FunctionDescriptor {
                match self {
                    $(
                        BuiltinFunction::$variant => FunctionDescriptor {
                            name: $name.to_string(),
                            category: FunctionCategory::$category,
                            parameters: vec![
                                $( ParameterSpec {
                                    name: $param.to_string(),
                                    kind: FieldType::$kind,
                                    required: $required,
                                    variadic: $variadic,
                                }, )*
                            ],
                            output_type: FieldType::$output,
                        },
                    )*
                }
            }
        }
    };
}

define_functions! {
    // String
    (Concat, "concat", String, String, [("values", String, true, true), ("separator", String, false, false)]),
    (Substring, "substring", String, String, [("value", String, true, false), ("start", Integer, true, false), ("length", Integer, false, false)]),
    (ToUpperCase, "toUpperCase", String, String, [("value", String, true, false)]),
    (ToLowerCase, "toLowerCase", String, String, [("value", String, true, false)]),
    (Trim, "trim", String, String, [("value", String, true, false)]),
    (Replace, "replace", String, String, [("value", String, true, false), ("search", String, true, false), ("replacement", String, true, false)]),
    (Split, "split", String, String, [("value", String, true, false), ("separator", String, true, false), ("index", Integer, false, false)]),

    // Numeric
    (Add, "add", Numeric, Number, [("left", Number, true, false), ("right", Number, true, false)]),
    (Subtract, "subtract", Numeric, Number, [("left", Number, true, false), ("right", Number, true, false)]),
    (Multiply, "multiply", Numeric, Number, [("left", Number, true, false), ("right", Number, true, false)]),
    (Divide, "divide", Numeric, Number, [("left", Number, true, false), ("right", Number, true, false)]),
    (Round, "round", Numeric, Number, [("value", Number, true, false), ("decimals", Integer, false, false)]),

    // Date
    (FormatDate, "formatDate", Date, String, [("value", Date, true, false), ("format", String, true, false)]),
    (CurrentDate, "currentDate", Date, Date, []),

    // Conversion
    (ToString, "toString", Conversion, String, [("value", Any, true, false)]),
    (ToNumber, "toNumber", Conversion, Number, [("value", String, true, false)]),

    // Lookup. `table` is free text, e.g. "A=Alpha;B=Beta".
    (Lookup, "lookup", Lookup, String, [("value", String, true, false), ("table", String, true, false)]),
}
