use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Naming used when externalizing nested schemas
#[derive(Debug, Clone)]
pub struct UnnestConfig {
    /// Root key holding the shared definitions map
    pub definitions_key: String,

    /// Appended to a property key to name its externalized `items` schema
    pub item_suffix: String,
}

impl UnnestConfig {
    /// Prefix of every generated `$ref`, e.g. `#/definitions/`
    pub fn reference_prefix(&self) -> String {
        format!("#/{}/", self.definitions_key)
    }
}

impl Default for UnnestConfig {
    fn default() -> Self {
        UnnestConfig {
            definitions_key: String::from("definitions"),
            item_suffix: String::from("_item"),
        }
    }
}

/// How sanitized schemas are written back to disk
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Extension appended to the input file name
    pub suffix: String,

    /// Single-line output instead of pretty-printing
    pub compact: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            suffix: String::from("san"),
            compact: false,
        }
    }
}

/// A parsed schema tagged with where it came from.
///
/// `schema` is `None` when the source could not be read or parsed.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    pub origin: PathBuf,
    pub schema: Option<Value>,
}

impl SchemaSource {
    pub fn new(origin: impl Into<PathBuf>, schema: Option<Value>) -> Self {
        SchemaSource {
            origin: origin.into(),
            schema,
        }
    }

    pub fn absent(origin: impl Into<PathBuf>) -> Self {
        Self::new(origin, None)
    }
}

/// The rewritten schema together with what the unnester did to it
#[derive(Debug, Clone)]
pub struct SanitizedSchema {
    pub origin: PathBuf,
    pub schema: Value,
    pub report: UnnestReport,
}

/// Summary of a single unnesting run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnnestReport {
    /// The definitions node was missing and an empty one was added
    pub created_definitions: bool,

    /// Definition names written, in the order they were written
    pub externalized: Vec<String>,

    /// Definition names whose previous entry was replaced
    pub overwritten: Vec<String>,

    /// Number of passes over the definitions map that externalized something
    pub rounds: usize,
}

impl UnnestReport {
    pub fn is_unchanged(&self) -> bool {
        !self.created_definitions && self.externalized.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("No JSON found at path '{}'", .0.display())]
    MissingSchema(PathBuf),

    #[error("Schema root at '{}' is {found}, expected an object", .origin.display())]
    NotAnObject { origin: PathBuf, found: &'static str },
}

/// JSON type name for diagnostics
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
