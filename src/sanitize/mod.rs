//! Schema sanitizing - flatten nested inline schemas into `definitions`
//!
//! Nested object schemas under `properties` (and object schemas under an
//! array's `items`) are moved into the root's `definitions` map and replaced
//! with `$ref` pointers, repeatedly, until every definition is flat.

pub mod io;
pub mod types;
pub mod unnester;

pub use io::{load_schema, output_path, read_schema, render_schema, write_schema};
pub use types::{
    OutputConfig, SanitizeError, SanitizedSchema, SchemaSource, UnnestConfig, UnnestReport,
};
pub use unnester::{is_externalizable, Unnester};
