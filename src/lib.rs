//! # jsonsan - JSON Schema sanitizer
//!
//! Rewrites JSON Schemas so that nested inline object schemas live in a flat
//! top-level `definitions` map and are referenced with `$ref`.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonsan::Unnester;
//! use serde_json::json;
//!
//! let mut schema = json!({
//!     "properties": {
//!         "addr": {"properties": {"city": {"type": "string"}}}
//!     }
//! });
//!
//! let report = Unnester::default().unnest(schema.as_object_mut().unwrap());
//!
//! assert_eq!(schema["properties"]["addr"], json!({"$ref": "#/definitions/addr"}));
//! assert_eq!(report.externalized, vec!["addr"]);
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod sanitize;

pub use sanitize::{
    OutputConfig, SanitizeError, SanitizedSchema, SchemaSource, UnnestConfig, UnnestReport,
    Unnester,
};

/// A schema file that was sanitized and written next to its input
#[derive(Debug, Clone)]
pub struct SanitizedFile {
    pub output: PathBuf,
    pub rendered: String,
    pub report: UnnestReport,
}

/// Main entry point: sanitize one schema file and write `<file>.<suffix>`
/// beside it.
///
/// Nothing is written when the input cannot be read or parsed; the returned
/// error names the file and carries the read or parse failure as its cause.
pub fn sanitize_file(
    path: &Path,
    unnester: &Unnester,
    config: &OutputConfig,
) -> Result<SanitizedFile> {
    let (source, cause) = match sanitize::read_schema(path) {
        Ok(schema) => (SchemaSource::new(path, Some(schema)), None),
        Err(err) => (SchemaSource::absent(path), Some(err)),
    };
    let sanitized = match unnester.sanitize(source) {
        Ok(sanitized) => sanitized,
        Err(err) => {
            return Err(match cause {
                Some(cause) => cause.context(err),
                None => err.into(),
            })
        }
    };

    let rendered = sanitize::render_schema(&sanitized.schema, config.compact)?;
    let output = sanitize::output_path(&sanitized.origin, &config.suffix);
    sanitize::write_schema(&output, &rendered)?;

    Ok(SanitizedFile {
        output,
        rendered,
        report: sanitized.report,
    })
}
