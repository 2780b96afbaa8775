use crate::sanitize::types::SchemaSource;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deepest array/object nesting handed to simd-json, which recurses without a
/// limit. Matches serde_json's own recursion limit.
const MAX_NESTING: usize = 128;

/// Read and parse a schema file.
///
/// Parsing goes through simd-json first; if that fails, or the document nests
/// deeper than [`MAX_NESTING`], the bytes are parsed with serde_json, whose
/// error carries line and column.
pub fn read_schema(path: &Path) -> Result<Value> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;

    if nesting_depth(&content) <= MAX_NESTING {
        let mut scratch = content.clone();
        if let Ok(value) = simd_json::serde::from_slice::<Value>(&mut scratch) {
            return Ok(value);
        }
    }

    serde_json::from_slice(&content)
        .with_context(|| format!("Failed to parse schema: {}", path.display()))
}

/// Load a schema, turning read and parse failures into an absent tree.
///
/// The cause is only logged at debug level; reporting the absent schema is up
/// to the caller.
pub fn load_schema(path: &Path) -> SchemaSource {
    match read_schema(path) {
        Ok(schema) => SchemaSource::new(path, Some(schema)),
        Err(err) => {
            debug!("{:#}", err);
            SchemaSource::absent(path)
        }
    }
}

/// Maximum bracket nesting of raw JSON text, ignoring brackets inside strings
fn nesting_depth(content: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in content {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max_depth
}

/// Sibling of `path` with `.{suffix}` appended to the file name
pub fn output_path(path: &Path, suffix: &str) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(".");
    file_name.push(suffix);
    path.with_file_name(file_name)
}

pub fn render_schema(schema: &Value, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(schema)
    } else {
        serde_json::to_string_pretty(schema)
    };
    rendered.context("Failed to serialize schema")
}

pub fn write_schema(path: &Path, rendered: &str) -> Result<()> {
    std::fs::write(path, rendered.as_bytes())
        .with_context(|| format!("Failed to write schema: {}", path.display()))
}
