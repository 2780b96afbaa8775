//! Moves nested inline object schemas into the shared definitions map.
//!
//! The root's `properties` are externalized first. The definitions map is then
//! swept repeatedly: each round picks the first entry that still has a nested
//! object (or array of objects) among its properties and externalizes those,
//! until no such entry is left.

use crate::sanitize::types::{
    kind_of, SanitizeError, SanitizedSchema, SchemaSource, UnnestConfig, UnnestReport,
};
use serde_json::{json, Map, Value};
use std::mem;
use tracing::{debug, info, warn};

const PROPERTIES: &str = "properties";
const ITEMS: &str = "items";
const REF: &str = "$ref";

/// A schema taken out of the tree, waiting to be stored under `name`
#[derive(Debug)]
struct Fragment {
    name: String,
    schema: Value,
}

/// Flattens nested schemas into `$ref`s pointing at the definitions map
#[derive(Debug, Clone, Default)]
pub struct Unnester {
    config: UnnestConfig,
}

impl Unnester {
    pub fn new(config: UnnestConfig) -> Self {
        Unnester { config }
    }

    /// Unnest a schema loaded from `source.origin`.
    ///
    /// Fails when the source has no tree (it could not be read or parsed) or
    /// when the root is not an object. Malformed schema shapes below the root
    /// never fail; they are left as they are.
    pub fn sanitize(&self, source: SchemaSource) -> Result<SanitizedSchema, SanitizeError> {
        let SchemaSource { origin, schema } = source;

        let mut root = match schema {
            None | Some(Value::Null) => return Err(SanitizeError::MissingSchema(origin)),
            Some(Value::Object(root)) => root,
            Some(other) => {
                return Err(SanitizeError::NotAnObject {
                    origin,
                    found: kind_of(&other),
                })
            }
        };

        let report = self.unnest(&mut root);

        Ok(SanitizedSchema {
            origin,
            schema: Value::Object(root),
            report,
        })
    }

    /// Rewrite `root` in place until no definition has nested objects left.
    pub fn unnest(&self, root: &mut Map<String, Value>) -> UnnestReport {
        let mut report = UnnestReport::default();
        let definitions_key = self.config.definitions_key.as_str();

        if !root.contains_key(definitions_key) {
            info!(
                "root node has no '{}' node, creating an empty '{}' node",
                definitions_key, definitions_key
            );
            root.insert(definitions_key.to_string(), Value::Object(Map::new()));
            report.created_definitions = true;
        }

        if let Some(other) = root.get(definitions_key).filter(|d| !d.is_object()) {
            warn!(
                "'{}' node is {}, leaving schema unchanged",
                definitions_key,
                kind_of(other)
            );
            return report;
        }

        let fragments = self.externalize(root);

        let Some(definitions) = root.get_mut(definitions_key).and_then(Value::as_object_mut) else {
            return report;
        };
        store(definitions, fragments, &mut report);

        while let Some(key) = first_externalizable(definitions) {
            let Some(node) = definitions.get_mut(&key).and_then(Value::as_object_mut) else {
                break;
            };
            debug!(definition = %key, "unnesting definition");
            let fragments = self.externalize(node);
            report.rounds += 1;
            store(definitions, fragments, &mut report);
        }

        report
    }

    /// Replace the nested schemas among `node`'s properties with references.
    ///
    /// Object properties are handled before array properties, so a property
    /// that is both only becomes a reference to itself.
    fn externalize(&self, node: &mut Map<String, Value>) -> Vec<Fragment> {
        let Some(properties) = node.get_mut(PROPERTIES).and_then(Value::as_object_mut) else {
            return Vec::new();
        };

        let mut fragments = Vec::new();

        for (key, value) in properties.iter_mut() {
            debug!(key = %key, "checking object property");
            if schema_object(value).is_some_and(|v| v.contains_key(PROPERTIES)) {
                let schema = mem::replace(value, self.reference_to(key));
                info!(key = %key, "externalized key");
                fragments.push(Fragment {
                    name: key.clone(),
                    schema,
                });
            }
        }

        for (key, value) in properties.iter_mut() {
            debug!(key = %key, "checking array property");
            let Some(items) = value
                .as_object_mut()
                .filter(|v| !v.contains_key(REF))
                .and_then(|v| v.get_mut(ITEMS))
                .filter(|items| schema_object(items).is_some())
            else {
                continue;
            };
            let name = format!("{}{}", key, self.config.item_suffix);
            let schema = mem::replace(items, self.reference_to(&name));
            info!(key = %key, definition = %name, "externalized key");
            fragments.push(Fragment { name, schema });
        }

        fragments
    }

    fn reference_to(&self, name: &str) -> Value {
        json!({ REF: format!("{}{}", self.config.reference_prefix(), name) })
    }
}

/// Whether `node` still holds a nested object or array of objects that the
/// sweep would move out.
pub fn is_externalizable(node: &Value) -> bool {
    let Some(properties) = schema_object(node)
        .and_then(|n| n.get(PROPERTIES))
        .and_then(Value::as_object)
    else {
        return false;
    };

    properties.values().filter_map(schema_object).any(|property| {
        property.contains_key(PROPERTIES)
            || property
                .get(ITEMS)
                .and_then(schema_object)
                .is_some_and(|items| items.contains_key(PROPERTIES))
    })
}

/// An object that is not a reference
fn schema_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object().filter(|obj| !obj.contains_key(REF))
}

fn first_externalizable(definitions: &Map<String, Value>) -> Option<String> {
    definitions
        .iter()
        .find(|(_, node)| is_externalizable(node))
        .map(|(key, _)| key.clone())
}

/// Insert fragments in order; a name already present is overwritten in place.
fn store(
    definitions: &mut Map<String, Value>,
    fragments: Vec<Fragment>,
    report: &mut UnnestReport,
) {
    for Fragment { name, schema } in fragments {
        if definitions.insert(name.clone(), schema).is_some() {
            debug!(definition = %name, "replaced existing definition");
            report.overwritten.push(name.clone());
        }
        report.externalized.push(name);
    }
}
