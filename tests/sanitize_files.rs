use jsonsan::sanitize::{load_schema, output_path};
use jsonsan::{sanitize_file, OutputConfig, UnnestConfig, Unnester};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_batch_continues_after_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.json");
    let good = dir.path().join("good.json");
    fs::write(&broken, "not json").unwrap();
    write_json(
        &good,
        &json!({"properties": {"addr": {"properties": {"city": {"type": "string"}}}}}),
    );

    let unnester = Unnester::default();
    let config = OutputConfig::default();
    let results: Vec<_> = [&broken, &good]
        .iter()
        .map(|path| sanitize_file(path, &unnester, &config))
        .collect();

    assert!(results[0].is_err());
    assert!(results[1].is_ok());
    assert!(!dir.path().join("broken.json.san").exists());
    assert_eq!(
        read_json(&dir.path().join("good.json.san")),
        json!({
            "properties": {"addr": {"$ref": "#/definitions/addr"}},
            "definitions": {"addr": {"properties": {"city": {"type": "string"}}}}
        })
    );
}

#[test]
fn test_sanitized_output_is_stable_when_sanitized_again() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("order.json");
    write_json(
        &input,
        &json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "Order",
            "type": "object",
            "properties": {
                "customer": {
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "object",
                            "properties": {"street": {"type": "string"}}
                        }
                    }
                },
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "product": {"type": "object", "properties": {"sku": {"type": "string"}}}
                        }
                    }
                }
            }
        }),
    );

    let unnester = Unnester::default();
    let config = OutputConfig::default();
    let first = sanitize_file(&input, &unnester, &config).unwrap();
    let second = sanitize_file(&first.output, &unnester, &config).unwrap();

    assert_eq!(read_json(&first.output), read_json(&second.output));
    assert!(second.report.is_unchanged());
    assert_eq!(
        first.report.externalized,
        vec!["customer", "lines_item", "address", "product"]
    );

    let sanitized = read_json(&first.output);
    assert_eq!(sanitized["title"], "Order");
    assert_eq!(
        sanitized["definitions"]["lines_item"]["properties"]["product"],
        json!({"$ref": "#/definitions/product"})
    );
}

#[test]
fn test_custom_output_and_definitions_key() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("user.json");
    write_json(&input, &json!({"properties": {"profile": {"properties": {}}}}));

    let unnester = Unnester::new(UnnestConfig {
        definitions_key: "$defs".to_string(),
        ..UnnestConfig::default()
    });
    let config = OutputConfig {
        suffix: "flat".to_string(),
        compact: true,
    };
    let file = sanitize_file(&input, &unnester, &config).unwrap();

    assert_eq!(file.output, output_path(&input, "flat"));
    assert!(!file.rendered.contains('\n'));
    assert_eq!(
        load_schema(&file.output).schema,
        Some(json!({
            "properties": {"profile": {"$ref": "#/$defs/profile"}},
            "$defs": {"profile": {"properties": {}}}
        }))
    );
}

#[test]
fn test_batch_continues_after_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("blocked.json");
    let good = dir.path().join("good.json");
    write_json(&blocked, &json!({"properties": {"a": {"properties": {}}}}));
    write_json(&good, &json!({"properties": {"b": {"properties": {}}}}));
    // A directory where the output file should go makes the write fail
    fs::create_dir(dir.path().join("blocked.json.san")).unwrap();

    let unnester = Unnester::default();
    let config = OutputConfig::default();
    let results: Vec<_> = [&blocked, &good]
        .iter()
        .map(|path| sanitize_file(path, &unnester, &config))
        .collect();

    let err = results[0].as_ref().unwrap_err();
    assert!(err.to_string().starts_with("Failed to write schema"));
    assert!(dir.path().join("blocked.json.san").is_dir());
    assert_eq!(
        read_json(&dir.path().join("good.json.san")),
        json!({
            "properties": {"b": {"$ref": "#/definitions/b"}},
            "definitions": {"b": {"properties": {}}}
        })
    );
}

#[test]
fn test_deeply_nested_input_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let deep = dir.path().join("deep.json");
    let good = dir.path().join("good.json");
    fs::write(&deep, "[".repeat(5000) + &"]".repeat(5000)).unwrap();
    write_json(&good, &json!({"properties": {"c": {"properties": {}}}}));

    let unnester = Unnester::default();
    let config = OutputConfig::default();

    let err = sanitize_file(&deep, &unnester, &config).unwrap_err();
    assert!(format!("{:#}", err).contains("recursion limit exceeded"));
    assert!(!dir.path().join("deep.json.san").exists());
    assert!(sanitize_file(&good, &unnester, &config).is_ok());
}
