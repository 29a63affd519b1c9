// Re-emits a parsed schema tree back into its JSON form. Used for schema
// equality (two schemas are equal when their emitted forms match) and for
// Schema::to_json.
//
// `seen` tracks fullnames of named types already emitted in full along this
// path; a later reference to one emits as the bare name reference instead of
// re-expanding its definition, mirroring how a recursive schema is written.

use super::{NodeKind, SchemaNode};
use serde_json::{json, Map, Value as JsonValue};

pub(super) fn to_json(node: &SchemaNode, seen: &mut Vec<String>) -> JsonValue {
    let mut value = kind_to_json(&node.kind, seen);
    if let Some(logical_type) = &node.logical_type {
        box_as_object(&mut value).insert("logicalType".to_string(), json!(logical_type));
    }
    if !node.properties.is_empty() {
        let map = box_as_object(&mut value);
        for (k, v) in &node.properties {
            map.insert(k.clone(), v.clone());
        }
    }
    value
}

/// Ensures `value` is a JSON object, wrapping a bare `"type": <value>` form
/// around it first if it is a plain string (e.g. `"long"`), so an extra
/// attribute (`logicalType`, a custom property) can be inserted into it.
fn box_as_object(value: &mut JsonValue) -> &mut Map<String, JsonValue> {
    if !matches!(value, JsonValue::Object(_)) {
        let mut map = Map::new();
        map.insert("type".to_string(), value.clone());
        *value = JsonValue::Object(map);
    }
    match value {
        JsonValue::Object(map) => map,
        _ => unreachable!(),
    }
}

fn kind_to_json(kind: &NodeKind, seen: &mut Vec<String>) -> JsonValue {
    match kind {
        NodeKind::Null => json!("null"),
        NodeKind::Boolean => json!("boolean"),
        NodeKind::Int => json!("int"),
        NodeKind::Long => json!("long"),
        NodeKind::Float => json!("float"),
        NodeKind::Double => json!("double"),
        NodeKind::Bytes => json!("bytes"),
        NodeKind::Str => json!("string"),
        NodeKind::Named(name) => json!(name),
        NodeKind::Fixed {
            name,
            size,
            aliases,
        } => {
            let fullname = name.fullname();
            if seen.contains(&fullname) {
                return json!(fullname);
            }
            seen.push(fullname.clone());
            let mut map = Map::new();
            map.insert("type".into(), json!("fixed"));
            map.insert("name".into(), json!(fullname));
            map.insert("size".into(), json!(size));
            if let Some(aliases) = aliases {
                map.insert("aliases".into(), json!(aliases));
            }
            JsonValue::Object(map)
        }
        NodeKind::Enum {
            name,
            aliases,
            symbols,
            doc,
        } => {
            let fullname = name.fullname();
            if seen.contains(&fullname) {
                return json!(fullname);
            }
            seen.push(fullname.clone());
            let mut map = Map::new();
            map.insert("type".into(), json!("enum"));
            map.insert("name".into(), json!(fullname));
            map.insert("symbols".into(), json!(symbols));
            if let Some(aliases) = aliases {
                map.insert("aliases".into(), json!(aliases));
            }
            if let Some(doc) = doc {
                map.insert("doc".into(), json!(doc));
            }
            JsonValue::Object(map)
        }
        NodeKind::Record {
            name,
            aliases,
            fields,
            doc,
            is_error,
        } => {
            let fullname = name.fullname();
            if seen.contains(&fullname) {
                return json!(fullname);
            }
            seen.push(fullname.clone());
            let mut map = Map::new();
            map.insert(
                "type".into(),
                json!(if *is_error { "error" } else { "record" }),
            );
            map.insert("name".into(), json!(fullname));
            let fields_json: Vec<JsonValue> = fields
                .values()
                .map(|field| {
                    let mut fmap = Map::new();
                    fmap.insert("name".into(), json!(field.name));
                    fmap.insert("type".into(), to_json(&field.ty, seen));
                    if let Some(default) = &field.default {
                        fmap.insert("default".into(), value_to_json(default));
                    }
                    if let Some(aliases) = &field.aliases {
                        fmap.insert("aliases".into(), json!(aliases));
                    }
                    if let Some(doc) = &field.doc {
                        fmap.insert("doc".into(), json!(doc));
                    }
                    for (k, v) in &field.properties {
                        fmap.insert(k.clone(), v.clone());
                    }
                    JsonValue::Object(fmap)
                })
                .collect();
            map.insert("fields".into(), JsonValue::Array(fields_json));
            if let Some(aliases) = aliases {
                map.insert("aliases".into(), json!(aliases));
            }
            if let Some(doc) = doc {
                map.insert("doc".into(), json!(doc));
            }
            JsonValue::Object(map)
        }
        NodeKind::Array { items } => {
            let mut map = Map::new();
            map.insert("type".into(), json!("array"));
            map.insert("items".into(), to_json(items, seen));
            JsonValue::Object(map)
        }
        NodeKind::Map { values } => {
            let mut map = Map::new();
            map.insert("type".into(), json!("map"));
            map.insert("values".into(), to_json(values, seen));
            JsonValue::Object(map)
        }
        NodeKind::Union { variants } => {
            JsonValue::Array(variants.iter().map(|v| to_json(v, seen)).collect())
        }
        NodeKind::ErrorUnion { variants } => JsonValue::Array(
            variants[1..].iter().map(|v| to_json(v, seen)).collect(),
        ),
    }
}

fn value_to_json(value: &crate::value::Value) -> JsonValue {
    use crate::value::Value;
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Long(l) => json!(l),
        Value::Float(f) => json!(f),
        Value::Double(d) => json!(d),
        Value::Str(s) | Value::Enum(s) => json!(s),
        Value::Bytes(b) | Value::Fixed(b) => {
            json!(b.iter().map(|&byte| byte as char).collect::<String>())
        }
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), value_to_json(v));
            }
            JsonValue::Object(out)
        }
        Value::Record(rec) => {
            let mut out = Map::new();
            for (k, field_value) in &rec.fields {
                out.insert(k.clone(), value_to_json(&field_value.value));
            }
            JsonValue::Object(out)
        }
        Value::Union(inner) => value_to_json(inner),
        Value::Byte(b) => json!(b),
    }
}
