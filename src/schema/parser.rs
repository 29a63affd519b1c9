use super::common::{validate_name, Field, Name, Order};
use super::{NodeKind, SchemaNode};
use crate::error::AvroError;
use crate::error::AvroResult;
use crate::value::FieldValue;
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::borrow::ToOwned;
use std::collections::HashMap;

/// A `{ fullname -> schema }` lookup table used while parsing to resolve
/// named references, including self- and mutually-recursive ones. Entries
/// are inserted as soon as a named type's `name` is known (before its body
/// is fully parsed) so that a reference to it from within its own
/// definition resolves.
#[derive(Debug, Clone)]
pub(crate) struct Registry {
    cxt: HashMap<String, SchemaNode>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            cxt: HashMap::new(),
        }
    }

    pub(crate) fn get<'a>(&'a self, name: &str) -> Option<&'a SchemaNode> {
        self.cxt.get(name)
    }

    pub(crate) fn parse_schema(
        &mut self,
        value: &JsonValue,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<SchemaNode> {
        match value {
            JsonValue::Object(ref schema) => self.parse_object(schema, enclosing_namespace),
            JsonValue::String(ref schema) => self.parse_primitive(schema, enclosing_namespace),
            JsonValue::Array(ref schema) => self.parse_union(schema, enclosing_namespace),
            _ => Err(AvroError::UnknownSchema),
        }
    }

    fn parse_union(
        &mut self,
        schema: &[JsonValue],
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<SchemaNode> {
        let mut variants = vec![];
        let mut seen_tags: Vec<String> = vec![];

        for s in schema {
            let parsed = self.parse_schema(s, enclosing_namespace)?;
            if let NodeKind::Union { .. } = parsed.kind {
                return Err(AvroError::NoImmediateUnion);
            }

            let tag = branch_tag(&parsed, self);
            if seen_tags.contains(&tag) {
                return Err(AvroError::DuplicateSchemaInUnion);
            }
            seen_tags.push(tag);
            variants.push(parsed);
        }

        Ok(SchemaNode::plain(NodeKind::Union { variants }))
    }

    fn get_fullname(&self, name: &str, enclosing_namespace: Option<&str>) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        if let Some(namespace) = enclosing_namespace {
            format!("{}.{}", namespace, name)
        } else {
            name.to_string()
        }
    }

    fn parse_primitive(
        &mut self,
        schema: &str,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<SchemaNode> {
        match schema {
            "null" => Ok(SchemaNode::plain(NodeKind::Null)),
            "boolean" => Ok(SchemaNode::plain(NodeKind::Boolean)),
            "int" => Ok(SchemaNode::plain(NodeKind::Int)),
            "long" => Ok(SchemaNode::plain(NodeKind::Long)),
            "double" => Ok(SchemaNode::plain(NodeKind::Double)),
            "float" => Ok(SchemaNode::plain(NodeKind::Float)),
            "bytes" => Ok(SchemaNode::plain(NodeKind::Bytes)),
            "string" => Ok(SchemaNode::plain(NodeKind::Str)),
            other if !other.is_empty() => {
                let name = self.get_fullname(other, enclosing_namespace);
                if self.cxt.contains_key(&name) {
                    Ok(SchemaNode::plain(NodeKind::Named(name)))
                } else if self.cxt.contains_key(other) {
                    Ok(SchemaNode::plain(NodeKind::Named(other.to_string())))
                } else {
                    Err(AvroError::NamedSchemaNotFound(other.to_string()))
                }
            }
            _ => Err(AvroError::InvalidPrimitiveSchema),
        }
    }

    fn parse_record_fields(
        &mut self,
        fields: &[serde_json::Value],
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<IndexMap<String, Field>> {
        let mut fields_parsed = IndexMap::with_capacity(fields.len());
        for field_obj in fields {
            match field_obj {
                JsonValue::Object(o) => {
                    let name = o
                        .get("name")
                        .and_then(|a| a.as_str())
                        .ok_or(AvroError::RecordNameNotFound)?;

                    let ty: &JsonValue = o.get("type").ok_or(AvroError::RecordTypeNotFound)?;
                    let mut ty = self.parse_schema(ty, enclosing_namespace)?;

                    if let Some(named) = ty.get_named_mut() {
                        if named.namespace().is_none() {
                            if let Some(namespace) = enclosing_namespace {
                                named.set_namespace(namespace)?;
                            }
                        }
                    }

                    let default = if let Some(v) = o.get("default") {
                        Some(parse_default(v, &ty)?)
                    } else {
                        None
                    };

                    let order = if let Some(order) = o.get("order") {
                        parse_field_order(order)?
                    } else {
                        Order::Ascending
                    };

                    let aliases = parse_aliases(o.get("aliases"));
                    let doc = parse_doc(o.get("doc"));
                    let properties = parse_field_properties(o);

                    if fields_parsed.contains_key(name) {
                        return Err(AvroError::DuplicateField(name.to_string()));
                    }

                    fields_parsed.insert(
                        name.to_string(),
                        Field::new(name, ty, default, order, aliases, doc, properties)?,
                    );
                }
                _ => return Err(AvroError::InvalidRecordFieldType),
            }
        }

        Ok(fields_parsed)
    }

    fn parse_record_like(
        &mut self,
        value: &Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
        is_error: bool,
    ) -> AvroResult<SchemaNode> {
        let rec_name = Name::from_json(value, enclosing_namespace)?;

        // Insert a placeholder so self- and mutually-recursive references
        // resolve while this record's own fields are being parsed.
        self.cxt.insert(
            rec_name.fullname(),
            SchemaNode::plain(NodeKind::Named(rec_name.fullname())),
        );

        let fields = if let Some(JsonValue::Array(ref fields_vec)) = value.get("fields") {
            fields_vec
        } else {
            return Err(AvroError::ExpectedFieldsJsonArray);
        };

        let field_namespace = if rec_name.namespace().is_some() {
            rec_name.namespace()
        } else {
            enclosing_namespace
        };

        let fields = self.parse_record_fields(fields, field_namespace)?;
        let aliases = parse_aliases(value.get("aliases"));
        let doc = parse_doc(value.get("doc"));

        let rec = SchemaNode::plain(NodeKind::Record {
            name: rec_name.clone(),
            aliases,
            fields,
            doc,
            is_error,
        });

        let rec_name_str = rec_name.fullname();
        match self.cxt.get(&rec_name_str) {
            Some(SchemaNode {
                kind: NodeKind::Named(_),
                ..
            }) => {
                self.cxt.insert(rec_name_str, rec.clone());
            }
            _ => return Err(AvroError::DuplicateSchema(rec_name_str)),
        }

        Ok(rec)
    }

    fn parse_object(
        &mut self,
        value: &Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
    ) -> AvroResult<SchemaNode> {
        let logical_type = value
            .get("logicalType")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        let node = match value.get("type") {
            Some(&JsonValue::String(ref s)) if s == "record" => {
                self.parse_record_like(value, enclosing_namespace, false)
            }
            Some(&JsonValue::String(ref s)) if s == "error" => {
                self.parse_record_like(value, enclosing_namespace, true)
            }
            Some(&JsonValue::String(ref s)) if s == "request" => Err(AvroError::RequestUnsupported),
            Some(&JsonValue::String(ref s)) if s == "error_union" => {
                let declarations = value
                    .get("declarations")
                    .and_then(JsonValue::as_array)
                    .ok_or_else(|| {
                        AvroError::InvalidSchema("error_union missing `declarations`".into())
                    })?;

                let mut variants = vec![SchemaNode::plain(NodeKind::Str)];
                let mut seen_tags: Vec<String> = vec!["string".to_string()];
                for d in declarations {
                    let parsed = self.parse_schema(d, enclosing_namespace)?;
                    if let NodeKind::Union { .. } | NodeKind::ErrorUnion { .. } = parsed.kind {
                        return Err(AvroError::NoImmediateUnion);
                    }
                    let tag = branch_tag(&parsed, self);
                    if seen_tags.contains(&tag) {
                        return Err(AvroError::DuplicateSchemaInUnion);
                    }
                    seen_tags.push(tag);
                    variants.push(parsed);
                }
                Ok(SchemaNode::plain(NodeKind::ErrorUnion { variants }))
            }
            Some(&JsonValue::String(ref s)) if s == "enum" => {
                let name = Name::from_json(value, enclosing_namespace)?;
                let aliases = parse_aliases(value.get("aliases"));
                let doc = parse_doc(value.get("doc"));
                let mut symbols = vec![];

                match value.get("symbols") {
                    Some(JsonValue::Array(sym)) => {
                        for v in sym {
                            let symbol = v.as_str().ok_or(AvroError::EnumSymbolParseErr)?;
                            validate_name(0, symbol)?;
                            if symbols.contains(&symbol.to_string()) {
                                return Err(AvroError::EnumParseErr(format!(
                                    "duplicate symbol `{}`",
                                    symbol
                                )));
                            }
                            symbols.push(symbol.to_string());
                        }
                    }
                    Some(other) => return Err(AvroError::EnumParseErr(format!("{:?}", other))),
                    None => return Err(AvroError::EnumSymbolsMissing),
                }

                let name_str = name.fullname();
                let enum_schema = SchemaNode::plain(NodeKind::Enum {
                    name,
                    aliases,
                    symbols,
                    doc,
                });

                self.cxt.insert(name_str, enum_schema.clone());
                Ok(enum_schema)
            }
            Some(&JsonValue::String(ref s)) if s == "array" => {
                let items_schema = value
                    .get("items")
                    .ok_or(AvroError::InvalidSchema("array missing `items`".into()))?;
                let parsed_items = self.parse_schema(items_schema, enclosing_namespace)?;
                Ok(SchemaNode::plain(NodeKind::Array {
                    items: Box::new(parsed_items),
                }))
            }
            Some(&JsonValue::String(ref s)) if s == "map" => {
                let values_schema = value
                    .get("values")
                    .ok_or(AvroError::InvalidSchema("map missing `values`".into()))?;
                let parsed_values = self.parse_schema(values_schema, enclosing_namespace)?;
                Ok(SchemaNode::plain(NodeKind::Map {
                    values: Box::new(parsed_values),
                }))
            }
            Some(&JsonValue::String(ref s)) if s == "fixed" => {
                let name = Name::from_json(value, enclosing_namespace)?;
                let aliases = parse_aliases(value.get("aliases"));
                let size = value.get("size").ok_or(AvroError::FixedSizeNotFound)?;
                let name_str = name.fullname();

                let fixed_schema = SchemaNode::plain(NodeKind::Fixed {
                    name,
                    size: size.as_u64().ok_or(AvroError::FixedSizeNotNumber)? as usize,
                    aliases,
                });

                self.cxt.insert(name_str, fixed_schema.clone());
                Ok(fixed_schema)
            }
            Some(JsonValue::String(ref s)) if s == "null" => Ok(SchemaNode::plain(NodeKind::Null)),
            Some(JsonValue::String(ref s)) if s == "boolean" => {
                Ok(SchemaNode::plain(NodeKind::Boolean))
            }
            Some(JsonValue::String(ref s)) if s == "int" => Ok(SchemaNode::plain(NodeKind::Int)),
            Some(JsonValue::String(ref s)) if s == "long" => Ok(SchemaNode::plain(NodeKind::Long)),
            Some(JsonValue::String(ref s)) if s == "float" => {
                Ok(SchemaNode::plain(NodeKind::Float))
            }
            Some(JsonValue::String(ref s)) if s == "double" => {
                Ok(SchemaNode::plain(NodeKind::Double))
            }
            Some(JsonValue::String(ref s)) if s == "bytes" => {
                Ok(SchemaNode::plain(NodeKind::Bytes))
            }
            Some(JsonValue::String(ref s)) if s == "string" => Ok(SchemaNode::plain(NodeKind::Str)),
            _ => Err(AvroError::SchemaParseFailed),
        }?;

        Ok(SchemaNode {
            kind: node.kind,
            logical_type: logical_type.or(node.logical_type),
            properties: parse_properties(value),
        })
    }
}

/// Reserved JSON keys that never appear in a node's [`SchemaNode::properties`]
/// because they are each parsed into a dedicated attribute elsewhere.
const RESERVED_PROPERTIES: &[&str] = &[
    "type",
    "name",
    "namespace",
    "aliases",
    "fields",
    "items",
    "size",
    "symbols",
    "values",
    "doc",
    "logicalType",
    "declarations",
];

/// Collects every key of a schema object not in [`RESERVED_PROPERTIES`] into
/// an ordered map, preserving source order.
fn parse_properties(value: &Map<String, JsonValue>) -> IndexMap<String, JsonValue> {
    value
        .iter()
        .filter(|(k, _)| !RESERVED_PROPERTIES.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Returns the key by which two union branches are compared for the "no
/// duplicate branch type" rule: the fullname for named types, the bare type
/// tag otherwise.
fn branch_tag(node: &SchemaNode, registry: &Registry) -> String {
    let _ = registry;
    match &node.kind {
        NodeKind::Null => "null".into(),
        NodeKind::Boolean => "boolean".into(),
        NodeKind::Int => "int".into(),
        NodeKind::Long => "long".into(),
        NodeKind::Float => "float".into(),
        NodeKind::Double => "double".into(),
        NodeKind::Bytes => "bytes".into(),
        NodeKind::Str => "string".into(),
        NodeKind::Array { .. } => "array".into(),
        NodeKind::Map { .. } => "map".into(),
        NodeKind::Record { name, .. }
        | NodeKind::Enum { name, .. }
        | NodeKind::Fixed { name, .. } => name.fullname(),
        NodeKind::Named(name) => name.clone(),
        NodeKind::Union { .. } | NodeKind::ErrorUnion { .. } => "union".into(),
    }
}

fn parse_doc(value: Option<&JsonValue>) -> Option<String> {
    if let Some(JsonValue::String(s)) = value {
        Some(s.to_string())
    } else {
        None
    }
}

pub(crate) fn parse_field_order(order: &JsonValue) -> AvroResult<Order> {
    match *order {
        JsonValue::String(ref s) => match &**s {
            "ascending" => Ok(Order::Ascending),
            "descending" => Ok(Order::Descending),
            "ignore" => Ok(Order::Ignore),
            _ => Err(AvroError::UnknownFieldOrdering),
        },
        _ => Err(AvroError::InvalidFieldOrdering),
    }
}

fn parse_aliases(aliases: Option<&JsonValue>) -> Option<Vec<String>> {
    match aliases {
        Some(JsonValue::Array(ref aliases)) => {
            let mut alias_parsed = Vec::with_capacity(aliases.len());
            for a in aliases {
                let a = a.as_str().map(ToOwned::to_owned)?;
                alias_parsed.push(a);
            }
            Some(alias_parsed)
        }
        _ => None,
    }
}

/// Reserved JSON keys on a record field declaration, per [`RESERVED_PROPERTIES`]
/// but scoped to field attributes rather than schema node attributes.
const RESERVED_FIELD_PROPERTIES: &[&str] = &["name", "type", "default", "order", "doc", "aliases"];

fn parse_field_properties(field: &Map<String, JsonValue>) -> IndexMap<String, JsonValue> {
    field
        .iter()
        .filter(|(k, _)| !RESERVED_FIELD_PROPERTIES.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

pub(crate) fn parse_default(default_value: &JsonValue, schema: &SchemaNode) -> AvroResult<Value> {
    match (default_value, &schema.kind) {
        (d, NodeKind::Union { variants }) => {
            let first_variant = variants.first().ok_or(AvroError::FailedDefaultUnion)?;
            parse_default(d, first_variant)
        }
        (JsonValue::Null, NodeKind::Null) => Ok(Value::Null),
        (JsonValue::Bool(v), NodeKind::Boolean) => Ok(Value::Boolean(*v)),
        (JsonValue::Number(n), NodeKind::Int) => Ok(Value::Int(
            n.as_i64().ok_or(AvroError::DefaultValueParse)? as i32,
        )),
        (JsonValue::Number(n), NodeKind::Long) => {
            Ok(Value::Long(n.as_i64().ok_or(AvroError::DefaultValueParse)?))
        }
        (JsonValue::Number(n), NodeKind::Float) => Ok(Value::Float(
            n.as_f64().ok_or(AvroError::DefaultValueParse)? as f32,
        )),
        (JsonValue::Number(n), NodeKind::Double) => {
            Ok(Value::Double(n.as_f64().ok_or(AvroError::DefaultValueParse)?))
        }
        (JsonValue::String(n), NodeKind::Bytes) => Ok(Value::Bytes(latin1_bytes(n)?)),
        (JsonValue::String(n), NodeKind::Str) => Ok(Value::Str(n.clone())),
        (JsonValue::Object(v), NodeKind::Record { name, fields, .. }) => {
            let mut values = IndexMap::with_capacity(v.len());

            for (k, field) in fields {
                let raw = v.get(k).or_else(|| None);
                let parsed_value = match raw {
                    Some(raw) => parse_default(raw, &field.ty)?,
                    None => field
                        .default
                        .clone()
                        .ok_or(AvroError::DefaultValueParse)?,
                };
                values.insert(k.to_string(), FieldValue::new(parsed_value));
            }

            Ok(Value::Record(crate::value::Record {
                fields: values,
                name: name.fullname(),
            }))
        }
        (JsonValue::String(n), NodeKind::Enum { symbols, .. }) => {
            if symbols.contains(n) {
                Ok(Value::Enum(n.clone()))
            } else {
                Err(AvroError::UnknownEnumSymbol(n.clone()))
            }
        }
        (JsonValue::Array(arr), NodeKind::Array { items }) => {
            let mut default_arr_items: Vec<Value> = Vec::with_capacity(arr.len());
            for v in arr {
                default_arr_items.push(parse_default(v, items)?);
            }
            Ok(Value::Array(default_arr_items))
        }
        (JsonValue::Object(map), NodeKind::Map { values: values_schema }) => {
            let mut values = std::collections::HashMap::with_capacity(map.len());
            for (k, v) in map {
                values.insert(k.to_string(), parse_default(v, values_schema)?);
            }
            Ok(Value::Map(values))
        }
        (JsonValue::String(n), NodeKind::Fixed { .. }) => Ok(Value::Fixed(latin1_bytes(n)?)),
        (_d, _s) => Err(AvroError::DefaultValueParse),
    }
}

/// Decodes a JSON default string as one byte per character (Latin-1), the
/// encoding the Avro spec uses to represent `bytes`/`fixed` defaults as JSON
/// strings - not the character's UTF-8 encoding, which would be wider than
/// one byte for any character above U+007F.
fn latin1_bytes(s: &str) -> AvroResult<Vec<u8>> {
    s.chars()
        .map(|c| {
            if c as u32 <= 0xFF {
                Ok(c as u8)
            } else {
                Err(AvroError::DefaultValueParse)
            }
        })
        .collect()
}
