//! Decodes avro binary data into [`Value`]s, optionally resolving a
//! writer schema against a different reader schema as it goes.

use crate::codec::{fullname_matches, resolve_named};
use crate::config::DecodeOptions;
use crate::cursor::{decode_from_slice, Cursor};
use crate::error::{AvroError, AvroResult};
use crate::schema::{NodeKind, Registry, Schema, SchemaNode};
use crate::serde_avro::SerdeReader;
use crate::value::{FieldValue, Record, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Decodes avro binary data written under one schema, optionally read back
/// with a different (but resolvable) reader schema.
///
/// Without a reader schema, data is decoded plainly against the writer
/// schema. With one, [schema resolution](https://avro.apache.org/docs/current/spec.html#Schema+Resolution)
/// applies: field projection and default synthesis for records, primitive
/// promotion, enum symbol translation and union branch dispatch.
pub struct DatumReader<'s> {
    writer: &'s Schema,
    reader: Option<&'s Schema>,
}

impl<'s> DatumReader<'s> {
    /// Creates a reader that decodes data plainly against `writer`.
    pub fn new(writer: &'s Schema) -> Self {
        DatumReader {
            writer,
            reader: None,
        }
    }

    /// Creates a reader that decodes data written under `writer`, resolving
    /// it against `reader`.
    pub fn with_reader_schema(writer: &'s Schema, reader: &'s Schema) -> Self {
        DatumReader {
            writer,
            reader: Some(reader),
        }
    }

    /// Decodes a single value out of `bytes`.
    pub fn read(&self, bytes: &[u8]) -> AvroResult<Value> {
        self.read_with(bytes, &DecodeOptions::default())
    }

    /// Decodes a single value out of `bytes`, consulting `options` for any
    /// logical-type hooks along the way.
    pub fn read_with(&self, bytes: &[u8], options: &DecodeOptions) -> AvroResult<Value> {
        let w_cxt = &self.writer.cxt;
        decode_from_slice(bytes, |cursor| match self.reader {
            Some(reader_schema) => read_resolved(
                cursor,
                reader_schema.node(),
                self.writer.node(),
                &reader_schema.cxt,
                w_cxt,
                options,
            ),
            None => read_data(cursor, self.writer.node(), w_cxt, options),
        })
    }
}

/// Plainly decodes a value per `node`, with no schema resolution.
pub(crate) fn read_data(
    cursor: &mut Cursor<'_>,
    node: &SchemaNode,
    cxt: &Registry,
    options: &DecodeOptions,
) -> AvroResult<Value> {
    let value = read_kind(cursor, &node.kind, cxt, options)?;
    if let Some(logical_type) = &node.logical_type {
        if let Some(handler) = options.logical_types.get(logical_type) {
            if handler.validate_before_from_value(&value) {
                return handler.from_value(&value);
            }
        }
    }
    Ok(value)
}

fn read_kind(
    cursor: &mut Cursor<'_>,
    kind: &NodeKind,
    cxt: &Registry,
    options: &DecodeOptions,
) -> AvroResult<Value> {
    let value = match kind {
        NodeKind::Null => Value::Null,
        NodeKind::Boolean => Value::Boolean(cursor.read_boolean()?),
        NodeKind::Int => Value::Int(cursor.read_int()?),
        NodeKind::Long => Value::Long(cursor.read_long()?),
        NodeKind::Float => Value::Float(cursor.read_float()?),
        NodeKind::Double => Value::Double(cursor.read_double()?),
        NodeKind::Bytes => Value::Bytes(cursor.read_bytes()?),
        NodeKind::Str => Value::Str(cursor.read_string()?),
        NodeKind::Fixed { size, .. } => Value::Fixed(cursor.read_fixed(*size)?),
        NodeKind::Record { name, fields, .. } => {
            let mut values = IndexMap::with_capacity(fields.len());
            for (fname, field) in fields {
                let v = read_data(cursor, &field.ty, cxt, options)?;
                values.insert(fname.clone(), FieldValue::new(v));
            }
            Value::Record(Record {
                name: name.fullname(),
                fields: values,
            })
        }
        NodeKind::Enum { symbols, .. } => {
            let idx = cursor.read_int()? as usize;
            let symbol = symbols
                .get(idx)
                .ok_or_else(|| AvroError::UnknownEnumSymbol(format!("index {}", idx)))?;
            Value::Enum(symbol.clone())
        }
        NodeKind::Map { values: value_schema } => {
            let mut hm = HashMap::new();
            for (k, v) in read_blocks(cursor, |c| {
                let k = c.read_string()?;
                let v = read_data(c, value_schema, cxt, options)?;
                Ok((k, v))
            })? {
                hm.insert(k, v);
            }
            Value::Map(hm)
        }
        NodeKind::Array { items } => {
            let items = read_blocks(cursor, |c| read_data(c, items, cxt, options))?;
            Value::Array(items)
        }
        NodeKind::Union { variants } | NodeKind::ErrorUnion { variants } => {
            let idx = cursor.read_long()?;
            let variant = variants
                .get(idx as usize)
                .ok_or(AvroError::NotFoundInUnion)?;
            Value::Union(Box::new(read_data(cursor, variant, cxt, options)?))
        }
        NodeKind::Named(name) => {
            let resolved = cxt
                .get(name)
                .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
            return read_data(cursor, resolved, cxt, options);
        }
    };
    Ok(value)
}

/// Skips the bytes of a value of schema `node` without materializing it -
/// used when a writer's record field has no counterpart in the reader.
pub(crate) fn skip_data(cursor: &mut Cursor<'_>, node: &SchemaNode, cxt: &Registry) -> AvroResult<()> {
    match &node.kind {
        NodeKind::Null => Ok(()),
        NodeKind::Boolean => cursor.read_boolean().map(drop),
        NodeKind::Int | NodeKind::Long => cursor.read_long().map(drop),
        NodeKind::Float => cursor.read_float().map(drop),
        NodeKind::Double => cursor.read_double().map(drop),
        NodeKind::Bytes | NodeKind::Str => cursor.read_bytes().map(drop),
        NodeKind::Fixed { size, .. } => cursor.skip_raw(*size),
        NodeKind::Record { fields, .. } => {
            for field in fields.values() {
                skip_data(cursor, &field.ty, cxt)?;
            }
            Ok(())
        }
        NodeKind::Enum { .. } => cursor.read_int().map(drop),
        NodeKind::Map { values } => skip_blocks(cursor, |c| {
            c.read_string()?;
            skip_data(c, values, cxt)
        }),
        NodeKind::Array { items } => skip_blocks(cursor, |c| skip_data(c, items, cxt)),
        NodeKind::Union { variants } | NodeKind::ErrorUnion { variants } => {
            let idx = cursor.read_long()?;
            let variant = variants
                .get(idx as usize)
                .ok_or(AvroError::NotFoundInUnion)?;
            skip_data(cursor, variant, cxt)
        }
        NodeKind::Named(name) => {
            let resolved = cxt
                .get(name)
                .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
            skip_data(cursor, resolved, cxt)
        }
    }
}

/// Reads successive blocks of items, honoring the negative-count/byte-size
/// variant a writer may use to let a reader skip a block wholesale.
fn read_blocks<T>(
    cursor: &mut Cursor<'_>,
    mut read_item: impl FnMut(&mut Cursor<'_>) -> AvroResult<T>,
) -> AvroResult<Vec<T>> {
    let mut items = Vec::new();
    loop {
        let count = cursor.read_long()?;
        if count == 0 {
            break;
        }
        let count = if count < 0 {
            cursor.read_long()?; // byte size of the block, unused when reading items directly
            -count
        } else {
            count
        };
        for _ in 0..count {
            items.push(read_item(cursor)?);
        }
    }
    Ok(items)
}

fn skip_blocks(
    cursor: &mut Cursor<'_>,
    mut skip_item: impl FnMut(&mut Cursor<'_>) -> AvroResult<()>,
) -> AvroResult<()> {
    loop {
        let count = cursor.read_long()?;
        if count == 0 {
            break;
        }
        if count < 0 {
            let byte_size = cursor.read_long()?;
            cursor.skip_raw(byte_size as usize)?;
        } else {
            for _ in 0..count {
                skip_item(cursor)?;
            }
        }
    }
    Ok(())
}

/// Decodes a value written under `writer`, resolving it against `reader`.
pub(crate) fn read_resolved(
    cursor: &mut Cursor<'_>,
    reader: &SchemaNode,
    writer: &SchemaNode,
    r_cxt: &Registry,
    w_cxt: &Registry,
    options: &DecodeOptions,
) -> AvroResult<Value> {
    if let NodeKind::Named(name) = &writer.kind {
        let resolved = w_cxt
            .get(name)
            .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
        return read_resolved(cursor, reader, resolved, r_cxt, w_cxt, options);
    }
    if let NodeKind::Named(name) = &reader.kind {
        let resolved = r_cxt
            .get(name)
            .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
        return read_resolved(cursor, resolved, writer, r_cxt, w_cxt, options);
    }

    if let NodeKind::Union { variants: w_variants } | NodeKind::ErrorUnion { variants: w_variants } =
        &writer.kind
    {
        let idx = cursor.read_long()?;
        let w_variant = w_variants
            .get(idx as usize)
            .ok_or(AvroError::NotFoundInUnion)?;
        return read_resolved(cursor, reader, w_variant, r_cxt, w_cxt, options);
    }

    if let NodeKind::Union { variants: r_variants } | NodeKind::ErrorUnion { variants: r_variants } =
        &reader.kind
    {
        for r_variant in r_variants {
            if matches_schemas(writer, r_variant, w_cxt, r_cxt) {
                let value = read_resolved(cursor, r_variant, writer, r_cxt, w_cxt, options)?;
                return Ok(Value::Union(Box::new(value)));
            }
        }
        return Err(AvroError::ResolutionUnionMismatch);
    }

    let value = match (&writer.kind, &reader.kind) {
        (NodeKind::Null, NodeKind::Null) => Value::Null,
        (NodeKind::Boolean, NodeKind::Boolean) => Value::Boolean(cursor.read_boolean()?),
        (NodeKind::Int, NodeKind::Int) => Value::Int(cursor.read_int()?),
        (NodeKind::Int, NodeKind::Long) => Value::Long(i64::from(cursor.read_int()?)),
        (NodeKind::Int, NodeKind::Float) => Value::Float(cursor.read_int()? as f32),
        (NodeKind::Int, NodeKind::Double) => Value::Double(f64::from(cursor.read_int()?)),
        (NodeKind::Long, NodeKind::Long) => Value::Long(cursor.read_long()?),
        (NodeKind::Long, NodeKind::Float) => Value::Float(cursor.read_long()? as f32),
        (NodeKind::Long, NodeKind::Double) => Value::Double(cursor.read_long()? as f64),
        (NodeKind::Float, NodeKind::Float) => Value::Float(cursor.read_float()?),
        (NodeKind::Float, NodeKind::Double) => Value::Double(f64::from(cursor.read_float()?)),
        (NodeKind::Double, NodeKind::Double) => Value::Double(cursor.read_double()?),
        (NodeKind::Bytes, NodeKind::Bytes) => Value::Bytes(cursor.read_bytes()?),
        (NodeKind::Bytes, NodeKind::Str) => {
            let bytes = cursor.read_bytes()?;
            Value::Str(String::from_utf8(bytes).map_err(|_| AvroError::ExpectedString)?)
        }
        (NodeKind::Str, NodeKind::Str) => Value::Str(cursor.read_string()?),
        (NodeKind::Str, NodeKind::Bytes) => Value::Bytes(cursor.read_bytes()?),
        (
            NodeKind::Fixed { name: wn, size: ws, .. },
            NodeKind::Fixed {
                name: rn,
                size: rs,
                aliases,
            },
        ) => {
            if ws != rs || !fullname_matches(&wn.fullname(), &rn.fullname(), aliases) {
                return Err(AvroError::ResolutionFixedMismatch(format!(
                    "writer `{}`({} bytes) vs reader `{}`({} bytes)",
                    wn.fullname(),
                    ws,
                    rn.fullname(),
                    rs
                )));
            }
            Value::Fixed(cursor.read_fixed(*rs)?)
        }
        (
            NodeKind::Enum {
                name: wn,
                symbols: w_symbols,
                ..
            },
            NodeKind::Enum {
                name: rn,
                symbols: r_symbols,
                aliases,
                ..
            },
        ) => {
            if !fullname_matches(&wn.fullname(), &rn.fullname(), aliases) {
                return Err(AvroError::SchemaResolutionFailed {
                    writer: wn.fullname(),
                    reader: rn.fullname(),
                });
            }
            let idx = cursor.read_int()? as usize;
            let symbol = w_symbols
                .get(idx)
                .ok_or_else(|| AvroError::UnknownEnumSymbol(format!("index {}", idx)))?;
            if r_symbols.contains(symbol) {
                Value::Enum(symbol.clone())
            } else {
                return Err(AvroError::ResolutionEnumSymbolMissing(symbol.clone()));
            }
        }
        (NodeKind::Array { items: w_items }, NodeKind::Array { items: r_items }) => {
            if !matches_schemas(w_items, r_items, w_cxt, r_cxt) {
                return Err(AvroError::ResolutionItemMismatch);
            }
            Value::Array(read_blocks(cursor, |c| {
                read_data(c, r_items, r_cxt, options)
            })?)
        }
        (NodeKind::Map { values: w_values }, NodeKind::Map { values: r_values }) => {
            if !matches_schemas(w_values, r_values, w_cxt, r_cxt) {
                return Err(AvroError::ResolutionItemMismatch);
            }
            let mut hm = HashMap::new();
            for (k, v) in read_blocks(cursor, |c| {
                let k = c.read_string()?;
                let v = read_data(c, r_values, r_cxt, options)?;
                Ok((k, v))
            })? {
                hm.insert(k, v);
            }
            Value::Map(hm)
        }
        (
            NodeKind::Record {
                name: wn,
                fields: w_fields,
                ..
            },
            NodeKind::Record {
                name: rn,
                fields: r_fields,
                aliases: r_aliases,
                ..
            },
        ) => {
            if !fullname_matches(&wn.fullname(), &rn.fullname(), r_aliases) {
                return Err(AvroError::SchemaResolutionFailed {
                    writer: wn.fullname(),
                    reader: rn.fullname(),
                });
            }

            let mut decoded: IndexMap<String, FieldValue> = IndexMap::with_capacity(r_fields.len());
            for (w_fname, w_field) in w_fields {
                match r_fields.iter().find(|(_, rf)| rf.matches_writer_name(w_fname)) {
                    Some((r_fname, r_field)) => {
                        let v = read_resolved(cursor, &r_field.ty, &w_field.ty, r_cxt, w_cxt, options)?;
                        decoded.insert(r_fname.clone(), FieldValue::new(v));
                    }
                    None => skip_data(cursor, &w_field.ty, w_cxt)?,
                }
            }

            let mut ordered = IndexMap::with_capacity(r_fields.len());
            for (r_fname, r_field) in r_fields {
                if let Some(v) = decoded.remove(r_fname) {
                    ordered.insert(r_fname.clone(), v);
                } else if let Some(default) = &r_field.default {
                    ordered.insert(r_fname.clone(), FieldValue::new(default.clone()));
                } else {
                    return Err(AvroError::ResolutionFieldMissing(r_fname.clone()));
                }
            }

            Value::Record(Record {
                name: rn.fullname(),
                fields: ordered,
            })
        }
        (w, r) => {
            return Err(AvroError::SchemaResolutionFailed {
                writer: format!("{:?}", w),
                reader: format!("{:?}", r),
            })
        }
    };

    if let Some(logical_type) = &reader.logical_type {
        if let Some(handler) = options.logical_types.get(logical_type) {
            if handler.validate_before_from_value(&value) {
                return handler.from_value(&value);
            }
        }
    }
    Ok(value)
}

/// Whether a value written per `writer` can be read back per `reader`:
/// same structural kind, and for named types, the same fullname (or one of
/// the reader's declared aliases). Array and map item schemas are compared
/// by this same structural check rather than recursively resolved, so an
/// item schema that would merely promote (e.g. writer item `int`, reader
/// item `long`) is not considered a match - see DESIGN.md.
pub(crate) fn matches_schemas(
    writer: &SchemaNode,
    reader: &SchemaNode,
    w_cxt: &Registry,
    r_cxt: &Registry,
) -> bool {
    let writer = match resolve_named(writer, w_cxt) {
        Ok(w) => w,
        Err(_) => return false,
    };
    let reader = match resolve_named(reader, r_cxt) {
        Ok(r) => r,
        Err(_) => return false,
    };

    match (&writer.kind, &reader.kind) {
        (NodeKind::Record { name: wn, .. }, NodeKind::Record { name: rn, aliases, .. }) => {
            fullname_matches(&wn.fullname(), &rn.fullname(), aliases)
        }
        (NodeKind::Enum { name: wn, .. }, NodeKind::Enum { name: rn, aliases, .. }) => {
            fullname_matches(&wn.fullname(), &rn.fullname(), aliases)
        }
        (NodeKind::Fixed { name: wn, size: ws, .. }, NodeKind::Fixed { name: rn, size: rs, aliases }) => {
            ws == rs && fullname_matches(&wn.fullname(), &rn.fullname(), aliases)
        }
        (NodeKind::Array { items: wi }, NodeKind::Array { items: ri }) => {
            matches_schemas(wi, ri, w_cxt, r_cxt)
        }
        (NodeKind::Map { values: wv }, NodeKind::Map { values: rv }) => {
            matches_schemas(wv, rv, w_cxt, r_cxt)
        }
        (NodeKind::Null, NodeKind::Null)
        | (NodeKind::Boolean, NodeKind::Boolean)
        | (NodeKind::Int, NodeKind::Int)
        | (NodeKind::Long, NodeKind::Long)
        | (NodeKind::Float, NodeKind::Float)
        | (NodeKind::Double, NodeKind::Double)
        | (NodeKind::Bytes, NodeKind::Bytes)
        | (NodeKind::Str, NodeKind::Str) => true,
        _ => false,
    }
}

/// `from_value` is the serde API for deserializing a decoded [`Value`] into
/// a native Rust type.
pub fn from_value<'de, D: Deserialize<'de>>(value: &'de Value) -> AvroResult<D> {
    let mut reader = SerdeReader::new(value);
    D::deserialize(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use std::str::FromStr;

    #[test]
    fn round_trips_a_record() {
        let schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"b","type":"string"}]}"##,
        )
        .unwrap();
        let mut rec = crate::value::Record::new("R");
        rec.insert("a", 7i32).unwrap();
        rec.insert("b", "hi").unwrap();
        let value = Value::Record(rec);
        let bytes = crate::codec::encode(&value, &schema).unwrap();
        let decoded = DatumReader::new(&schema).read(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn projects_reader_fields_and_fills_defaults() {
        let writer_schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[
                {"name":"a","type":"int"},
                {"name":"b","type":"int"},
                {"name":"c","type":"int"},
                {"name":"d","type":"int"},
                {"name":"g","type":"int"}
            ]}"##,
        )
        .unwrap();
        let reader_schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[
                {"name":"a","type":"int"},
                {"name":"c","type":"int"},
                {"name":"e","type":"int","default":5},
                {"name":"f","type":"int","default":6},
                {"name":"h","type":"int","default":0}
            ]}"##,
        )
        .unwrap();

        let mut rec = crate::value::Record::new("R");
        rec.insert("a", 1i32).unwrap();
        rec.insert("b", 2i32).unwrap();
        rec.insert("c", 3i32).unwrap();
        rec.insert("d", 4i32).unwrap();
        rec.insert("g", 7i32).unwrap();
        let bytes = crate::codec::encode(&Value::Record(rec), &writer_schema).unwrap();

        let decoded = DatumReader::with_reader_schema(&writer_schema, &reader_schema)
            .read(&bytes)
            .unwrap();
        let rec = decoded.as_record().unwrap();
        assert_eq!(rec.fields["a"].value, Value::Int(1));
        assert_eq!(rec.fields["c"].value, Value::Int(3));
        assert_eq!(rec.fields["e"].value, Value::Int(5));
        assert_eq!(rec.fields["f"].value, Value::Int(6));
        assert_eq!(rec.fields["h"].value, Value::Int(0));
    }

    struct HelloLogicalType;

    impl crate::config::LogicalType for HelloLogicalType {
        fn to_value(&self, domain: &Value) -> AvroResult<Value> {
            let s = domain.as_string().map_err(|_| AvroError::ExpectedString)?;
            Ok(Value::Str(format!("{}H", s)))
        }

        fn from_value(&self, avro: &Value) -> AvroResult<Value> {
            let s = avro.as_string().map_err(|_| AvroError::ExpectedString)?;
            Ok(Value::Str(s[..s.len() - 1].to_string()))
        }
    }

    #[test]
    fn reader_side_logical_type_hook_applies_through_resolution() {
        let schema = Schema::from_str(r##"{"type":"string","logicalType":"hello"}"##).unwrap();

        let mut encode_options = crate::config::EncodeOptions::default();
        encode_options
            .logical_types
            .register("hello", Box::new(HelloLogicalType));
        let bytes = crate::codec::encode_with(&Value::Str("Hello".into()), &schema, &encode_options).unwrap();

        let undecorated = DatumReader::new(&schema).read(&bytes).unwrap();
        assert_eq!(undecorated, Value::Str("HelloH".into()));

        let mut decode_options = DecodeOptions::default();
        decode_options
            .logical_types
            .register("hello", Box::new(HelloLogicalType));
        let decoded = DatumReader::with_reader_schema(&schema, &schema)
            .read_with(&bytes, &decode_options)
            .unwrap();
        assert_eq!(decoded, Value::Str("Hello".into()));
    }

    #[test]
    fn promotes_int_to_long() {
        let writer_schema = Schema::from_str(r##""int""##).unwrap();
        let reader_schema = Schema::from_str(r##""long""##).unwrap();
        let bytes = crate::codec::encode(&Value::Int(42), &writer_schema).unwrap();
        let decoded = DatumReader::with_reader_schema(&writer_schema, &reader_schema)
            .read(&bytes)
            .unwrap();
        assert_eq!(decoded, Value::Long(42));
    }
}
