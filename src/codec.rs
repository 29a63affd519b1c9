//! Encodes [`Value`]s into the avro binary wire format, writer-schema
//! directed. Decoding and schema resolution live in [`crate::reader`]; this
//! module holds the encode side plus a few helpers shared by both.

use crate::config::EncodeOptions;
use crate::cursor::{encode_to_vec, Cursor};
use crate::error::{AvroError, AvroResult};
use crate::schema::{NodeKind, Registry, Schema, SchemaNode};
use crate::value::Value;

/// Encodes `value` against `schema`'s root node into a freshly allocated
/// buffer.
#[allow(dead_code)]
pub(crate) fn encode(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    encode_with(value, schema, &EncodeOptions::default())
}

/// Encodes `value` against `schema`'s root node, consulting `options` for
/// any logical-type hooks along the way.
#[allow(dead_code)]
pub(crate) fn encode_with(
    value: &Value,
    schema: &Schema,
    options: &EncodeOptions,
) -> AvroResult<Vec<u8>> {
    let node = schema.node();
    let cxt = &schema.cxt;
    Ok(encode_to_vec(64, |cursor| {
        write_data(cursor, node, value, cxt, options)
    }))
}

/// Writes `value` onto `cursor` per `node`, resolving named references
/// through `cxt` and consulting `options.logical_types` for logical types.
pub(crate) fn write_data(
    cursor: &mut Cursor<'_>,
    node: &SchemaNode,
    value: &Value,
    cxt: &Registry,
    options: &EncodeOptions,
) -> AvroResult<()> {
    if let Some(logical_type) = &node.logical_type {
        if let Some(handler) = options.logical_types.get(logical_type) {
            let converted = handler.to_value(value)?;
            let plain = SchemaNode::plain(node.kind.clone());
            return write_data(cursor, &plain, &converted, cxt, options);
        }
    }

    match (value, &node.kind) {
        (Value::Null, NodeKind::Null) => {
            cursor.write_null();
            Ok(())
        }
        (Value::Boolean(b), NodeKind::Boolean) => {
            cursor.write_boolean(*b);
            Ok(())
        }
        (Value::Int(i), NodeKind::Int) => {
            cursor.write_int(*i);
            Ok(())
        }
        (Value::Int(i), NodeKind::Long) => {
            cursor.write_long(i64::from(*i));
            Ok(())
        }
        (Value::Int(i), NodeKind::Float) => {
            cursor.write_float(*i as f32);
            Ok(())
        }
        (Value::Int(i), NodeKind::Double) => {
            cursor.write_double(f64::from(*i));
            Ok(())
        }
        (Value::Long(l), NodeKind::Long) => {
            cursor.write_long(*l);
            Ok(())
        }
        (Value::Long(l), NodeKind::Float) => {
            cursor.write_float(*l as f32);
            Ok(())
        }
        (Value::Long(l), NodeKind::Double) => {
            cursor.write_double(*l as f64);
            Ok(())
        }
        (Value::Float(f), NodeKind::Float) => {
            cursor.write_float(*f);
            Ok(())
        }
        (Value::Float(f), NodeKind::Double) => {
            cursor.write_double(f64::from(*f));
            Ok(())
        }
        (Value::Double(d), NodeKind::Double) => {
            cursor.write_double(*d);
            Ok(())
        }
        (Value::Str(s), NodeKind::Str) => {
            cursor.write_string(s);
            Ok(())
        }
        (Value::Str(s), NodeKind::Bytes) => {
            cursor.write_bytes(s.as_bytes());
            Ok(())
        }
        (Value::Bytes(b), NodeKind::Bytes) => {
            cursor.write_bytes(b);
            Ok(())
        }
        (Value::Bytes(b), NodeKind::Str) => {
            let s = std::str::from_utf8(b).map_err(|_| AvroError::ExpectedString)?;
            cursor.write_string(s);
            Ok(())
        }
        (Value::Fixed(b), NodeKind::Fixed { size, .. })
        | (Value::Bytes(b), NodeKind::Fixed { size, .. }) => {
            if b.len() != *size {
                return Err(AvroError::FixedValueLenMismatch {
                    found: b.len(),
                    expected: *size,
                });
            }
            cursor.write_fixed(b);
            Ok(())
        }

        (Value::Record(rec), NodeKind::Record { fields, .. }) => {
            for (fname, field) in fields {
                match rec.fields.get(fname) {
                    Some(fvalue) => write_data(cursor, &field.ty, &fvalue.value, cxt, options)?,
                    None => {
                        let default = field
                            .default
                            .as_ref()
                            .ok_or_else(|| AvroError::RecordFieldMissing(fname.clone()))?;
                        write_data(cursor, &field.ty, default, cxt, options)?
                    }
                }
            }
            Ok(())
        }

        (Value::Map(map), NodeKind::Map { values }) => {
            if !map.is_empty() {
                cursor.write_long(map.len() as i64);
                for (k, v) in map {
                    cursor.write_string(k);
                    write_data(cursor, values, v, cxt, options)?;
                }
            }
            cursor.write_long(0);
            Ok(())
        }

        (Value::Array(items), NodeKind::Array { items: item_schema }) => {
            if !items.is_empty() {
                cursor.write_long(items.len() as i64);
                for v in items {
                    write_data(cursor, item_schema, v, cxt, options)?;
                }
            }
            cursor.write_long(0);
            Ok(())
        }

        (Value::Enum(sym), NodeKind::Enum { symbols, .. }) => {
            let idx = symbols
                .iter()
                .position(|s| s == sym)
                .ok_or_else(|| AvroError::UnknownEnumSymbol(sym.clone()))?;
            cursor.write_int(idx as i32);
            Ok(())
        }

        (v, NodeKind::Named(name)) => {
            let resolved = cxt
                .get(name)
                .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
            write_data(cursor, resolved, v, cxt, options)
        }

        (v, NodeKind::Union { variants } | NodeKind::ErrorUnion { variants }) => {
            let inner = if let Value::Union(inner) = v { inner.as_ref() } else { v };
            for (idx, variant) in variants.iter().enumerate() {
                if value_fits(inner, variant, cxt) {
                    cursor.write_long(idx as i64);
                    return write_data(cursor, variant, inner, cxt, options);
                }
            }
            Err(AvroError::NotFoundInUnion)
        }

        (v, s) => Err(AvroError::ValidationFailed {
            expected: format!("{:?}", s),
            found: format!("{:?}", v),
        }),
    }
}

/// Whether `value` can be written against `node` - used to pick the union
/// branch a value belongs to. Mirrors [`crate::validate::validate`] but
/// stays silent on mismatch instead of reporting why.
fn value_fits(value: &Value, node: &SchemaNode, cxt: &Registry) -> bool {
    crate::validate::validate(node, value, cxt).is_ok()
}

/// Whether `reader_name` accepts a value written under `writer_name`: either
/// they're equal, or `writer_name` appears among `reader_aliases`.
pub(crate) fn fullname_matches(
    writer_name: &str,
    reader_name: &str,
    reader_aliases: &Option<Vec<String>>,
) -> bool {
    if writer_name == reader_name {
        return true;
    }
    reader_aliases
        .as_ref()
        .map(|aliases| aliases.iter().any(|a| a == writer_name))
        .unwrap_or(false)
}

/// Follows a `Named` indirection to the underlying node, using `cxt` to
/// resolve the reference.
pub(crate) fn resolve_named<'a>(node: &'a SchemaNode, cxt: &'a Registry) -> AvroResult<&'a SchemaNode> {
    match &node.kind {
        NodeKind::Named(name) => {
            let resolved = cxt
                .get(name)
                .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
            resolve_named(resolved, cxt)
        }
        _ => Ok(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use std::convert::TryInto;
    use std::str::FromStr;

    #[test]
    fn encodes_zigzag_int() {
        let schema = Schema::from_str(r##""int""##).unwrap();
        let bytes = encode(&Value::Int(-64), &schema).unwrap();
        assert_eq!(bytes, vec![127]);
    }

    #[test]
    fn encodes_record_fields_in_order() {
        let schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[{"name":"a","type":"int"},{"name":"b","type":"string"}]}"##,
        )
        .unwrap();
        let mut rec = crate::value::Record::new("R");
        rec.insert("a", 1i32).unwrap();
        rec.insert("b", "hi").unwrap();
        let bytes = encode(&Value::Record(rec), &schema).unwrap();
        assert_eq!(bytes, vec![2, 4, b'h', b'i']);
    }

    #[test]
    fn int_promotes_to_double_on_the_wire() {
        let schema = Schema::from_str(r##""double""##).unwrap();
        let bytes = encode(&Value::Int(1), &schema).unwrap();
        assert_eq!(bytes.len(), 8);
        let arr: [u8; 8] = bytes.try_into().unwrap();
        assert_eq!(f64::from_le_bytes(arr), 1.0);
    }
}
