//! Validates that a [`Value`] conforms to a parsed schema, independent of
//! the binary codec.

use crate::config::LogicalTypes;
use crate::error::{AvroError, AvroResult};
use crate::schema::{NodeKind, Registry, SchemaNode};
use crate::value::Value;

pub(crate) fn validate(node: &SchemaNode, value: &Value, cxt: &Registry) -> AvroResult<()> {
    validate_with(node, value, cxt, None)
}

pub(crate) fn validate_with(
    node: &SchemaNode,
    value: &Value,
    cxt: &Registry,
    logical_types: Option<&LogicalTypes>,
) -> AvroResult<()> {
    if let Some(logical_type) = &node.logical_type {
        if let Some(lts) = logical_types {
            if let Some(handler) = lts.get(logical_type) {
                return if handler.validate_before_to_value(value) {
                    Ok(())
                } else {
                    Err(AvroError::LogicalTypeValidation {
                        logical_type: logical_type.clone(),
                        reason: "validateBeforeToValue rejected the value".into(),
                    })
                };
            }
        }
    }

    match (value, &node.kind) {
        (Value::Null, NodeKind::Null)
        | (Value::Boolean(_), NodeKind::Boolean)
        | (Value::Int(_), NodeKind::Int)
        | (Value::Long(_), NodeKind::Long)
        | (Value::Long(_), NodeKind::Float)
        | (Value::Long(_), NodeKind::Double)
        | (Value::Int(_), NodeKind::Long)
        | (Value::Int(_), NodeKind::Float)
        | (Value::Int(_), NodeKind::Double)
        | (Value::Float(_), NodeKind::Float)
        | (Value::Float(_), NodeKind::Double)
        | (Value::Double(_), NodeKind::Double)
        | (Value::Str(_), NodeKind::Str)
        | (Value::Str(_), NodeKind::Bytes)
        | (Value::Bytes(_), NodeKind::Str)
        | (Value::Bytes(_), NodeKind::Bytes) => Ok(()),

        (Value::Fixed(v), NodeKind::Fixed { size, .. })
        | (Value::Bytes(v), NodeKind::Fixed { size, .. }) => {
            if v.len() != *size {
                Err(AvroError::FixedValueLenMismatch {
                    found: v.len(),
                    expected: *size,
                })
            } else {
                Ok(())
            }
        }

        (Value::Record(rec), NodeKind::Record { fields, .. }) => {
            for key in rec.fields.keys() {
                if !fields.contains_key(key) {
                    return Err(AvroError::UnknownRecordField(key.clone()));
                }
            }
            for (fname, field) in fields {
                match rec.fields.get(fname) {
                    Some(fvalue) => validate_with(&field.ty, &fvalue.value, cxt, logical_types)?,
                    None => validate_with(&field.ty, &Value::Null, cxt, logical_types)
                        .map_err(|_| AvroError::RecordFieldMissing(fname.clone()))?,
                }
            }
            Ok(())
        }

        (Value::Map(hmap), NodeKind::Map { values }) => {
            for v in hmap.values() {
                validate_with(values, v, cxt, logical_types)?;
            }
            Ok(())
        }

        (Value::Enum(sym), NodeKind::Enum { symbols, .. }) => {
            if symbols.contains(sym) {
                Ok(())
            } else {
                Err(AvroError::UnknownEnumSymbol(sym.clone()))
            }
        }

        (Value::Array(items), NodeKind::Array { items: item_schema }) => {
            for v in items {
                validate_with(item_schema, v, cxt, logical_types)?;
            }
            Ok(())
        }

        (v, NodeKind::Named(name)) => {
            let schema = cxt
                .get(name)
                .ok_or_else(|| AvroError::NamedSchemaNotFound(name.clone()))?;
            validate_with(schema, v, cxt, logical_types)
        }

        (a, NodeKind::Union { variants } | NodeKind::ErrorUnion { variants }) => {
            let a = if let Value::Union(inner) = a { inner } else { a };
            for variant in variants {
                if validate_with(variant, a, cxt, logical_types).is_ok() {
                    return Ok(());
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

#[cfg(test)]
mod tests {
    use crate::Schema;
    use crate::Value;
    use std::str::FromStr;

    #[test]
    fn record_rejects_unknown_field() {
        let schema = Schema::from_str(r##"{"type":"record","name":"R","fields":[{"name":"a","type":"int"}]}"##).unwrap();
        let mut rec = crate::value::Record::new("R");
        rec.insert("a", 1i32).unwrap();
        rec.insert("b", 2i32).unwrap();
        let err = schema.validate(&Value::Record(rec)).unwrap_err();
        assert!(matches!(err, crate::error::AvroError::UnknownRecordField(_)));
    }

    #[test]
    fn record_allows_missing_nullable_field() {
        let schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[{"name":"a","type":["null","string"]}]}"##,
        )
        .unwrap();
        let rec = crate::value::Record::new("R");
        assert!(schema.validate(&Value::Record(rec)).is_ok());
    }

    #[test]
    fn record_rejects_missing_non_nullable_field_even_with_default() {
        let schema = Schema::from_str(
            r##"{"type":"record","name":"R","fields":[{"name":"a","type":"int","default":1}]}"##,
        )
        .unwrap();
        let rec = crate::value::Record::new("R");
        let err = schema.validate(&Value::Record(rec)).unwrap_err();
        assert!(matches!(err, crate::error::AvroError::RecordFieldMissing(_)));
    }

    #[test]
    fn promotions_validate() {
        let schema = Schema::from_str(r##""long""##).unwrap();
        assert!(schema.validate(&Value::Int(4)).is_ok());
    }

    #[test]
    fn int_boundaries() {
        let schema = Schema::from_str(r##""int""##).unwrap();
        assert!(schema.validate(&Value::Int(i32::MAX)).is_ok());
        assert!(schema.validate(&Value::Int(i32::MIN)).is_ok());
    }
}
