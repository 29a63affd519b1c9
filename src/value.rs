//! The in-memory representation of avro-typed data, independent of any
//! particular schema.

use crate::error::AvroError;
use crate::schema::common::{validate_name, Order};
use crate::schema::parser::parse_default;
use crate::schema::NodeKind;
use crate::Schema;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Convenience type alias for avro map values.
pub type Map = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FieldValue {
    pub(crate) value: Value,
    #[serde(skip_serializing)]
    pub(crate) order: Order,
}

impl FieldValue {
    pub(crate) fn new(value: Value) -> Self {
        FieldValue {
            value,
            order: Order::Ascending,
        }
    }
}

/// The [record](https://avro.apache.org/docs/current/spec.html#schema_record)
/// avro type. Any struct implementing `serde::Serialize` converts to one via
/// [`crate::to_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub(crate) name: String,
    pub(crate) fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Creates a new, empty avro record value with the given name.
    pub fn new(name: &str) -> Self {
        Record {
            fields: IndexMap::new(),
            name: name.to_string(),
        }
    }

    /// Adds a field to the record.
    pub fn insert<T: Into<Value>>(&mut self, field_name: &str, ty: T) -> Result<(), AvroError> {
        validate_name(0, field_name)?;
        self.fields
            .insert(field_name.to_string(), FieldValue::new(ty.into()));
        Ok(())
    }

    /// Sets the sort order used for this field when the record is written
    /// as part of a sort-key comparison.
    pub fn set_field_order(&mut self, field_name: &str, order: Order) -> Result<(), AvroError> {
        let field = self
            .fields
            .get_mut(field_name)
            .ok_or_else(|| AvroError::UnknownRecordField(field_name.to_string()))?;
        field.order = order;
        Ok(())
    }

    /// Builds a record value from a `BTreeMap`, consuming it. Field names
    /// come from the map's keys.
    pub fn from_btree<K: Into<String> + Ord + Display, V: Into<Value>>(
        name: &str,
        btree: BTreeMap<K, V>,
    ) -> Result<Self, AvroError> {
        let mut record = Record::new(name);
        for (k, v) in btree {
            record
                .fields
                .insert(k.to_string(), FieldValue::new(v.into()));
        }
        Ok(record)
    }

    /// Builds a record value from a JSON object, using `schema` to
    /// interpret each field (and to fill in defaults for fields absent from
    /// `json`).
    pub fn from_json(
        json: serde_json::Map<String, serde_json::Value>,
        schema: &Schema,
    ) -> Result<Value, AvroError> {
        if let NodeKind::Record {
            name,
            fields: record_schema_fields,
            ..
        } = &schema.node().kind
        {
            let mut values = IndexMap::with_capacity(record_schema_fields.len());
            'fields: for (k, field) in record_schema_fields {
                if let Some(raw_value) = json.get(k) {
                    if let NodeKind::Union { variants } = &field.ty.kind {
                        for variant in variants {
                            if let Ok(v) = parse_default(raw_value, variant) {
                                values.insert(k.to_string(), FieldValue::new(v));
                                continue 'fields;
                            }
                        }
                        return Err(AvroError::FailedDefaultUnion);
                    } else {
                        let parsed_value = parse_default(raw_value, &field.ty)?;
                        values.insert(k.to_string(), FieldValue::new(parsed_value));
                    }
                } else if let Some(default) = &field.default {
                    values.insert(k.to_string(), FieldValue::new(default.clone()));
                } else {
                    return Err(AvroError::RecordFieldMissing(k.clone()));
                }
            }

            Ok(Value::Record(Record {
                fields: values,
                name: name.fullname(),
            }))
        } else {
            Err(AvroError::InvalidSchema(
                "Record::from_json requires a record schema".into(),
            ))
        }
    }
}

/// A decoded or to-be-encoded avro value, independent of schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// A null value.
    Null,
    /// An i32 integer value.
    Int(i32),
    /// An i64 long value.
    Long(i64),
    /// A boolean value.
    Boolean(bool),
    /// An f32 float value.
    Float(f32),
    /// An f64 double value.
    Double(f64),
    /// A record value.
    Record(Record),
    /// A fixed-size byte sequence.
    Fixed(Vec<u8>),
    /// A map from string keys to values of a single schema.
    Map(Map),
    /// A variable-length byte sequence.
    Bytes(Vec<u8>),
    /// A utf-8 string.
    Str(String),
    /// The resolved value of a union branch.
    Union(Box<Value>),
    /// An enum symbol name.
    Enum(String),
    /// An array of values of a single schema.
    Array(Vec<Value>),
    /// Used internally to let the serde bridge build up byte sequences one
    /// byte at a time; never produced by the schema parser or the decoder.
    Byte(u8),
}

#[macro_export]
/// Builds an avro fixed value from a byte vector.
macro_rules! fixed {
    ($vec:tt) => {
        $crate::Value::Fixed($vec)
    };
}

///////////////////////////////////////////////////////////////////////////////
/// From impls for Value
///////////////////////////////////////////////////////////////////////////////

impl From<()> for Value {
    fn from(_v: ()) -> Value {
        Value::Null
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(v: HashMap<String, T>) -> Value {
        let mut map = HashMap::with_capacity(v.len());
        for (k, v) in v.into_iter() {
            map.insert(k, v.into());
        }
        Value::Map(map)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Boolean(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Value {
        Value::Bytes(value)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(value: &'a [u8]) -> Value {
        Value::Bytes(value.to_vec())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Value {
        Value::Int(value)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Value {
        Value::Int(value as i32)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Value {
        Value::Int(value as i32)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Long(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Value {
        Value::Long(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Value {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Double(value)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Value {
        Value::Str(value.to_string())
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Value -> Rust value
///////////////////////////////////////////////////////////////////////////////

impl Value {
    /// Tries to retrieve an avro null.
    pub fn as_null(&self) -> Result<(), AvroError> {
        if let Value::Null = self {
            Ok(())
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro boolean.
    pub fn as_boolean(&self) -> Result<&bool, AvroError> {
        if let Value::Boolean(b) = self {
            Ok(b)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro int.
    pub fn as_int(&self) -> Result<&i32, AvroError> {
        if let Value::Int(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro long.
    pub fn as_long(&self) -> Result<&i64, AvroError> {
        if let Value::Long(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro float.
    pub fn as_float(&self) -> Result<&f32, AvroError> {
        if let Value::Float(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro double.
    pub fn as_double(&self) -> Result<&f64, AvroError> {
        if let Value::Double(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve avro bytes.
    pub fn as_bytes(&self) -> Result<&[u8], AvroError> {
        if let Value::Bytes(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro string.
    pub fn as_string(&self) -> Result<&str, AvroError> {
        if let Value::Str(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro record.
    pub fn as_record(&self) -> Result<&Record, AvroError> {
        if let Value::Record(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve the symbol of an avro enum.
    pub fn as_enum(&self) -> Result<&str, AvroError> {
        if let Value::Enum(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro array.
    pub fn as_array(&self) -> Result<&[Value], AvroError> {
        if let Value::Array(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro map.
    pub fn as_map(&self) -> Result<&HashMap<String, Value>, AvroError> {
        if let Value::Map(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve the resolved value of a union.
    pub fn as_union(&self) -> Result<&Value, AvroError> {
        if let Value::Union(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
    /// Tries to retrieve an avro fixed value.
    pub fn as_fixed(&self) -> Result<&[u8], AvroError> {
        if let Value::Fixed(v) = self {
            Ok(v)
        } else {
            Err(AvroError::ExpectedVariantNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::Schema;
    use crate::Value;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    #[test]
    fn record_from_btree() {
        let mut rec = BTreeMap::new();
        rec.insert("foo", "bar");
        let _r = Record::from_btree("test", rec).unwrap();
    }

    #[test]
    fn record_from_json() {
        let schema = Schema::from_str(
            r##"
                {
                "name": "rust_mentors",
                "type": "record",
                "fields": [
                    {
                    "name": "name",
                    "type": "string"
                    },
                    {
                    "name": "github_handle",
                    "type": "string"
                    },
                    {
                    "name": "active",
                    "type": "boolean"
                    },
                    {
                        "name":"mentees",
                        "type": {
                            "name":"mentees",
                            "type": "record",
                            "fields": [
                                {"name":"id", "type": "int"},
                                {"name":"username", "type": "string"}
                            ]
                        }
                    }
                ]
                }
"##,
        )
        .unwrap();

        let json = serde_json::from_str(
            r##"
        { "name": "bob",
          "github_handle":"ghbob",
          "active": true,
          "mentees":{"id":1, "username":"alice"} }"##,
        )
        .unwrap();
        let rec = Record::from_json(json, &schema).unwrap();
        let encoded = crate::codec::encode(&rec.into(), &schema).unwrap();
        assert!(!encoded.is_empty());
    }

    #[test]
    fn record_has_fields_with_default() {
        let schema_str = r##"
        {
            "namespace": "sensor.data",
            "type": "record",
            "name": "common",
            "fields" : [
                {"name": "data", "type": ["null", "string"], "default": null}
            ]
        }
"##;

        let sample_data = r#"{
            "data": null
        }"#;

        let json = serde_json::from_str(sample_data).unwrap();
        let schema = Schema::from_str(schema_str).unwrap();
        let rec = Record::from_json(json, &schema).unwrap();
        let field = &rec.as_record().unwrap().fields["data"];
        assert_eq!(field.value, Value::Null);
    }
}
