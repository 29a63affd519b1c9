//! The primary interface for encoding values against a schema.

use crate::codec::write_data;
use crate::config::EncodeOptions;
use crate::cursor::encode_to_vec;
use crate::error::AvroResult;
use crate::schema::Schema;
use crate::serde_avro;
use crate::value::Value;
use serde::Serialize;

/// Validates and encodes [`Value`]s against a schema into the avro binary
/// wire format.
pub struct DatumWriter<'a> {
    schema: &'a Schema,
}

impl<'a> DatumWriter<'a> {
    /// Creates a writer that validates and encodes against `schema`.
    pub fn new(schema: &'a Schema) -> Self {
        DatumWriter { schema }
    }

    /// Validates `value` against this writer's schema, then encodes it into
    /// a freshly allocated buffer.
    pub fn write<T: Into<Value>>(&self, value: T) -> AvroResult<Vec<u8>> {
        self.write_with(value, &EncodeOptions::default())
    }

    /// Same as [`DatumWriter::write`], consulting `options.logical_types`
    /// during both validation and encoding.
    pub fn write_with<T: Into<Value>>(
        &self,
        value: T,
        options: &EncodeOptions,
    ) -> AvroResult<Vec<u8>> {
        let value: Value = value.into();
        self.schema.validate_with(&value, options)?;
        let node = self.schema.node();
        let cxt = &self.schema.cxt;
        Ok(encode_to_vec(64, |cursor| {
            write_data(cursor, node, &value, cxt, options)
        }))
    }

    /// Serializes a native Rust value implementing `Serialize`, then
    /// validates and encodes the result as in [`DatumWriter::write`].
    pub fn serialize<T: Serialize>(&self, value: T) -> AvroResult<Vec<u8>> {
        let value = serde_avro::to_value(&value)?;
        self.write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DatumReader;
    use std::str::FromStr;

    #[test]
    fn validates_before_encoding() {
        let schema = Schema::from_str(r##""int""##).unwrap();
        let writer = DatumWriter::new(&schema);
        let err = writer.write(Value::Str("nope".into())).unwrap_err();
        assert!(matches!(err, crate::error::AvroError::ValidationFailed { .. }));
    }

    #[test]
    fn writes_and_reads_back() {
        let schema = Schema::from_str(r##""long""##).unwrap();
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write(42i64).unwrap();
        let value = DatumReader::new(&schema).read(&bytes).unwrap();
        assert_eq!(value, Value::Long(42));
    }

    #[test]
    fn serializes_unit_as_null() {
        let schema = Schema::from_str(r##""null""##).unwrap();
        let writer = DatumWriter::new(&schema);
        let bytes = writer.serialize(()).unwrap();
        assert!(bytes.is_empty());
    }
}
