/// Tests for schema resolution
mod common;

use serde::{Deserialize, Serialize};

use avrow::{from_value, DatumReader, DatumWriter, Schema, Value};
use std::collections::HashMap;
use std::str::FromStr;

use common::MockSchema;

#[test]
fn null_fails_with_other_primitive_schema() {
    let schema = MockSchema.prim("null");
    let writer = DatumWriter::new(&schema);
    let bytes = writer.write(()).unwrap();

    let reader_schema = MockSchema.prim("boolean");
    let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
    assert!(reader.read(&bytes).is_err());
}

#[test]
fn writer_to_reader_promotion_primitives() {
    // int -> long, float, double
    for reader_schema in &["long", "float", "double"] {
        let schema = MockSchema.prim("int");
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write(1024).unwrap();

        let reader_schema = MockSchema.prim(reader_schema);
        let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
        assert!(reader.read(&bytes).is_ok());
    }

    // long -> float, double
    for reader_schema in &["float", "double"] {
        let schema = MockSchema.prim("long");
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write(1024i64).unwrap();

        let reader_schema = MockSchema.prim(reader_schema);
        let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
        assert!(reader.read(&bytes).is_ok());
    }

    // float -> double
    {
        let schema = MockSchema.prim("float");
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write(1026f32).unwrap();

        let reader_schema = MockSchema.prim("double");
        let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
        assert!(reader.read(&bytes).is_ok());
    }

    // string -> bytes
    {
        let schema = MockSchema.prim("string");
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write("hello").unwrap();

        let reader_schema = MockSchema.prim("bytes");
        let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
        let value = reader.read(&bytes).unwrap();
        assert_eq!(Value::Bytes(vec![104, 101, 108, 108, 111]), value);
    }

    // bytes -> string
    {
        let schema = MockSchema.prim("bytes");
        let writer = DatumWriter::new(&schema);
        let bytes = writer.write(vec![104u8, 101, 108, 108, 111]).unwrap();

        let reader_schema = MockSchema.prim("string");
        let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
        let value = reader.read(&bytes).unwrap();
        assert_eq!(Value::Str("hello".to_string()), value);
    }
}

#[derive(Serialize, Deserialize)]
enum Foo {
    A,
    B,
    C,
    E,
}

#[test]
fn enum_fails_schema_resolution() {
    let schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["A", "B", "C", "D"] }"##)
            .unwrap();
    let writer = DatumWriter::new(&schema);
    let bytes = writer.serialize(Foo::B).unwrap();

    // Reading a symbol which does not exist in the reader's schema fails.
    let reader_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["F"] }"##).unwrap();
    let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
    assert!(reader.read(&bytes).is_err());
}

#[test]
fn schema_resolution_map() {
    let schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();
    let writer = DatumWriter::new(&schema);
    let mut m = HashMap::new();
    m.insert("1".to_string(), "b".to_string());
    let bytes = writer.serialize(m).unwrap();

    // Reading values under a mismatched item schema fails.
    let reader_schema = Schema::from_str(r##"{"type": "map", "values": "int"}"##).unwrap();
    let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
    assert!(reader.read(&bytes).is_err());
}

#[derive(Serialize, Deserialize)]
struct LongList {
    value: i64,
    next: Option<Box<LongList>>,
}

#[derive(Serialize, Deserialize, Debug)]
struct LongListDefault {
    value: i64,
    next: Option<Box<LongListDefault>>,
    other: i64,
}

#[test]
fn record_schema_resolution_with_default_value() {
    let schema = MockSchema.record();
    let writer = DatumWriter::new(&schema);
    let list = LongList {
        value: 1,
        next: None,
    };
    let bytes = writer.serialize(list).unwrap();

    let reader_schema = MockSchema.record_default();
    let reader = DatumReader::with_reader_schema(&schema, &reader_schema);
    let decoded = reader.read(&bytes).unwrap();
    let rec: LongListDefault = from_value(&decoded).unwrap();
    assert_eq!(rec.value, 1);
    assert_eq!(rec.other, 1);
}

#[test]
fn writer_is_a_union_but_reader_is_not() {
    let writer_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);

    let reader_schema = Schema::from_str(r##""int""##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);

    let bytes = writer.serialize(()).unwrap();
    assert!(reader.read(&bytes).is_err());

    let bytes = writer.serialize(3).unwrap();
    assert!(reader.read(&bytes).is_ok());
}

#[test]
fn reader_is_a_union_but_writer_is_not() {
    let writer_schema = Schema::from_str(r##""int""##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let bytes = writer.serialize(3).unwrap();

    // err
    let reader_schema = Schema::from_str(r##"["null", "string"]"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_err());

    // ok
    let reader_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_ok());
}

#[test]
fn both_are_unions_but_different() {
    let writer_schema = Schema::from_str(r##"["null", "int"]"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let bytes = writer.serialize(3).unwrap();

    let reader_schema = Schema::from_str(r##"["boolean", "string"]"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_err());
}

#[test]
fn both_are_map() {
    let writer_schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let mut map = HashMap::new();
    map.insert("hello".to_string(), "world".to_string());
    let bytes = writer.serialize(map).unwrap();

    let reader_schema = Schema::from_str(r##"{"type": "map", "values": "string"}"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_ok());
}

#[test]
fn both_are_arrays() {
    let writer_schema = Schema::from_str(r##"{"type": "array", "items": "int"}"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let bytes = writer.serialize(vec![1, 2, 3]).unwrap();

    let reader_schema = Schema::from_str(r##"{"type": "array", "items": "int"}"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_ok());
}

#[test]
fn both_are_enums() {
    let writer_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["A", "B"]}"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let bytes = writer.write(Value::Enum("A".to_string())).unwrap();

    let reader_schema =
        Schema::from_str(r##"{"type": "enum", "name": "Foo", "symbols": ["A", "B"]}"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_ok());
}

#[test]
fn null() {
    let writer_schema = Schema::from_str(r##"{"type": "null"}"##).unwrap();
    let writer = DatumWriter::new(&writer_schema);
    let bytes = writer.write(()).unwrap();

    let reader_schema = Schema::from_str(r##"{"type": "null"}"##).unwrap();
    let reader = DatumReader::with_reader_schema(&writer_schema, &reader_schema);
    assert!(reader.read(&bytes).is_ok());
}
