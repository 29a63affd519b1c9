#![allow(missing_docs)]

use serde::{de, ser};
use std::fmt::Display;

// Required impls for Serde
impl ser::Error for AvroError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

impl de::Error for AvroError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

/// Convenience alias for `Result<T, AvroError>`.
pub type AvroResult<T> = Result<T, AvroError>;

/// Errors returned by this crate, grouped by the phase of processing in which
/// they occur: schema parsing, value validation, schema resolution, binary
/// encoding/decoding and the serde bridge.
#[derive(thiserror::Error, Debug)]
pub enum AvroError {
    // Schema parse errors
    #[error("expecting a required `type` field in schema")]
    SchemaParseFailed,
    #[error("expecting fields key as a json array, found: {0}")]
    SchemaFieldParseErr(String),
    #[error("record schema does not have a required field named `name`")]
    RecordNameNotFound,
    #[error("record schema does not have a required field named `type`")]
    RecordTypeNotFound,
    #[error("expected record field to be a json array")]
    ExpectedFieldsJsonArray,
    #[error("record's field json schema must be an object")]
    InvalidRecordFieldType,
    #[error("{0}")]
    ParseFieldOrderErr(String),
    #[error("could not parse name from json value")]
    NameParseFailed,
    #[error("duplicate definition of named schema: {0}")]
    DuplicateSchema(String),
    #[error("duplicate field name in record schema: {0}")]
    DuplicateField(String),
    #[error("invalid default value for union, must be the first entry from union definition")]
    FailedDefaultUnion,
    #[error("invalid default value for given schema")]
    DefaultValueParse,
    #[error("unknown field ordering value")]
    UnknownFieldOrdering,
    #[error("field ordering value must be a string")]
    InvalidFieldOrdering,
    #[error("failed to parse symbol from enum's symbols field")]
    EnumSymbolParseErr,
    #[error("enum schema must contain required `symbols` field")]
    EnumSymbolsMissing,
    #[error("fixed schema `size` field must be a number")]
    FixedSizeNotNumber,
    #[error("fixed schema `size` field missing")]
    FixedSizeNotFound,
    #[error("unions cannot have multiple schemas of same type or immediate unions")]
    DuplicateSchemaInUnion,
    #[error("unions cannot directly contain another union")]
    NoImmediateUnion,
    #[error("expected the avro schema to be one of json string, object or array")]
    UnknownSchema,
    #[error("expected record field to be a json object, found {0}")]
    InvalidSchema(String),
    #[error("{0}")]
    InvalidDefaultValue(String),
    #[error("invalid type for {0}")]
    InvalidType(String),
    #[error("enum schema parsing failed, found: {0}")]
    EnumParseErr(String),
    #[error("primitive schema must be a string")]
    InvalidPrimitiveSchema,
    #[error("named schema reference `{0}` was not found in the schema registry")]
    NamedSchemaNotFound(String),
    #[error("`request` message parameter lists are not supported by this crate")]
    RequestUnsupported,
    #[error("namespaces must either be empty or follow the grammar <name>(<dot><name>)*")]
    InvalidNamespace,
    #[error("names must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName,
    #[error("reserved property `{0}` cannot appear under `properties`")]
    ReservedProperty(String),

    // Value validation errors
    #[error("expected {expected}, found value {found}")]
    ValidationFailed { expected: String, found: String },
    #[error("record is missing required field `{0}`")]
    RecordFieldMissing(String),
    #[error("record value has a key `{0}` that does not exist in its schema")]
    UnknownRecordField(String),
    #[error("mismatch in fixed bytes length, found {found}, expected {expected}")]
    FixedValueLenMismatch { found: usize, expected: usize },
    #[error("enum value `{0}` is not one of the schema's declared symbols")]
    UnknownEnumSymbol(String),
    #[error("value does not match any branch of the union schema")]
    NotFoundInUnion,

    // Schema resolution errors
    #[error("schema resolution failed, reader schema `{reader}` cannot read writer schema `{writer}`")]
    SchemaResolutionFailed { writer: String, reader: String },
    #[error("writer's record field `{0}` has no matching field in reader's record and no default is available")]
    ResolutionFieldMissing(String),
    #[error("writer's enum symbol `{0}` is absent from reader's enum")]
    ResolutionEnumSymbolMissing(String),
    #[error("array/map item schemas do not resolve")]
    ResolutionItemMismatch,
    #[error("fixed schema names or sizes do not resolve: {0}")]
    ResolutionFixedMismatch(String),
    #[error("union branch in writer schema has no matching branch in reader schema")]
    ResolutionUnionMismatch,

    // Binary codec errors
    #[error("unexpected end of input while decoding")]
    Eof,
    #[error("invalid zig-zag/varint encoding")]
    InvalidVarint,
    #[error("block byte-count did not match the bytes consumed while skipping it")]
    BlockSizeMismatch,
    #[error("negative block count must be followed by a byte-size")]
    MissingBlockByteSize,
    #[error("encoding failed, value does not match schema")]
    SchemaDataMismatch,

    // Logical type errors
    #[error("logical type `{0}` is not registered")]
    UnknownLogicalType(String),
    #[error("logical type `{logical_type}` rejected value: {reason}")]
    LogicalTypeValidation {
        logical_type: String,
        reason: String,
    },

    // Serde bridge errors
    #[error("{0}")]
    Message(String),
    #[error("unexpected avro value: {value}")]
    UnexpectedAvroValue { value: String },
    #[error("unsupported operation for the serde bridge")]
    Unsupported,
    #[error("expected a string value")]
    ExpectedString,

    // Value errors
    #[error("expected value not found in variant instance")]
    ExpectedVariantNotFound,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
