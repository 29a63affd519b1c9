//! Configuration knobs threaded through validation, encoding and decoding:
//! chiefly the logical-type registry (§6.2), grouped the way the teacher
//! groups constants in one module rather than as ad hoc positional
//! arguments.

use crate::error::AvroResult;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// A user-supplied interpretation of a schema's underlying Avro
/// representation, registered under the name given by a schema node's
/// `logicalType` property.
///
/// Hooks are synchronous: this crate targets a host with no ubiquitous
/// async runtime in its standard library, so a caller needing a suspending
/// conversion resolves it to a plain value before handing it to the codec,
/// rather than the codec awaiting it mid-walk.
pub trait LogicalType {
    /// Converts a domain value into the value that will be encoded using
    /// the schema's underlying Avro type. Called before encoding.
    fn to_value(&self, domain: &Value) -> AvroResult<Value>;

    /// Converts a decoded Avro value back into its domain representation.
    /// Called after decoding.
    fn from_value(&self, avro: &Value) -> AvroResult<Value>;

    /// Whether `domain` is acceptable input to [`LogicalType::to_value`].
    /// Defaults to always accepting.
    fn validate_before_to_value(&self, _domain: &Value) -> bool {
        true
    }

    /// Whether `avro` is acceptable input to [`LogicalType::from_value`].
    /// Returning `false` leaves the decoded value untouched, per the Avro
    /// specification's "ignore the logical type" fallback. Defaults to
    /// always accepting.
    fn validate_before_from_value(&self, _avro: &Value) -> bool {
        true
    }
}

impl fmt::Debug for dyn LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogicalType")
    }
}

/// A registry of logical-type handlers, keyed by the name that appears in
/// a schema node's `logicalType` property.
#[derive(Default)]
pub struct LogicalTypes(HashMap<String, Box<dyn LogicalType>>);

impl LogicalTypes {
    /// Creates an empty registry.
    pub fn new() -> Self {
        LogicalTypes(HashMap::new())
    }

    /// Registers `handler` under `name`, replacing any handler already
    /// registered under that name.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn LogicalType>) -> &mut Self {
        self.0.insert(name.into(), handler);
        self
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn LogicalType> {
        self.0.get(name).map(AsRef::as_ref)
    }
}

impl fmt::Debug for LogicalTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicalTypes")
            .field("registered", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Options threaded through validation and encoding.
#[derive(Debug, Default)]
pub struct EncodeOptions {
    /// Handlers consulted for schema nodes carrying a `logicalType`.
    pub logical_types: LogicalTypes,
}

/// Options threaded through decoding.
#[derive(Debug, Default)]
pub struct DecodeOptions {
    /// Handlers consulted for schema nodes carrying a `logicalType`.
    pub logical_types: LogicalTypes,
}
