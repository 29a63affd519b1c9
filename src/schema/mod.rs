//! Parsing and representation of Avro schemas.
//!
//! Schemas are written as JSON per the Avro specification and are parsed
//! into a typed tree ([`SchemaNode`]) backed by a [`Registry`] of named
//! types, so that named references (including recursive ones) resolve to
//! the same definition wherever they occur.

pub mod common;
mod emit;
pub mod parser;

pub(crate) use parser::Registry;

use crate::error::{AvroError, AvroResult};
use crate::value::Value;
use common::{Field, Name};
use indexmap::IndexMap;
use serde_json::{self, Value as JsonValue};
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;

/// The structural tag of a schema node, shared by every primitive,
/// collection and named type Avro defines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    Str,
    Record {
        name: Name,
        aliases: Option<Vec<String>>,
        fields: IndexMap<String, Field>,
        doc: Option<String>,
        is_error: bool,
    },
    Fixed {
        name: Name,
        size: usize,
        aliases: Option<Vec<String>>,
    },
    Enum {
        name: Name,
        aliases: Option<Vec<String>>,
        symbols: Vec<String>,
        doc: Option<String>,
    },
    Map {
        values: Box<SchemaNode>,
    },
    Array {
        items: Box<SchemaNode>,
    },
    Union {
        variants: Vec<SchemaNode>,
    },
    /// A union whose first branch is implicitly `string` (the "system
    /// error" branch), as declared by `{"type": "error_union", ...}`.
    /// Behaves exactly like `Union` for validation/encoding/decoding; only
    /// JSON emission treats it differently, by suppressing the synthetic
    /// leading branch.
    ErrorUnion {
        variants: Vec<SchemaNode>,
    },
    Named(String),
}

/// A schema node: its structural [`NodeKind`] plus the `logicalType`
/// attribute attached to it, if any. Logical types decorate the underlying
/// type (e.g. a `long` with `logicalType: "timestamp-millis"`) without
/// changing how it is encoded on the wire.
#[derive(Debug, Clone)]
pub(crate) struct SchemaNode {
    pub(crate) kind: NodeKind,
    pub(crate) logical_type: Option<String>,
    /// Arbitrary non-reserved JSON properties carried alongside this node,
    /// e.g. `{"type": "long", "logicalType": "timestamp-millis", "unit": "ms"}`
    /// carries `unit` here. Reserved keys (`type`, `name`, `namespace`,
    /// `aliases`, `fields`, `items`, `size`, `symbols`, `values`, `doc`,
    /// `logicalType`) never appear in this map.
    pub(crate) properties: IndexMap<String, JsonValue>,
}

impl SchemaNode {
    pub(crate) fn plain(kind: NodeKind) -> Self {
        SchemaNode {
            kind,
            logical_type: None,
            properties: IndexMap::new(),
        }
    }

    pub(crate) fn get_named_mut(&mut self) -> Option<&mut Name> {
        match &mut self.kind {
            NodeKind::Record { name, .. }
            | NodeKind::Fixed { name, .. }
            | NodeKind::Enum { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl PartialEq for SchemaNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.logical_type == other.logical_type
            && self.properties == other.properties
    }
}

/// An Avro schema, parsed from JSON.
///
/// Two schemas compare equal when their JSON representations, after being
/// re-emitted from the parsed structure, are identical - so differences in
/// source formatting or attribute order do not affect equality, but
/// differences in names, fields, symbols, aliases, doc strings or logical
/// types do.
#[derive(Debug)]
pub struct Schema {
    pub(crate) cxt: Registry,
    pub(crate) node: SchemaNode,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

impl std::str::FromStr for Schema {
    type Err = AvroError;

    /// Parses an avro schema from a JSON string.
    fn from_str(schema: &str) -> Result<Self, Self::Err> {
        let schema_json: JsonValue = serde_json::from_str(schema)?;
        Schema::parse_imp(schema_json)
    }
}

impl Schema {
    /// Parses an avro schema from a `.avsc` JSON file on disk.
    pub fn from_path<P: AsRef<Path> + Debug>(path: P) -> AvroResult<Self> {
        let schema_file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| AvroError::InvalidSchema(e.to_string()))?;
        let value: JsonValue = serde_json::from_reader(schema_file)?;
        Schema::parse_imp(value)
    }

    fn parse_imp(schema_json: JsonValue) -> AvroResult<Self> {
        let mut registry = Registry::new();
        let node = registry.parse_schema(&schema_json, None)?;
        Ok(Schema {
            cxt: registry,
            node,
        })
    }

    pub(crate) fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Validates that `value` conforms to this schema.
    #[inline(always)]
    pub fn validate(&self, value: &Value) -> AvroResult<()> {
        crate::validate::validate(&self.node, value, &self.cxt)
    }

    /// Validates that `value` conforms to this schema, consulting
    /// `options.logical_types` for any node carrying a `logicalType`.
    pub fn validate_with(&self, value: &Value, options: &crate::config::EncodeOptions) -> AvroResult<()> {
        crate::validate::validate_with(&self.node, value, &self.cxt, Some(&options.logical_types))
    }

    /// Re-emits this schema's JSON form from its parsed structure. Used for
    /// equality and for inspecting a schema that was built programmatically.
    pub fn to_json(&self) -> JsonValue {
        emit::to_json(&self.node, &mut Vec::new())
    }
}
