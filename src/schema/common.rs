// Types shared across the schema model: names, field ordering and record
// field definitions.

use crate::error::AvroError;
use crate::schema::SchemaNode;
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt::{self, Display};
use std::str::FromStr;

///////////////////////////////////////////////////////////////////////////////
/// Name implementation for named types: record, fixed, enum
///////////////////////////////////////////////////////////////////////////////

pub(crate) fn validate_name(idx: usize, name: &str) -> Result<(), AvroError> {
    if name.contains('.')
        || (name.starts_with(|a: char| a.is_ascii_digit()) && idx == 0)
        || name.is_empty()
        || !name.chars().any(|a| a.is_ascii_alphanumeric() || a == '_')
    {
        Err(AvroError::InvalidName)
    } else {
        Ok(())
    }
}

// Follows the grammar: <empty> | <name>[(<dot><name>)*]
pub(crate) fn validate_namespace(s: &str) -> Result<(), AvroError> {
    let split = s.split('.');
    for (i, n) in split.enumerate() {
        validate_name(i, n).map_err(|_| AvroError::InvalidNamespace)?;
    }
    Ok(())
}

/// The `fullname` of a named avro type: record, fixed or enum.
#[derive(Debug, Clone, Eq, PartialOrd, Ord)]
pub struct Name {
    pub(crate) name: String,
    pub(crate) namespace: Option<String>,
}

impl Name {
    // Creates a new name with validation. Extracts the namespace if a dot is
    // present in `name`. Any later call to set_namespace is then a noop.
    pub(crate) fn new(name: &str) -> Result<Self, AvroError> {
        let mut namespace = None;
        let name = if name.contains('.') {
            validate_namespace(name)?;
            let idx = name.rfind('.').unwrap();
            namespace = Some(name[..idx].to_string());
            let name = &name[idx + 1..];
            validate_name(0, name)?;
            name
        } else {
            validate_name(0, name)?;
            name
        };

        Ok(Self {
            name: name.to_string(),
            namespace,
        })
    }

    pub(crate) fn from_json(
        json: &serde_json::map::Map<String, JsonValue>,
        enclosing_namespace: Option<&str>,
    ) -> Result<Self, AvroError> {
        let mut name = if let Some(JsonValue::String(ref s)) = json.get("name") {
            Name::new(s)
        } else {
            return Err(AvroError::NameParseFailed);
        }?;

        // If the name field has a dot, that is a fullname and any namespace
        // attribute is ignored. Otherwise fall back to the `namespace` field
        // on this json object, then the enclosing namespace.
        if name.namespace.is_none() {
            if let Some(namespace) = json.get("namespace") {
                if let JsonValue::String(s) = namespace {
                    validate_namespace(s)?;
                    name.set_namespace(s)?;
                }
            } else if let Some(a) = enclosing_namespace {
                validate_namespace(a)?;
                name.set_namespace(a)?;
            }
        }

        Ok(name)
    }

    pub(crate) fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[allow(dead_code)]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_namespace(&mut self, namespace: &str) -> Result<(), AvroError> {
        // empty string is a null namespace
        if namespace.is_empty() {
            return Ok(());
        }

        validate_namespace(namespace)?;
        if self.namespace.is_none() {
            self.namespace = Some(namespace.to_string());
        }
        Ok(())
    }

    pub(crate) fn fullname(&self) -> String {
        if let Some(n) = &self.namespace {
            if n.is_empty() {
                self.name.to_string()
            } else {
                format!("{}.{}", n, self.name)
            }
        } else {
            self.name.to_string()
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fullname())
    }
}

impl FromStr for Name {
    type Err = AvroError;

    fn from_str(s: &str) -> Result<Self, AvroError> {
        Name::new(s)
    }
}

impl std::convert::TryFrom<&str> for Name {
    type Error = AvroError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.fullname() == other.fullname()
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Ordering for record fields
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, PartialEq, Clone)]
pub enum Order {
    Ascending,
    Descending,
    Ignore,
}

impl FromStr for Order {
    type Err = AvroError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(Order::Ascending),
            "descending" => Ok(Order::Descending),
            "ignore" => Ok(Order::Ignore),
            _ => Err(AvroError::UnknownFieldOrdering),
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Ascending
    }
}

///////////////////////////////////////////////////////////////////////////////
/// Record field definition.
///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: SchemaNode,
    pub(crate) default: Option<Value>,
    #[allow(dead_code)]
    pub(crate) order: Order,
    pub(crate) aliases: Option<Vec<String>>,
    pub(crate) doc: Option<String>,
    /// Arbitrary non-reserved JSON properties carried on the field
    /// declaration itself, distinct from any carried on its `ty`. Reserved
    /// keys (`name`, `type`, `default`, `order`, `doc`, `aliases`) never
    /// appear here.
    pub(crate) properties: IndexMap<String, JsonValue>,
}

impl std::cmp::PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Field {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &str,
        ty: SchemaNode,
        default: Option<Value>,
        order: Order,
        aliases: Option<Vec<String>>,
        doc: Option<String>,
        properties: IndexMap<String, JsonValue>,
    ) -> Result<Self, AvroError> {
        // Field names must adhere to the same grammar as named type names.
        validate_name(0, name)?;
        Ok(Field {
            name: name.to_string(),
            ty,
            default,
            order,
            aliases,
            doc,
            properties,
        })
    }

    /// The name under which this field was actually written, accounting for
    /// the reader's declared aliases matching the writer's field name.
    pub(crate) fn matches_writer_name(&self, writer_name: &str) -> bool {
        if self.name == writer_name {
            return true;
        }
        self.aliases
            .as_ref()
            .map(|aliases| aliases.iter().any(|a| a == writer_name))
            .unwrap_or(false)
    }
}
