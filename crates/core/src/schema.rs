//! Table key schemas
//!
//! A [`TableSchema`] names a table's hash key, its optional range key, and the
//! attributes the table indexes. Backends use it to pull the primary key out
//! of items and to validate the keys that requests carry.

use crate::error::{StoreError, StoreResult};
use crate::request::render_key;
use crate::value::{AttributeValue, Item};
use serde::{Deserialize, Serialize};

/// Scalar type a key attribute must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// String ("S")
    S,
    /// Number ("N")
    N,
}

impl ScalarType {
    /// Check whether a value has this type.
    pub fn matches(&self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::S, AttributeValue::S(_)) | (ScalarType::N, AttributeValue::N(_))
        )
    }
}

/// A named, typed key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute type
    pub key_type: ScalarType,
}

impl KeyAttribute {
    /// Create a key attribute.
    pub fn new(name: impl Into<String>, key_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            key_type,
        }
    }
}

/// Key layout of one physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Physical table name (already prefixed)
    pub table_name: String,
    /// Partition key
    pub hash_key: KeyAttribute,
    /// Sort key, for composite-key tables
    pub range_key: Option<KeyAttribute>,
    /// Indexed non-key attributes
    pub indexes: Vec<KeyAttribute>,
}

impl TableSchema {
    /// Create a schema with a hash key only.
    pub fn new(table_name: impl Into<String>, hash_key: KeyAttribute) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key,
            range_key: None,
            indexes: Vec::new(),
        }
    }

    /// Add a range key.
    pub fn with_range_key(mut self, range_key: KeyAttribute) -> Self {
        self.range_key = Some(range_key);
        self
    }

    /// Add an indexed attribute.
    pub fn with_index(mut self, index: KeyAttribute) -> Self {
        self.indexes.push(index);
        self
    }

    /// Check whether `name` is part of the primary key.
    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.hash_key.name == name
            || self
                .range_key
                .as_ref()
                .map_or(false, |range| range.name == name)
    }

    /// Names of the primary key attributes, hash key first.
    pub fn key_names(&self) -> Vec<&str> {
        let mut names = vec![self.hash_key.name.as_str()];
        if let Some(range) = &self.range_key {
            names.push(range.name.as_str());
        }
        names
    }

    /// Extract the typed primary key values from an item or key map.
    ///
    /// Returns `(hash, range)`. Fails if a key attribute is missing or has
    /// the wrong type.
    pub fn extract_key(
        &self,
        attrs: &Item,
    ) -> StoreResult<(AttributeValue, Option<AttributeValue>)> {
        let hash = self.typed(&self.hash_key, attrs)?;
        let range = match &self.range_key {
            Some(range_key) => Some(self.typed(range_key, attrs)?),
            None => None,
        };
        Ok((hash, range))
    }

    /// Like [`extract_key`](Self::extract_key), but the map must hold the key
    /// attributes and nothing else.
    pub fn extract_exact_key(
        &self,
        key: &Item,
    ) -> StoreResult<(AttributeValue, Option<AttributeValue>)> {
        let expected = self.key_names().len();
        if key.len() != expected {
            return Err(StoreError::InvalidRequest(format!(
                "key for {} must have exactly {} attribute(s), got [{}]",
                self.table_name,
                expected,
                render_key(key)
            )));
        }
        self.extract_key(key)
    }

    fn typed(&self, attr: &KeyAttribute, attrs: &Item) -> StoreResult<AttributeValue> {
        match attrs.get(&attr.name) {
            Some(value) if attr.key_type.matches(value) => Ok(value.clone()),
            Some(value) => Err(StoreError::InvalidRequest(format!(
                "key attribute {} of {} must be {:?}, got {}",
                attr.name,
                self.table_name,
                attr.key_type,
                value.type_tag()
            ))),
            None => Err(StoreError::InvalidRequest(format!(
                "missing key attribute {} for {}",
                attr.name, self.table_name
            ))),
        }
    }
}
