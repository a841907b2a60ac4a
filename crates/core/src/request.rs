//! Store request types
//!
//! One request struct per store operation, each with a small builder and a
//! `validate()` that rejects malformed parameters before dispatch. Validation
//! failures are reported as [`StoreError::InvalidRequest`], the same channel
//! as backend failures.

use crate::error::{StoreError, StoreResult};
use crate::value::{AttributeValue, Item};
use std::fmt;

// =============================================================================
// Condition
// =============================================================================

/// Predicate evaluated by the store against the existing item at write time.
///
/// The write is applied only if the predicate holds. A missing item behaves
/// like an item with no attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The attribute must not be present (used for create-once semantics)
    AttributeNotExists(String),
    /// The attribute must be present
    AttributeExists(String),
    /// The attribute must be present and equal to the value
    Equals {
        /// Attribute name
        attribute: String,
        /// Expected value
        value: AttributeValue,
    },
    /// Every inner condition must hold
    And(Vec<Condition>),
}

impl Condition {
    /// `attribute_not_exists(name)`
    pub fn attribute_not_exists(name: impl Into<String>) -> Self {
        Condition::AttributeNotExists(name.into())
    }

    /// `attribute_exists(name)`
    pub fn attribute_exists(name: impl Into<String>) -> Self {
        Condition::AttributeExists(name.into())
    }

    /// `name = value`
    pub fn equals(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Condition::Equals {
            attribute: name.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the currently stored item, if any.
    pub fn evaluate(&self, existing: Option<&Item>) -> bool {
        match self {
            Condition::AttributeNotExists(name) => {
                existing.map_or(true, |item| !item.contains_key(name))
            }
            Condition::AttributeExists(name) => {
                existing.map_or(false, |item| item.contains_key(name))
            }
            Condition::Equals { attribute, value } => existing
                .and_then(|item| item.get(attribute))
                .map_or(false, |stored| stored == value),
            Condition::And(conditions) => conditions.iter().all(|c| c.evaluate(existing)),
        }
    }

    /// All attribute names this condition refers to.
    pub fn attributes(&self) -> Vec<&str> {
        match self {
            Condition::AttributeNotExists(name) | Condition::AttributeExists(name) => {
                vec![name.as_str()]
            }
            Condition::Equals { attribute, .. } => vec![attribute.as_str()],
            Condition::And(conditions) => conditions.iter().flat_map(|c| c.attributes()).collect(),
        }
    }

    fn validate(&self) -> StoreResult<()> {
        if let Condition::And(conditions) = self {
            if conditions.is_empty() {
                return Err(StoreError::InvalidRequest("empty AND condition".into()));
            }
        }
        if self.attributes().iter().any(|name| name.is_empty()) {
            return Err(StoreError::InvalidRequest(
                "condition refers to an empty attribute name".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AttributeNotExists(name) => write!(f, "attribute_not_exists({})", name),
            Condition::AttributeExists(name) => write!(f, "attribute_exists({})", name),
            Condition::Equals { attribute, value } => write!(f, "{} = {}", attribute, value),
            Condition::And(conditions) => {
                write!(f, "(")?;
                for (i, c) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, ")")
            }
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

fn require_table(table_name: &str) -> StoreResult<()> {
    if table_name.is_empty() {
        return Err(StoreError::InvalidRequest("table name is empty".into()));
    }
    Ok(())
}

fn require_attributes(what: &str, attrs: &Item) -> StoreResult<()> {
    if attrs.is_empty() {
        return Err(StoreError::InvalidRequest(format!("{} is empty", what)));
    }
    if attrs.keys().any(|name| name.is_empty()) {
        return Err(StoreError::InvalidRequest(format!(
            "{} contains an empty attribute name",
            what
        )));
    }
    Ok(())
}

/// Render a key map deterministically for logs and error messages.
pub fn render_key(key: &Item) -> String {
    let mut parts: Vec<_> = key.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
    parts.sort();
    parts.join(", ")
}

/// Fetch one item by its exact key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    /// Physical table name
    pub table_name: String,
    /// Full primary key (hash key plus range key, if the table has one)
    pub key: Item,
}

impl GetItemRequest {
    /// Start a request against a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key: Item::new(),
        }
    }

    /// Add a key attribute.
    pub fn key(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    /// Reject malformed parameters.
    pub fn validate(&self) -> StoreResult<()> {
        require_table(&self.table_name)?;
        require_attributes("key", &self.key)
    }
}

/// Insert an item, optionally guarded by a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    /// Physical table name
    pub table_name: String,
    /// Full item, including key attributes
    pub item: Item,
    /// Guard evaluated against the existing item
    pub condition: Option<Condition>,
}

impl PutItemRequest {
    /// Start a request against a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            item: Item::new(),
            condition: None,
        }
    }

    /// Add an attribute to the item.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.item.insert(name.into(), value.into());
        self
    }

    /// Guard the write.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Reject malformed parameters.
    pub fn validate(&self) -> StoreResult<()> {
        require_table(&self.table_name)?;
        require_attributes("item", &self.item)?;
        if let Some(condition) = &self.condition {
            condition.validate()?;
        }
        Ok(())
    }
}

/// Set attributes on an item, optionally guarded by a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemRequest {
    /// Physical table name
    pub table_name: String,
    /// Full primary key
    pub key: Item,
    /// `SET name = value` clauses, applied in order
    pub set: Vec<(String, AttributeValue)>,
    /// Guard evaluated against the existing item
    pub condition: Option<Condition>,
}

impl UpdateItemRequest {
    /// Start a request against a table.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key: Item::new(),
            set: Vec::new(),
            condition: None,
        }
    }

    /// Add a key attribute.
    pub fn key(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    /// Add a `SET` clause.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set.push((name.into(), value.into()));
        self
    }

    /// Guard the write.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Reject malformed parameters.
    ///
    /// Key attributes can never be the target of a `SET`.
    pub fn validate(&self) -> StoreResult<()> {
        require_table(&self.table_name)?;
        require_attributes("key", &self.key)?;
        if self.set.is_empty() {
            return Err(StoreError::InvalidRequest("update sets no attributes".into()));
        }
        for (name, _) in &self.set {
            if name.is_empty() {
                return Err(StoreError::InvalidRequest(
                    "update sets an empty attribute name".into(),
                ));
            }
            if self.key.contains_key(name) {
                return Err(StoreError::InvalidRequest(format!(
                    "cannot update key attribute {}",
                    name
                )));
            }
        }
        if let Some(condition) = &self.condition {
            condition.validate()?;
        }
        Ok(())
    }

    /// Render the `SET` clauses as an update expression, for logs.
    pub fn update_expression(&self) -> String {
        let clauses: Vec<_> = self
            .set
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect();
        format!("SET {}", clauses.join(", "))
    }
}

/// Query all items sharing one partition (hash) key value.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Physical table name
    pub table_name: String,
    /// Hash key attribute name
    pub key_name: String,
    /// Hash key value
    pub key_value: AttributeValue,
    /// Maximum number of items to return
    pub limit: Option<usize>,
}

impl QueryRequest {
    /// Build a partition query.
    pub fn new(
        table_name: impl Into<String>,
        key_name: impl Into<String>,
        key_value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            key_name: key_name.into(),
            key_value: key_value.into(),
            limit: None,
        }
    }

    /// Cap the number of returned items.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject malformed parameters.
    pub fn validate(&self) -> StoreResult<()> {
        require_table(&self.table_name)?;
        if self.key_name.is_empty() {
            return Err(StoreError::InvalidRequest("query key name is empty".into()));
        }
        if self.limit == Some(0) {
            return Err(StoreError::InvalidRequest("query limit must be positive".into()));
        }
        Ok(())
    }
}

/// Items returned by a query, ordered by range key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Matching items
    pub items: Vec<Item>,
}

impl QueryOutput {
    /// Number of returned items.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}
