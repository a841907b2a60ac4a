//! Attribute decoding for record reconstruction

use crate::error::{RecordError, RecordResult};
use whimbrel_core::{AttributeValue, Item};
use whimbrel_engine::{parse_item_time_list, Timestamp};

/// Typed view over a stored item. Every decoding failure is a
/// [`RecordError::CorruptRecord`] naming the table and attribute.
pub(crate) struct Fields<'a> {
    table: &'a str,
    item: &'a Item,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(table: &'a str, item: &'a Item) -> Self {
        Self { table, item }
    }

    fn get(&self, name: &str) -> RecordResult<&'a AttributeValue> {
        self.item
            .get(name)
            .ok_or_else(|| RecordError::corrupt(self.table, format!("missing attribute {}", name)))
    }

    fn wrong_type(&self, name: &str, expected: &str, found: &AttributeValue) -> RecordError {
        RecordError::corrupt(
            self.table,
            format!("attribute {} must be {}, got {}", name, expected, found.type_tag()),
        )
    }

    pub(crate) fn string(&self, name: &str) -> RecordResult<&'a str> {
        let value = self.get(name)?;
        value.as_s().ok_or_else(|| self.wrong_type(name, "S", value))
    }

    /// Absent or `NULL` decode as `None`.
    pub(crate) fn optional_string(&self, name: &str) -> RecordResult<Option<&'a str>> {
        match self.item.get(name) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(value) => value
                .as_s()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "S or NULL", value)),
        }
    }

    pub(crate) fn number(&self, name: &str) -> RecordResult<i64> {
        let value = self.get(name)?;
        value.as_i64().ok_or_else(|| self.wrong_type(name, "N", value))
    }

    pub(crate) fn boolean(&self, name: &str) -> RecordResult<bool> {
        let value = self.get(name)?;
        value.as_bool().ok_or_else(|| self.wrong_type(name, "BOOL", value))
    }

    /// Absent or `NULL` decode as `None`.
    pub(crate) fn optional_boolean(&self, name: &str) -> RecordResult<Option<bool>> {
        match self.item.get(name) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.wrong_type(name, "BOOL or NULL", value)),
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.item.get(name).is_some_and(|value| !value.is_null())
    }

    /// Epoch attribute in whole seconds, with no calendar list beside it.
    pub(crate) fn epoch_seconds(&self, name: &str) -> RecordResult<Timestamp> {
        let seconds = self.number(name)?;
        seconds
            .checked_mul(1000)
            .and_then(Timestamp::from_epoch_millis)
            .ok_or_else(|| {
                RecordError::corrupt(self.table, format!("attribute {} is out of range", name))
            })
    }

    /// Epoch attribute plus its calendar list.
    pub(crate) fn timestamp(&self, epoch_name: &str, list_name: &str) -> RecordResult<Timestamp> {
        let epoch = self.number(epoch_name)?;
        let list = self.get(list_name)?;
        let parts = parse_item_time_list(list).ok_or_else(|| {
            RecordError::corrupt(
                self.table,
                format!("attribute {} must be a list of six numbers", list_name),
            )
        })?;
        Ok(Timestamp::from_parts(epoch, parts))
    }

    /// Check that a key attribute holds the value that was asked for.
    pub(crate) fn expect_key(&self, name: &str, requested: &str) -> RecordResult<()> {
        let stored = self.string(name)?;
        if stored != requested {
            return Err(RecordError::corrupt(
                self.table,
                format!("{} is {:?}, requested {:?}", name, stored, requested),
            ));
        }
        Ok(())
    }
}
