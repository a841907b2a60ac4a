//! Timestamps
//!
//! Records carry each timestamp twice: as epoch milliseconds (sortable,
//! indexable) and as a list of UTC calendar fields
//! `[year, month0, day, hour, minute, second]` with a zero-based month.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use whimbrel_core::AttributeValue;

/// A point in time in both record encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    epoch_millis: i64,
    parts: [i64; 6],
}

impl Timestamp {
    /// Current time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Encode a UTC datetime
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            epoch_millis: dt.timestamp_millis(),
            parts: [
                i64::from(dt.year()),
                i64::from(dt.month0()),
                i64::from(dt.day()),
                i64::from(dt.hour()),
                i64::from(dt.minute()),
                i64::from(dt.second()),
            ],
        }
    }

    /// Encode epoch milliseconds. `None` if out of chrono's range.
    pub fn from_epoch_millis(epoch_millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(epoch_millis)
            .single()
            .map(Self::from_datetime)
    }

    /// Rebuild from stored fields without cross-checking them.
    pub fn from_parts(epoch_millis: i64, parts: [i64; 6]) -> Self {
        Self {
            epoch_millis,
            parts,
        }
    }

    /// Milliseconds since the Unix epoch
    pub fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    /// `[year, month0, day, hour, minute, second]`
    pub fn parts(&self) -> [i64; 6] {
        self.parts
    }

    /// The epoch as a numeric attribute
    pub fn epoch_attribute(&self) -> AttributeValue {
        AttributeValue::n(self.epoch_millis)
    }

    /// The calendar fields as a list attribute
    pub fn list_attribute(&self) -> AttributeValue {
        mk_item_time_list(self.parts)
    }
}

/// Encode calendar fields as a list of six numbers.
pub fn mk_item_time_list(parts: [i64; 6]) -> AttributeValue {
    AttributeValue::L(parts.iter().map(|p| AttributeValue::n(*p)).collect())
}

/// Decode a list written by [`mk_item_time_list`].
///
/// `None` unless the value is a list of exactly six integers.
pub fn parse_item_time_list(value: &AttributeValue) -> Option<[i64; 6]> {
    let list = value.as_list()?;
    if list.len() != 6 {
        return None;
    }
    let mut parts = [0i64; 6];
    for (slot, item) in parts.iter_mut().zip(list) {
        *slot = item.as_i64()?;
    }
    Some(parts)
}
