//! Unique identifier generation

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::{Uuid, Variant};

/// Source of the uuid part of record identifiers.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Next identifier: lowercase 8-4-4-4-12 hex
    fn next_id(&self) -> String;
}

/// Random version 4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Replays a fixed list of ids, cycling when exhausted.
///
/// Used to force identifier collisions.
#[derive(Debug)]
pub struct FixedIds {
    ids: Vec<String>,
    next: AtomicUsize,
}

impl FixedIds {
    /// Always hand out `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
            next: AtomicUsize::new(0),
        }
    }

    /// Hand out `ids` in order. `None` if empty.
    pub fn sequence<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return None;
        }
        Some(Self {
            ids,
            next: AtomicUsize::new(0),
        })
    }
}

impl IdGenerator for FixedIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        self.ids[n % self.ids.len()].clone()
    }
}

/// Check for a lowercase hyphenated version 4 UUID.
pub fn is_uuid_format(s: &str) -> bool {
    if s.len() != 36 || s.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match Uuid::parse_str(s) {
        Ok(id) => id.get_version_num() == 4 && id.get_variant() == Variant::RFC4122,
        Err(_) => false,
    }
}
