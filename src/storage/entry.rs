//! Entries and Expiry
//!
//! An entry pairs a shared value with an absolute expiry time.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::ByteValue;

/// Absolute expiry time of an entry.
///
/// The default is [`Expiry::Never`]. An entry with `At(t)` is expired once
/// the current time is at or after `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiry {
    #[default]
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    /// Expire `ttl` from now, saturating at the latest representable time
    pub fn after(ttl: Duration) -> Self {
        let at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::At(at)
    }

    /// Build from unix seconds, where `0` means never. Out-of-range times
    /// saturate to the earliest or latest representable time.
    pub fn from_unix(secs: i64) -> Self {
        if secs == 0 {
            return Self::Never;
        }
        let at = DateTime::from_timestamp(secs, 0).unwrap_or(if secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        Self::At(at)
    }

    /// Unix seconds, `0` for never
    pub fn as_unix(&self) -> i64 {
        match self {
            Self::Never => 0,
            Self::At(at) => at.timestamp(),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Check expiry against a caller-supplied clock
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => false,
            Self::At(at) => now >= *at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<Option<DateTime<Utc>>> for Expiry {
    fn from(at: Option<DateTime<Utc>>) -> Self {
        at.map(Self::At).unwrap_or(Self::Never)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::At(at) => write!(f, "{}", at.to_rfc3339()),
        }
    }
}

/// A stored value with its expiry
#[derive(Clone)]
pub struct Entry {
    value: Arc<dyn ByteValue>,
    expiry: Expiry,
}

impl Entry {
    pub fn new(value: Arc<dyn ByteValue>, expiry: Expiry) -> Self {
        Self { value, expiry }
    }

    /// Shared handle to the stored value
    pub fn value(&self) -> &Arc<dyn ByteValue> {
        &self.value
    }

    pub fn into_value(self) -> Arc<dyn ByteValue> {
        self.value
    }

    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Contents of the stored value
    pub fn bytes(&self) -> &[u8] {
        self.value.as_bytes()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_expired_at(now)
    }

    pub fn is_expired(&self) -> bool {
        self.expiry.is_expired()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("len", &self.value.as_bytes().len())
            .field("expiry", &self.expiry)
            .finish()
    }
}
