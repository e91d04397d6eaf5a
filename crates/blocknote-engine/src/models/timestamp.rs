use chrono::{FixedOffset, Local, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Wire and display format of every block timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format written by older notes, still accepted on load
const LEGACY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Wall-clock time with second resolution in the session's fixed zone.
///
/// Stored zone-less: the zone is applied once by the [`Clock`] that
/// produced the value, so ordering and equality are plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Build from a naive local time, dropping sub-second precision
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    /// Parse `YYYY-MM-DD HH:mm:ss`, falling back to the legacy
    /// `DD/MM/YYYY, HH:mm:ss` form
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        let s = s.trim();
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, LEGACY_TIMESTAMP_FORMAT))
            .map(Self::from_naive)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Copy shifted by a number of seconds (negative moves backwards)
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        Self(self.0 + TimeDelta::seconds(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}"))
        })
    }
}

/// Source of "now" for block creation and modification times
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Reads the system clock, either in the machine's local zone or in a
/// fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Fixed zone `minutes` east of UTC. `None` if the offset is out of
    /// range (more than a day either way).
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self {
            offset: Some(offset),
        })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let naive = match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        };
        Timestamp::from_naive(naive)
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.set(self.now.get().plus_seconds(seconds));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
