//! Core types for step logs.
//!
//! This module defines the data model shared by every backend:
//! - [`StepId`]: Identifier of the pipeline step that owns a log
//! - [`LogEntry`]: One persisted line of step output
//! - [`LogEntryType`]: The stream a line came from

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Seconds since the Unix epoch (or since step start, for [`LogEntry::time`]).
pub type Timestamp = i64;

/// Identifier of a pipeline step.
///
/// Steps are numbered by the orchestrator. The store uses the bare number
/// as the file name of the step's log, so `Display` prints only the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(i64);

impl StepId {
    /// Create a StepId from its numeric value.
    pub const fn new(id: i64) -> Self {
        StepId(id)
    }

    /// Get the numeric value.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for StepId {
    fn from(id: i64) -> Self {
        StepId(id)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of stream a log line came from.
///
/// Encoded on disk as its integer tag. String tags are accepted on read so
/// files written by tools that spell the kind out still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LogEntryType {
    /// Standard output of the step.
    #[default]
    Stdout = 0,
    /// Standard error of the step.
    Stderr = 1,
    /// Exit code marker written when the step ends.
    ExitCode = 2,
    /// Metadata emitted by the runner.
    Metadata = 3,
    /// Progress report.
    Progress = 4,
}

impl LogEntryType {
    /// All kinds, in tag order.
    pub const ALL: [LogEntryType; 5] = [
        LogEntryType::Stdout,
        LogEntryType::Stderr,
        LogEntryType::ExitCode,
        LogEntryType::Metadata,
        LogEntryType::Progress,
    ];

    /// Integer tag used on disk.
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// String tag accepted on read.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEntryType::Stdout => "stdout",
            LogEntryType::Stderr => "stderr",
            LogEntryType::ExitCode => "exit-code",
            LogEntryType::Metadata => "metadata",
            LogEntryType::Progress => "progress",
        }
    }

    /// Look up a kind by integer tag.
    pub fn from_tag(tag: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| u64::from(kind.tag()) == tag)
    }

    /// Look up a kind by string tag.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for LogEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogEntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.tag())
    }
}

impl<'de> Deserialize<'de> for LogEntryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = LogEntryType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a log entry type tag (0-4) or name")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                LogEntryType::from_tag(v)
                    .ok_or_else(|| E::custom(format!("unknown log entry type tag {}", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(LogEntryType::from_tag)
                    .ok_or_else(|| E::custom(format!("unknown log entry type tag {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                LogEntryType::from_name(v)
                    .ok_or_else(|| E::custom(format!("unknown log entry type {:?}", v)))
            }
        }

        deserializer.deserialize_any(TagVisitor)
    }
}

/// One line of step output.
///
/// The store persists entries exactly as given. It does not assign `id`,
/// and it does not check that `line` or `time` increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry identifier assigned by the caller.
    pub id: i64,
    /// Step that owns this line.
    pub step_id: StepId,
    /// Seconds into the step's execution.
    pub time: Timestamp,
    /// Sequence number of the line within the step's output.
    pub line: i64,
    /// Raw payload.
    #[serde(with = "crate::codec::base64_bytes", default)]
    pub data: Vec<u8>,
    /// Wall-clock time the entry was recorded.
    pub created: Timestamp,
    /// Stream the line came from.
    #[serde(rename = "type")]
    pub entry_type: LogEntryType,
}

impl LogEntry {
    /// Create an entry stamped with the current wall-clock time.
    ///
    /// `id` and `time` start at zero; set them with [`LogEntry::with_id`]
    /// and [`LogEntry::with_time`].
    pub fn new(
        step_id: StepId,
        line: i64,
        entry_type: LogEntryType,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        LogEntry {
            id: 0,
            step_id,
            time: 0,
            line,
            data: data.into(),
            created: chrono::Utc::now().timestamp(),
            entry_type,
        }
    }

    /// Set the entry identifier.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set the step-relative time.
    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    /// Set the creation time.
    pub fn with_created(mut self, created: Timestamp) -> Self {
        self.created = created;
        self
    }

    /// Payload as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}
