//! JSON Lines encoding of step logs.
//!
//! A step's log file holds one JSON object per line, each terminated by
//! `\n`. There is no enclosing array. Blank lines are skipped on read.
//!
//! ```text
//! {"id":1,"step_id":7,"time":0,"line":0,"data":"aGVsbG8=","created":1700000000,"type":0}
//! {"id":2,"step_id":7,"time":1,"line":1,"data":"d29ybGQ=","created":1700000001,"type":1}
//! ```

use crate::error::{Error, Result};
use crate::types::LogEntry;

/// Serialize one entry as a JSON line, newline included.
pub fn encode_line(entry: &LogEntry) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec(entry).map_err(Error::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Append the JSON line for `entry` to `buf`.
///
/// Used to build a single write for a batch of entries.
pub fn encode_line_into(buf: &mut Vec<u8>, entry: &LogEntry) -> Result<()> {
    serde_json::to_writer(&mut *buf, entry).map_err(Error::Encode)?;
    buf.push(b'\n');
    Ok(())
}

/// Decode one line of a log file.
///
/// Returns `Ok(None)` for a line that is empty after trimming whitespace.
pub fn decode_line(line: &str) -> std::result::Result<Option<LogEntry>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Serde adapter storing byte payloads as standard base64 strings.
///
/// `null` decodes as an empty payload.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Encode bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Decode a base64 string (or null) into bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
