//! Tracking identifier value, encoding and validation.
//!
//! Layout (12 bytes, big-endian), rendered as 24 uppercase hex characters:
//!
//! ```text
//! offset 0-3   : timestamp, seconds since Unix epoch (32-bit)
//! offset 4-6   : machine fingerprint (24-bit)
//! offset 7-8   : process fingerprint (16-bit)
//! offset 9-11  : counter (24-bit, wraps)
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of raw bytes in a tracking identifier.
pub const ID_LEN: usize = 12;
/// Number of hex characters in the rendered form.
pub const HEX_LEN: usize = ID_LEN * 2;

pub(crate) const MASK_24: u32 = 0x00FF_FFFF;

/// Errors that can occur during tracking identifier operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingIdError {
    #[error("Invalid length: expected 24 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("Invalid tracking id format: {0}")]
    InvalidFormat(String),
    #[error("Invalid timestamp in tracking id")]
    InvalidTimestamp,
    #[error("Secure random source unavailable: {0}")]
    Entropy(getrandom::Error),
}

static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{24}$").unwrap());

/// A 12-byte, time-ordered tracking identifier.
///
/// Ordering follows the byte layout, so identifiers compare first by their
/// embedded timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackingId([u8; ID_LEN]);

impl TrackingId {
    /// Assemble an identifier from its four fields.
    ///
    /// `machine` and `counter` are truncated to their low 24 bits.
    pub fn from_parts(timestamp: i32, machine: u32, process: u16, counter: u32) -> Self {
        let mut bytes = [0u8; ID_LEN];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..7].copy_from_slice(&(machine & MASK_24).to_be_bytes()[1..]);
        bytes[7..9].copy_from_slice(&process.to_be_bytes());
        bytes[9..12].copy_from_slice(&(counter & MASK_24).to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; ID_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Embedded seconds since the Unix epoch, read as unsigned.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// 24-bit machine fingerprint.
    pub fn machine(&self) -> u32 {
        u32::from_be_bytes([0, self.0[4], self.0[5], self.0[6]])
    }

    /// 16-bit process fingerprint.
    pub fn process(&self) -> u16 {
        u16::from_be_bytes([self.0[7], self.0[8]])
    }

    /// 24-bit counter value.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Embedded timestamp as a UTC time.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::from(self.timestamp()), 0).single()
    }

    /// Uppercase hex rendering, 24 characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TrackingId {
    type Err = TrackingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN {
            return Err(TrackingIdError::InvalidLength(s.len()));
        }
        if !HEX_PATTERN.is_match(s) {
            return Err(TrackingIdError::InvalidFormat(s.to_string()));
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| TrackingIdError::InvalidFormat(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TrackingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TrackingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parsed tracking identifier components.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrackingId {
    pub raw: String,
    pub id: TrackingId,
    pub timestamp: DateTime<Utc>,
    pub machine: u32,
    pub process: u16,
    pub counter: u32,
}

impl ParsedTrackingId {
    /// Get Unix timestamp in seconds.
    pub fn timestamp_sec(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Validate a rendered tracking identifier.
pub fn validate_tracking_id(s: &str) -> bool {
    HEX_PATTERN.is_match(s)
}

/// Parse a rendered tracking identifier into its components.
pub fn parse_tracking_id(s: &str) -> Result<ParsedTrackingId, TrackingIdError> {
    let id: TrackingId = s.parse()?;
    let timestamp = id.datetime().ok_or(TrackingIdError::InvalidTimestamp)?;

    Ok(ParsedTrackingId {
        raw: s.to_string(),
        id,
        timestamp,
        machine: id.machine(),
        process: id.process(),
        counter: id.counter(),
    })
}
