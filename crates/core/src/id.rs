use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU32, Ordering},
        OnceLock,
    },
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ID_LEN: usize = 12;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Store-assigned identifier of a job post.
///
/// Twelve bytes rendered as 24 lowercase hex characters: a big-endian
/// creation timestamp (seconds), five bytes unique to this process and a
/// three byte wrapping counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct JobPostId([u8; ID_LEN]);

impl JobPostId {
    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generates an identifier stamped with `now`.
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>()))
            .fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&(now.timestamp() as u32).to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Seconds since the Unix epoch embedded in the identifier.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for JobPostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for JobPostId {
    type Err = InvalidJobPostId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != ID_LEN * 2 {
            return Err(InvalidJobPostId(value.to_string()));
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| InvalidJobPostId(value.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<JobPostId> for String {
    fn from(value: JobPostId) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for JobPostId {
    type Error = InvalidJobPostId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Raised when a value cannot be interpreted as a [`JobPostId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cast to id failed for value \"{0}\": expected a 24 character hex string")]
pub struct InvalidJobPostId(pub String);
