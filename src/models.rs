use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One multi-sensor snapshot produced per monitoring tick.
///
/// Every field is either a valid measurement or an explicit sentinel;
/// a partial sensor failure never drops the whole Reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub tick: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub motion_detected: bool,
    pub distance: Distance,
    pub climate: Climate,
}

/// Result of one ultrasonic ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "meters", rename_all = "snake_case")]
pub enum Distance {
    Measured(f64),
    OutOfRange,
    Timeout,
}

/// Combined temperature/humidity reading. The sensor returns both values
/// together or fails as a unit, never a partial pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Climate {
    Measured {
        temperature_c: f32,
        humidity_percent: f32,
    },
    SensorError,
}

/// Outcome of an authentication attempt as persisted for audit.
///
/// The two rejection sub-cases are distinguished only here, never in the
/// outward behavior seen by the card presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthResult {
    Accepted,
    RejectedUnknown,
    RejectedMalformed,
}

/// Audit record for one authentication attempt. Carries the credential
/// hash only; the raw card ID is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub credential_hash: String,
    pub outcome: AuthResult,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// One line of the append-only persistence log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Reading(Reading),
    Auth(AuthRecord),
}

/// Control loop state. The only defined transition is
/// WaitingAuth -> Monitoring on an accepted credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    WaitingAuth,
    Monitoring,
}
