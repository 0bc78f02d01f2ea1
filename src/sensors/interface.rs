/// Hardware seam: abstract contracts the control loop consumes.
///
/// Wire-level GPIO/USB drivers live behind these traits; the core never
/// touches pins directly. The simulated backend in `sim` implements them
/// for mock mode and tests.
use std::fmt;
use tokio::time::Duration;

/// Echo line timing for one ultrasonic cycle, as offsets from the
/// trigger pulse: when the echo line rose and when it fell.
#[derive(Debug, Clone, Copy)]
pub struct EchoPulse {
    pub rise: Duration,
    pub fall: Duration,
}

impl EchoPulse {
    /// Round-trip time of the sound pulse.
    pub fn gap(&self) -> Duration {
        self.fall.saturating_sub(self.rise)
    }
}

/// Failure of a single hardware transaction. Local to one read; never
/// escalated past the Reading it degrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorFault {
    /// The device did not respond within its bounded wait window.
    Timeout,
    /// The transaction failed outright (bus error, bad checksum, ...).
    Failed(String),
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorFault::Timeout => write!(f, "timed out"),
            SensorFault::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

impl std::error::Error for SensorFault {}

/// The three sensor lines the hub polls. Every method carries its own
/// bounded wait; implementations must not block indefinitely.
pub trait SensorInterface {
    /// Instantaneous PIR motion state.
    fn read_motion(&self) -> impl std::future::Future<Output = Result<bool, SensorFault>>;

    /// Fire one trigger pulse and time the echo line.
    fn trigger_echo(&self) -> impl std::future::Future<Output = Result<EchoPulse, SensorFault>>;

    /// One combined temperature (°C) / humidity (%) transaction.
    fn read_temp_humidity(
        &self,
    ) -> impl std::future::Future<Output = Result<(f32, f32), SensorFault>>;
}

/// Credential reader, used only while waiting for authentication.
pub trait CardReader {
    /// Suspend until a card is presented and return its raw ID.
    /// Implementations time out per their configured detection window;
    /// the caller simply waits again.
    fn wait_for_presentation(
        &mut self,
    ) -> impl std::future::Future<Output = Result<String, SensorFault>>;
}
