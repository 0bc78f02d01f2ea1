/// Ultrasonic ranging: one trigger/echo cycle converted to meters.
use log::{debug, warn};
use tokio::time::{sleep, timeout, Duration, Instant};

use crate::models::Distance;
use crate::sensors::interface::{SensorFault, SensorInterface};

// HC-SR04 class sensor characteristics
const SPEED_OF_SOUND_M_PER_S: f64 = 343.0; // room temperature, no compensation
const MIN_RANGE_M: f64 = 0.02;
const MAX_RANGE_M: f64 = 4.5;

// Max-range round trip is ~26 ms; 100 ms gives generous margin while
// keeping the tick bounded. 60 ms lets the transducer settle between
// cycles so a late echo from the previous pulse is not misread.
const ECHO_WAIT_WINDOW: Duration = Duration::from_millis(100);
const SETTLE_INTERVAL: Duration = Duration::from_millis(60);

/// Drives independent trigger/echo cycles. The only state carried
/// between calls is the minimum inter-call spacing.
pub struct DistanceRanger {
    last_trigger: Option<Instant>,
}

impl DistanceRanger {
    pub fn new() -> Self {
        DistanceRanger { last_trigger: None }
    }

    /// Run one ranging cycle. Never blocks past the echo wait window:
    /// a silent echo line yields `Timeout`, a reading outside the
    /// sensor's physical range yields `OutOfRange`.
    pub async fn measure<I: SensorInterface>(&mut self, iface: &I) -> Distance {
        if let Some(last) = self.last_trigger {
            let since = last.elapsed();
            if since < SETTLE_INTERVAL {
                sleep(SETTLE_INTERVAL - since).await;
            }
        }
        self.last_trigger = Some(Instant::now());

        // The driver is expected to bound its own wait, but the outer
        // timeout guarantees the tick cannot stall on a bad driver.
        let pulse = match timeout(ECHO_WAIT_WINDOW, iface.trigger_echo()).await {
            Ok(Ok(pulse)) => pulse,
            Ok(Err(SensorFault::Timeout)) => {
                warn!("Distance sensor timeout waiting for echo");
                return Distance::Timeout;
            }
            Ok(Err(fault)) => {
                warn!("Distance sensor transaction {}", fault);
                return Distance::Timeout;
            }
            Err(_) => {
                warn!("Distance sensor exceeded echo wait window");
                return Distance::Timeout;
            }
        };

        let round_trip = pulse.gap().as_secs_f64();
        let distance = round_trip * SPEED_OF_SOUND_M_PER_S / 2.0;

        if (MIN_RANGE_M..=MAX_RANGE_M).contains(&distance) {
            debug!("Distance measured: {:.3} m", distance);
            Distance::Measured(distance)
        } else {
            warn!("Distance out of range: {:.3} m", distance);
            Distance::OutOfRange
        }
    }
}
