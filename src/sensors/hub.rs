/// Multi-sensor polling: one Reading per tick, each source fault-isolated.
use log::{debug, warn};
use time::OffsetDateTime;
use tokio::time::{timeout, Duration};

use crate::models::{Climate, Reading};
use crate::sensors::interface::SensorInterface;
use crate::sensors::ranger::DistanceRanger;

// Per-source wait windows. The PIR line is an instantaneous level read;
// the AM2302 transaction can run several hundred ms including retries.
const MOTION_WAIT_WINDOW: Duration = Duration::from_millis(50);
const CLIMATE_WAIT_WINDOW: Duration = Duration::from_millis(1000);

// AM2302 plausible output range; values outside are a failed transaction
const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 80.0;
const HUMIDITY_MIN_PCT: f32 = 0.0;
const HUMIDITY_MAX_PCT: f32 = 100.0;

/// Owns the three sensor sources and polls them concurrently. A failure
/// or timeout in one source degrades only its own field of the Reading.
pub struct SensorHub<I: SensorInterface> {
    iface: I,
    ranger: DistanceRanger,
    ticks: u64,
}

impl<I: SensorInterface> SensorHub<I> {
    pub fn new(iface: I) -> Self {
        SensorHub {
            iface,
            ranger: DistanceRanger::new(),
            ticks: 0,
        }
    }

    /// Poll all three sources and assemble one Reading. The three reads
    /// run concurrently and each carries its own bounded wait, so total
    /// poll latency is bounded by the slowest window, never unbounded.
    pub async fn poll_once(&mut self) -> Reading {
        self.ticks += 1;
        let tick = self.ticks;

        let iface = &self.iface;
        let ranger = &mut self.ranger;

        let (motion, distance, climate) = tokio::join!(
            timeout(MOTION_WAIT_WINDOW, iface.read_motion()),
            ranger.measure(iface),
            timeout(CLIMATE_WAIT_WINDOW, iface.read_temp_humidity()),
        );

        let motion_detected = match motion {
            Ok(Ok(state)) => state,
            Ok(Err(fault)) => {
                warn!("Motion sensor {}", fault);
                false
            }
            Err(_) => {
                warn!("Motion sensor exceeded wait window");
                false
            }
        };

        let climate = match climate {
            Ok(Ok((temperature_c, humidity_percent))) => {
                if (TEMP_MIN_C..=TEMP_MAX_C).contains(&temperature_c)
                    && (HUMIDITY_MIN_PCT..=HUMIDITY_MAX_PCT).contains(&humidity_percent)
                {
                    Climate::Measured {
                        temperature_c,
                        humidity_percent,
                    }
                } else {
                    warn!(
                        "Climate values out of range: {:.1}°C, {:.1}%",
                        temperature_c, humidity_percent
                    );
                    Climate::SensorError
                }
            }
            Ok(Err(fault)) => {
                warn!("Climate sensor {}", fault);
                Climate::SensorError
            }
            Err(_) => {
                warn!("Climate sensor exceeded wait window");
                Climate::SensorError
            }
        };

        let reading = Reading {
            tick,
            timestamp: OffsetDateTime::now_utc(),
            motion_detected,
            distance,
            climate,
        };

        debug!("Tick {} reading: {:?}", tick, reading);
        reading
    }
}
