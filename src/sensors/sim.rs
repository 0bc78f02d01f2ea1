/// Simulated hardware backend for mock mode.
///
/// Stands in for the GPIO drivers on development machines, producing
/// plausible fixed readings and a canned card presentation.
use log::info;
use tokio::time::{sleep, Duration};

use crate::sensors::interface::{CardReader, EchoPulse, SensorFault, SensorInterface};

const SIM_CARD_ID: &str = "01020304";
const SIM_PRESENTATION_DELAY: Duration = Duration::from_secs(2);

pub struct SimulatedHardware {
    pub motion: bool,
    pub distance_m: f64,
    pub temperature_c: f32,
    pub humidity_percent: f32,
}

impl SimulatedHardware {
    pub fn new() -> Self {
        SimulatedHardware {
            motion: false,
            distance_m: 1.0,
            temperature_c: 21.5,
            humidity_percent: 40.0,
        }
    }
}

impl SensorInterface for SimulatedHardware {
    async fn read_motion(&self) -> Result<bool, SensorFault> {
        Ok(self.motion)
    }

    async fn trigger_echo(&self) -> Result<EchoPulse, SensorFault> {
        // Echo gap that converts back to the configured distance
        let gap = Duration::from_secs_f64(2.0 * self.distance_m / 343.0);
        Ok(EchoPulse {
            rise: Duration::from_micros(450),
            fall: Duration::from_micros(450) + gap,
        })
    }

    async fn read_temp_humidity(&self) -> Result<(f32, f32), SensorFault> {
        Ok((self.temperature_c, self.humidity_percent))
    }
}

/// Presents a fixed card ID after a short delay, mirroring a user
/// tapping a card a moment after the prompt appears.
pub struct SimulatedCardReader {
    card_id: String,
    presented: bool,
}

impl SimulatedCardReader {
    pub fn new() -> Self {
        SimulatedCardReader {
            card_id: SIM_CARD_ID.to_string(),
            presented: false,
        }
    }

    pub fn with_card(card_id: &str) -> Self {
        SimulatedCardReader {
            card_id: card_id.to_string(),
            presented: false,
        }
    }
}

impl CardReader for SimulatedCardReader {
    async fn wait_for_presentation(&mut self) -> Result<String, SensorFault> {
        if !self.presented {
            info!("Mock mode: simulating card presentation");
            sleep(SIM_PRESENTATION_DELAY).await;
            self.presented = true;
            return Ok(self.card_id.clone());
        }
        // A real reader would keep seeing taps; one canned card is
        // enough for the simulated session.
        std::future::pending().await
    }
}
