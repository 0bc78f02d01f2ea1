use log::{error, info};
use tokio::time::Duration;

use sensor_gate::auth::{AuthGate, CredentialStore};
use sensor_gate::config::MonitorConfig;
use sensor_gate::control::ControlLoop;
use sensor_gate::sensors::sim::{SimulatedCardReader, SimulatedHardware};
use sensor_gate::sensors::SensorHub;
use sensor_gate::storage::PersistenceLog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    info!(
        "Pin assignments: motion={}, trigger={}, echo={}, climate={}; \
         tick interval {} ms, card detection window {} s",
        config.motion_pin,
        config.trigger_pin,
        config.echo_pin,
        config.temp_humidity_pin,
        config.reading_interval_ms,
        config.card_timeout_secs,
    );

    // Wire the hardware seam. GPIO/NFC drivers are external; this build
    // ships the simulated backend only, and refusing to start without it
    // is the fatal hardware-initialization path.
    if !config.mock_mode {
        let msg = "No GPIO driver backend is wired into this build. \
                   Set SENSOR_MOCK_MODE=true or link a hardware backend \
                   implementing the sensor interface";
        error!("{}", msg);
        return Err(msg.into());
    }
    info!("Mock mode: using simulated hardware backend");

    let log = match PersistenceLog::open(&config.data_log_path).await {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to open persistence log: {}", e);
            return Err(e);
        }
    };

    let store = CredentialStore::new(config.authorized_hashes.clone());
    info!("Loaded {} authorized credential hashes", store.len());

    // The display collaborator reads latest/history through this handle;
    // nothing in the headless binary consumes it.
    let (control, _display) = ControlLoop::new(
        AuthGate::new(store),
        SimulatedCardReader::new(),
        SensorHub::new(SimulatedHardware::new()),
        log,
        Duration::from_millis(config.reading_interval_ms),
        config.history_capacity,
    );

    // Handle Ctrl+C gracefully
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(());
        }
    });

    println!("Present your card to start monitoring...");
    control
        .run(rx)
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    info!("Program completed successfully");
    Ok(())
}
