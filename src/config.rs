use std::collections::HashSet;
use std::env;

// Raspberry Pi header exposes GPIO 2-27 for general use
const GPIO_MIN: u8 = 2;
const GPIO_MAX: u8 = 27;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub motion_pin: u8,
    pub trigger_pin: u8,
    pub echo_pin: u8,
    pub temp_humidity_pin: u8,
    pub reading_interval_ms: u64,
    pub history_capacity: usize,
    pub data_log_path: String,
    pub authorized_hashes: HashSet<String>,
    pub card_timeout_secs: u64,
    pub mock_mode: bool,
}

impl MonitorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let config = MonitorConfig {
            motion_pin: env_or("MOTION_SENSOR_PIN", 18)?,
            trigger_pin: env_or("ULTRASONIC_TRIGGER_PIN", 23)?,
            echo_pin: env_or("ULTRASONIC_ECHO_PIN", 24)?,
            temp_humidity_pin: env_or("TEMP_HUMIDITY_PIN", 4)?,
            reading_interval_ms: env_or("READING_INTERVAL_MS", 1000)?,
            history_capacity: env_or("HISTORY_CAPACITY", 10)?,
            data_log_path: env::var("DATA_LOG_PATH")
                .unwrap_or_else(|_| "sensor_data.jsonl".to_string()),
            authorized_hashes: parse_hash_list(
                &env::var("AUTHORIZED_CARD_HASHES").map_err(|_| {
                    "AUTHORIZED_CARD_HASHES environment variable not set. \
                     Provide a comma-separated list of SHA-256 hex digests"
                })?,
            )?,
            card_timeout_secs: env_or("CARD_DETECTION_TIMEOUT_SECS", 30)?,
            mock_mode: env::var("SENSOR_MOCK_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work: duplicate or out-of-range
    /// pins, a zero tick interval, an empty history.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let pins = [
            self.motion_pin,
            self.trigger_pin,
            self.echo_pin,
            self.temp_humidity_pin,
        ];

        let distinct: HashSet<u8> = pins.iter().copied().collect();
        if distinct.len() != pins.len() {
            return Err("Duplicate GPIO pin assignments detected".into());
        }

        for pin in pins {
            if !(GPIO_MIN..=GPIO_MAX).contains(&pin) {
                return Err(format!("Invalid GPIO pin number: {}", pin).into());
            }
        }

        if self.reading_interval_ms == 0 {
            return Err("READING_INTERVAL_MS must be greater than zero".into());
        }

        if self.history_capacity == 0 {
            return Err("HISTORY_CAPACITY must be greater than zero".into());
        }

        Ok(())
    }
}

/// Read an environment variable, falling back to a default when unset.
/// An unparseable value is an error rather than a silent fallback.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| format!("Invalid value for {}: '{}'", key, value).into()),
        Err(_) => Ok(default),
    }
}

/// Parse the comma-separated authorized hash list into a lookup set.
///
/// Digests are normalized to lowercase; anything that is not a 64-char
/// hex string is rejected at startup rather than failing lookups later.
pub fn parse_hash_list(raw: &str) -> Result<HashSet<String>, Box<dyn std::error::Error>> {
    let mut hashes = HashSet::new();

    for entry in raw.split(',') {
        let entry = entry.trim().to_lowercase();
        if entry.is_empty() {
            continue;
        }
        if entry.len() != 64 || !entry.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "Invalid credential hash '{}': expected 64 hex characters",
                entry
            )
            .into());
        }
        hashes.insert(entry);
    }

    if hashes.is_empty() {
        return Err("No authorized credential hashes configured".into());
    }

    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HASH: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn base_config() -> MonitorConfig {
        MonitorConfig {
            motion_pin: 18,
            trigger_pin: 23,
            echo_pin: 24,
            temp_humidity_pin: 4,
            reading_interval_ms: 1000,
            history_capacity: 10,
            data_log_path: "sensor_data.jsonl".to_string(),
            authorized_hashes: HashSet::from([SAMPLE_HASH.to_string()]),
            card_timeout_secs: 30,
            mock_mode: true,
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn duplicate_pins_rejected() {
        let mut config = base_config();
        config.echo_pin = config.trigger_pin;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_pin_rejected() {
        let mut config = base_config();
        config.motion_pin = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = base_config();
        config.reading_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn hash_list_parses_and_normalizes() {
        let raw = format!(" {} , {}", SAMPLE_HASH.to_uppercase(), SAMPLE_HASH);
        let hashes = parse_hash_list(&raw).unwrap();
        assert_eq!(hashes.len(), 1);
        assert!(hashes.contains(SAMPLE_HASH));
    }

    #[test]
    fn malformed_hash_rejected() {
        assert!(parse_hash_list("not-a-hash").is_err());
        assert!(parse_hash_list("").is_err());
        assert!(parse_hash_list(&SAMPLE_HASH[..32]).is_err());
    }
}
