//! Logging setup
//!
//! The crate logs through the standard `log` macros. Applications that have no
//! logger of their own can install an `env_logger` backend configured from
//! [`LoggingConfig`]:
//!
//! ```rust,no_run
//! use rampart_core::config::RampartConfig;
//!
//! let config = RampartConfig::load()?;
//! rampart_core::logging::init_logging(&config.logging)?;
//! log::info!("rampart ready");
//! # Ok::<(), rampart_core::RampartError>(())
//! ```

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the logger once; later calls only validate `config`
///
/// A logger installed elsewhere in the process is left in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.level_filter()?;
    let format = config.format;

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);

        match format {
            LogFormat::Text => {
                builder.format_timestamp_millis().format_module_path(false);
            }
            LogFormat::Json => {
                builder.format(|buf, record| {
                    let line = json_line(record.level(), record.target(), &record.args().to_string(), Utc::now());
                    writeln!(buf, "{}", line)
                });
            }
        }

        // try_init: another logger may already be installed
        let _ = builder.try_init();
    });
    Ok(())
}

fn json_line(level: log::Level, target: &str, message: &str, at: DateTime<Utc>) -> String {
    serde_json::json!({
        "timestamp": at.to_rfc3339(),
        "level": level.as_str(),
        "target": target,
        "message": message,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line() {
        let at = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z").unwrap().with_timezone(&Utc);
        let line = json_line(log::Level::Warn, "rampart::audit", "denied \"edit\"", at);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "rampart::audit");
        assert_eq!(value["message"], "denied \"edit\"");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-01-15T10:30:00"));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        let config = LoggingConfig { level: "loud".to_string(), format: LogFormat::Json };
        assert!(init_logging(&config).is_err());
    }
}
