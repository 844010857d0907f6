use anyhow::{Context, Result};
use libris_exchange::config::LoggingConfig;
use twyg::{LogLevel, OptsBuilder};

/// Install twyg as the `log` backend.
pub fn setup(config: &LoggingConfig) -> Result<()> {
    let opts = OptsBuilder::new()
        .coloured(config.coloured)
        .level(parse_level(&config.level)?)
        .build()
        .context("Failed to build logging options")?;
    twyg::setup(opts).context("Failed to set up logging")?;
    Ok(())
}

fn parse_level(level: &str) -> Result<LogLevel> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        other => anyhow::bail!(
            "Unknown log level: {}\n\nValid levels: error, warn, info, debug, trace",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert!(matches!(parse_level("WARN"), Ok(LogLevel::Warn)));
        assert!(matches!(parse_level("debug"), Ok(LogLevel::Debug)));
        assert!(parse_level("loud").is_err());
    }
}
