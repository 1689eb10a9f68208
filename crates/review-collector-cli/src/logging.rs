use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives for the given verbosity
fn filter_for(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let default = match verbose_level {
        0 => "info",
        // chromiumoxide logs every CDP message it cannot decode at debug
        1 => "debug,chromiumoxide::conn=warn,chromiumoxide::handler=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// `RUST_LOG_JSON` wins when set; otherwise JSON whenever stdout is not a terminal
fn use_json(env_value: Option<&str>, stdout_is_terminal: bool) -> bool {
    match env_value {
        Some(value) => value == "true",
        None => !stdout_is_terminal,
    }
}

/// Rotation appends the date, so the extension is dropped from the prefix
fn rotation_prefix(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

pub fn init_logging(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = use_json(std::env::var("RUST_LOG_JSON").ok().as_deref(), io::stdout().is_terminal());

    let registry = Registry::default().with(filter_for(verbose_level, quiet));

    if let Some(log_path) = log_file {
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&log_dir)?;

        let log_filename = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
        let log_prefix = rotation_prefix(log_filename);

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, log_prefix);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);
            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);
            registry.with(fmt_layer).init();
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);
        registry.with(fmt_layer).init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_ignores_verbosity() {
        assert_eq!(filter_for(2, true).to_string(), "error");
    }

    #[test]
    fn test_json_follows_stdout_unless_overridden() {
        assert!(use_json(None, false));
        assert!(!use_json(None, true));
        assert!(use_json(Some("true"), true));
        assert!(!use_json(Some("false"), false));
    }

    #[test]
    fn test_rotation_prefix() {
        assert_eq!(rotation_prefix("review-collector.log"), "review-collector");
        assert_eq!(rotation_prefix("collector"), "collector");
        assert_eq!(rotation_prefix(".hidden"), ".hidden");
    }
}
