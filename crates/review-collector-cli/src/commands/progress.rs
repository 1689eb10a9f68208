use crate::output::{Output, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a long step runs. Falls back to a log line when the
/// terminal is not interactive or output is machine-readable.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, output: &Output) -> Self {
        let message = message.into();

        if output.is_quiet() || output.format() != OutputFormat::Human || !is_interactive() {
            tracing::info!(operation = "progress", message = %message, "Progress update");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn finish(self, message: impl Into<String>) {
        if let Some(bar) = self.bar {
            bar.finish_with_message(message.into());
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
