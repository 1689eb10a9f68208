use clap::ValueEnum;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use review_collector_models::Review;
use serde_json::json;

/// Longest review text shown in the human summary
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&message_document("success", msg.as_ref()));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&message_document("error", msg.as_ref()));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&message_document("info", msg.as_ref()));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&message_document("warning", msg.as_ref()));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    /// Print collected reviews: a readable summary, or the records themselves in JSON modes
    pub fn reviews(&self, reviews: &[Review]) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{}", render_summary(reviews));
                if !reviews.is_empty() {
                    println!("\n{}", overview_table(reviews));
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "reviews", "count": reviews.len(), "reviews": reviews }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }
}

/// The JSON line emitted for a status message
fn message_document(kind: &str, message: &str) -> serde_json::Value {
    json!({ "type": kind, "message": message })
}

/// One block per review, text cut at `PREVIEW_CHARS` characters
pub fn render_summary(reviews: &[Review]) -> String {
    let mut out = format!("\nScraped {} reviews:\n{}", reviews.len(), "-".repeat(50));
    for (i, review) in reviews.iter().enumerate() {
        out.push_str(&format!(
            "\n\n{}. Author: {}\n   Rating: {}/5 stars\n   Date: {}\n   Author Info: {}\n   Photos: {}\n   Review: {}",
            i + 1,
            review.author,
            review.rating,
            review.date,
            review.author_info,
            review.photos_count,
            preview(&review.review_text, PREVIEW_CHARS),
        ));
    }
    out
}

/// Compact one-row-per-review table shown after the summary blocks
pub fn overview_table(reviews: &[Review]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["#", "Review ID", "Author", "Rating", "Date", "Photos"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(comfy_table::Attribute::Bold)),
    );
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    for (i, review) in reviews.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&review.review_id),
            Cell::new(&review.author),
            Cell::new(format!("{}/5", review.rating)),
            Cell::new(&review.date),
            Cell::new(review.photos_count),
        ]);
    }
    table
}

fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
