use anyhow::{Context, Result};
use review_collector_config::ExportFormat;
use review_collector_models::Review;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const CSV_HEADER: [&str; 8] = [
    "review_id",
    "author",
    "author_info",
    "rating",
    "date",
    "review_text",
    "photos_count",
    "has_photos",
];

/// Save reviews to `path`, creating parent directories as needed
pub fn write_reviews(path: &Path, reviews: &[Review], format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Json => write_json(&mut writer, reviews)?,
        ExportFormat::Csv => write_csv(&mut writer, reviews)?,
    }
    writer.flush()?;

    info!(path = %path.display(), count = reviews.len(), format = ?format, "Reviews saved");
    Ok(())
}

/// One top-level array, two-space indentation, non-ASCII left as is
pub fn write_json<W: Write>(mut writer: W, reviews: &[Review]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, reviews)?;
    writeln!(writer)?;
    Ok(())
}

/// Header row plus one row per review; the header is written even when empty
pub fn write_csv<W: Write>(writer: W, reviews: &[Review]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for review in reviews {
        csv_writer.serialize(review)?;
    }
    csv_writer.flush()?;
    Ok(())
}
