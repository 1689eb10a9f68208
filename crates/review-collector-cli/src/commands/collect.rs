use super::progress::Spinner;
use super::{load_config, resolve_format, SaveFormat};
use crate::export::write_reviews;
use crate::output::Output;
use clap::Args;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use review_collector_sources::{ReviewCollector, SourceRegistry};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Place page to collect reviews from (e.g. a Google Maps place URL)
    pub url: String,

    /// Stop after this many unique reviews (defaults to collector.max_reviews)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub max_reviews: Option<usize>,

    /// Where to save the reviews (defaults to output.path from the config)
    #[arg(long, value_name = "PATH", conflicts_with = "no_save")]
    pub save: Option<PathBuf>,

    /// Save format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<SaveFormat>,

    /// Print the reviews without writing a file
    #[arg(long)]
    pub no_save: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Review source to use instead of detecting it from the URL
    #[arg(long, value_name = "NAME")]
    pub source: Option<String>,
}

pub async fn run_collect(args: CollectArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    tracing::debug!(url = %args.url, "Collect command started");

    let (mut config, path_manager) = load_config(config_path)?;
    if args.headed {
        config.browser.headless = false;
    }

    let max_reviews = args.max_reviews.unwrap_or(config.collector.max_reviews);
    if max_reviews == 0 {
        return Err(eyre!("--max-reviews must be at least 1"));
    }

    let registry = SourceRegistry::new(&config, &path_manager);
    let source = match args.source.as_deref() {
        Some(name) => registry.by_name(name).map_err(|e| eyre!("{}", e))?,
        None => match registry.for_url(&args.url) {
            Some(source) => source,
            None => {
                output.warn(format!("No review source recognises {}, trying google_maps", args.url));
                registry.by_name("google_maps").map_err(|e| eyre!("{}", e))?
            }
        },
    };

    let collector = ReviewCollector::new(source);
    let spinner = Spinner::start(
        format!("Collecting up to {} reviews via {}", max_reviews, collector.source_name()),
        output,
    );
    let result = collector.collect(&args.url, max_reviews).await;
    spinner.finish("Collection finished");

    let reviews = result.wrap_err("Review collection could not start")?;
    if reviews.is_empty() {
        output.warn("No reviews collected");
    }
    output.reviews(&reviews);

    if args.no_save {
        return Ok(());
    }

    let path = args.save.unwrap_or_else(|| config.output.path.clone());
    let format = resolve_format(args.format.map(Into::into), &path, config.output.format);
    write_reviews(&path, &reviews, format).map_err(|e| eyre!("{:#}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(format!("Reviews saved to '{}'", path.display()));
        }
        _ => output.json(&json!({
            "type": "saved",
            "path": path.display().to_string(),
            "count": reviews.len(),
        })),
    }
    Ok(())
}
