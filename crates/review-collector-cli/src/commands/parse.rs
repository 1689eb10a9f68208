use super::{load_config, resolve_format, SaveFormat};
use crate::export::write_reviews;
use crate::output::Output;
use clap::Args;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use review_collector_sources::{ReviewCollector, SourceRegistry};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Saved HTML page to read reviews from
    pub file: PathBuf,

    /// Also save the parsed reviews to this file
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Save format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<SaveFormat>,

    /// Review source whose markup the file contains
    #[arg(long, value_name = "NAME", default_value = "google_maps")]
    pub source: String,
}

pub fn run_parse(args: ParseArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let (config, path_manager) = load_config(config_path)?;

    let registry = SourceRegistry::new(&config, &path_manager);
    let source = registry.by_name(&args.source).map_err(|e| eyre!("{}", e))?;
    let collector = ReviewCollector::new(source);

    let reviews = collector
        .parse_html_file(&args.file)
        .wrap_err_with(|| format!("Could not parse {}", args.file.display()))?;

    output.info(format!("Found {} reviews in HTML file", reviews.len()));
    output.reviews(&reviews);

    if let Some(path) = args.save {
        let format = resolve_format(args.format.map(Into::into), &path, config.output.format);
        write_reviews(&path, &reviews, format).map_err(|e| eyre!("{:#}", e))?;
        output.success(format!("Reviews saved to '{}'", path.display()));
    }
    Ok(())
}
