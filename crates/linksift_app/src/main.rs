mod cli;
mod logging;
mod targets;

use anyhow::{Context, Result};
use clap::Parser;
use linksift_core::{harvest, summarize, HarvestResult};
use linksift_engine::{render_links, to_json, write_export, ExportFormat, ReqwestFetcher};
use linksift_logging::sift_info;
use log::LevelFilter;

use cli::Args;
use logging::LogDestination;
use targets::{LoadSettings, Target};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        linksift_logging::default_level()
    };
    logging::initialize(LogDestination::from_arg(args.log_file.as_deref()), level);

    let options = args.harvest_options()?;
    let targets: Vec<Target> = args.targets.iter().map(|raw| Target::classify(raw)).collect();
    let settings = LoadSettings {
        selector: &args.selector,
        base_url: args.base_url.as_deref(),
        frames: args.frames,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let fetcher = ReqwestFetcher::default();
    let loaded = runtime.block_on(targets::load(&targets, &fetcher, &settings))?;

    let result = harvest(&loaded.sources, &options).context("compiling regex filters")?;
    if let Some(stats) = &result.stats {
        sift_info!(
            "Kept {} of {} links ({} excluded)",
            stats.included,
            stats.total,
            stats.excluded
        );
    }

    let output = render(&args, &result, loaded.current_host)?;
    match &args.output {
        Some(path) => {
            let written = write_export(path, &output)
                .with_context(|| format!("writing {}", path.display()))?;
            sift_info!("Wrote {}", written.display());
        }
        None => println!("{output}"),
    }
    Ok(())
}

fn render(args: &Args, result: &HarvestResult, current_host: Option<String>) -> Result<String> {
    if args.metadata {
        let options = args.metadata_options(current_host);
        return Ok(to_json(&summarize(&result.links, &options))?);
    }
    if !args.with_excluded {
        return Ok(render_links(&result.links, args.format)?);
    }
    match args.format {
        ExportFormat::Json => Ok(to_json(result)?),
        format => {
            let mut out = render_links(&result.links, format)?;
            if let Some(excluded) = result.excluded.as_deref().filter(|e| !e.is_empty()) {
                out.push_str("\n\n");
                out.push_str(&render_links(excluded, format)?);
            }
            Ok(out)
        }
    }
}
