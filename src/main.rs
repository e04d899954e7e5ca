use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use aodvar::SiteAnalysisOrchestrator;
use aodvar::config::{Config, Season};
use aodvar::visualisation::figure_spec;

/// Spatiotemporal variability of aerosol optical depth around a station
#[derive(Parser, Debug)]
#[command(name = "aodvar")]
struct Args {
    /// AERONET site name
    #[arg(default_value = "Tamanrasset_TMP")]
    site: String,

    /// Season restricting the gridded months (ALL, DJF, MAM, JJA, SON)
    #[arg(short, long, default_value = "ALL")]
    season: Season,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    dump_json: bool,

    /// Write the plotly figure description to this path
    #[arg(long)]
    figure: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    aodvar::init_logging();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let orchestrator = SiteAnalysisOrchestrator::from_config(&config)?;
    let result = orchestrator.determine_variability_at_site(&args.site, args.season, true)?;

    match result.analysis() {
        Some(analysis) => info!(
            site = result.site_name(),
            months = analysis.num_of_matched_months,
            contours = analysis.contours.len(),
            temporal = analysis.temporal_corr.is_available(),
            "analysis complete"
        ),
        None => warn!(site = result.site_name(), "analysis did not succeed"),
    }

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if let Some(path) = &args.figure {
        match figure_spec(&result) {
            Some(figure) => {
                fs::write(path, serde_json::to_vec(&figure)?)?;
                info!(path = %path.display(), "figure written");
            }
            None => warn!("no figure for a failed analysis"),
        }
    }

    Ok(())
}
