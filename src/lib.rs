pub mod channels;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod readers;
pub mod series;
pub mod site;
pub mod site_analysis;
pub mod sink;
pub mod stats;
pub mod variability;
pub mod visualisation;

use tracing_subscriber::{EnvFilter, fmt};

pub use error::{AnalysisError, Result};
pub use site_analysis::{SiteAnalysisOrchestrator, SiteResult};

/// Initializes tracing from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();
}
