use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::site_analysis::SiteResult;

/// Destination for finished site results.
pub trait ResultSink {
    fn store(&self, result: &SiteResult) -> Result<()>;
}

/// Writes `<dir>/<site>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, site_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", site_name))
    }
}

fn sink_error(path: &Path, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Sink(format!("{}: {}", path.display(), e))
}

impl ResultSink for JsonFileSink {
    fn store(&self, result: &SiteResult) -> Result<()> {
        create_dir_all(&self.dir).map_err(|e| sink_error(&self.dir, e))?;

        let path = self.path_for(result.site_name());
        let file = File::create(&path).map_err(|e| sink_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, result).map_err(|e| sink_error(&path, e))?;
        writer.flush().map_err(|e| sink_error(&path, e))?;

        info!(path = %path.display(), "results written");
        Ok(())
    }
}
