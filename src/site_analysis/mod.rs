pub mod result;

pub use result::{SiteAnalysis, SiteResult, threshold_key};

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::channels::Wavelength;
use crate::config::{Config, Season};
use crate::error::{AnalysisError, Result};
use crate::grid::AodStack;
use crate::readers::{
    AeronetReader, AeronetStations, GridFile, GridSource, NetcdfGridReader, StationLookup,
    StationRepository, StationSource,
};
use crate::sink::{JsonFileSink, ResultSink};
use crate::site::Site;
use crate::variability::{SpatialVariabilityEngine, TemporalVariabilityEngine};

const DEFAULT_GRID_WAVELENGTH: Wavelength = 469;

/// Runs the spatial and temporal analyses for one site.
pub struct SiteAnalysisOrchestrator {
    stations: Box<dyn StationSource>,
    grids: Box<dyn GridSource>,
    sink: Option<Box<dyn ResultSink>>,
    spatial: SpatialVariabilityEngine,
    temporal: TemporalVariabilityEngine,
    grid_wavelength: Wavelength,
}

/// Reference series at the site and the grid stack, concatenated over the
/// selected months.
struct GridPairing {
    reference: Vec<f64>,
    stack: AodStack,
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl SiteAnalysisOrchestrator {
    pub fn new(stations: Box<dyn StationSource>, grids: Box<dyn GridSource>) -> Self {
        Self {
            stations,
            grids,
            sink: None,
            spatial: SpatialVariabilityEngine::default(),
            temporal: TemporalVariabilityEngine::default(),
            grid_wavelength: DEFAULT_GRID_WAVELENGTH,
        }
    }

    /// Wires the file-backed station, grid and result adapters described by
    /// a configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let repository = StationRepository::from_csv(config.metadata_path())?;
        let stations = AeronetStations::new(repository, AeronetReader::new(config.station_dir()));
        let grids = NetcdfGridReader::with_channels(config.grid_dir(), &[config.grid_wavelength()])?;

        Ok(Self::new(Box::new(stations), Box::new(grids))
            .with_sink(Box::new(JsonFileSink::new(config.results_dir())))
            .with_temporal(TemporalVariabilityEngine::new(config.lags()))
            .with_grid_wavelength(config.grid_wavelength()))
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_spatial(mut self, spatial: SpatialVariabilityEngine) -> Self {
        self.spatial = spatial;
        self
    }

    pub fn with_temporal(mut self, temporal: TemporalVariabilityEngine) -> Self {
        self.temporal = temporal;
        self
    }

    pub fn with_grid_wavelength(mut self, wavelength: Wavelength) -> Self {
        self.grid_wavelength = wavelength;
        self
    }

    /// Determines the spatiotemporal variability at a site.
    ///
    /// Missing station data or grid files yield a result with
    /// `success: false`. Errors are reserved for inconsistent inputs and
    /// unreadable files.
    pub fn determine_variability_at_site(
        &self,
        site_name: &str,
        season: Season,
        persist: bool,
    ) -> Result<SiteResult> {
        info!(site = site_name, %season, "processing site");

        let matched = self.grids.discover(site_name)?;
        if matched.is_empty() {
            warn!(site = site_name, "unable to find any corresponding grid files");
            return Ok(SiteResult::failure(site_name));
        }

        let record = match self.stations.lookup(site_name)? {
            StationLookup::Found(record) if !record.is_empty() => record,
            _ => {
                warn!(site = site_name, "unable to find any corresponding station observation");
                return Ok(SiteResult::failure(site_name));
            }
        };

        let selected = select_by_season(matched, season);
        if selected.is_empty() {
            warn!(site = site_name, %season, "no grid files left after season selection");
            return Ok(SiteResult::failure(site_name));
        }

        info!(months = selected.len(), "determining spatial variability");
        let pairing = self.pair_with_grid(&selected, &record.site)?;
        let spatial = self.spatial.analyse(
            &pairing.reference,
            &pairing.stack,
            &pairing.lons,
            &pairing.lats,
            &record.site,
        )?;

        // Uses the full station record, whatever the season
        info!("determining temporal variability");
        let temporal = self.temporal.analyse(&record.channels);

        let contours = spatial
            .contours
            .into_iter()
            .map(|c| (threshold_key(c.threshold), c))
            .collect();

        let result = SiteResult::success(
            site_name,
            SiteAnalysis {
                site_lon: record.site.lon(),
                site_lat: record.site.lat(),
                season,
                num_of_matched_months: selected.len(),
                grid_wavelength: self.grid_wavelength,
                spatial_corr: spatial.field.r_rows(),
                p_vals: spatial.field.p_rows(),
                longitudes: pairing.lons,
                latitudes: pairing.lats,
                contours,
                temporal_corr: temporal,
            },
        );

        if persist {
            match &self.sink {
                Some(sink) => sink.store(&result)?,
                None => warn!("persistence requested but no result sink is configured"),
            }
        }

        Ok(result)
    }

    fn pair_with_grid(
        &self,
        selected: &BTreeMap<String, GridFile>,
        site: &Site,
    ) -> Result<GridPairing> {
        let mut pairing: Option<GridPairing> = None;

        for file in selected.values() {
            let grid = self.grids.load(&file.path)?;
            let reference = grid.timeseries_at(self.grid_wavelength, site.lon(), site.lat())?;
            let stack = grid.stack(self.grid_wavelength)?;

            match pairing.as_mut() {
                None => {
                    pairing = Some(GridPairing {
                        reference,
                        stack: stack.clone(),
                        lons: grid.lons().to_vec(),
                        lats: grid.lats().to_vec(),
                    });
                }
                Some(p) => {
                    if p.lons != grid.lons() || p.lats != grid.lats() {
                        return Err(AnalysisError::InconsistentGrid {
                            path: file.path.display().to_string(),
                        });
                    }
                    p.reference.extend(reference);
                    p.stack.append(stack)?;
                }
            }
        }

        // `selected` is never empty here
        pairing.ok_or(AnalysisError::StackShape {
            expected: 1,
            found: 0,
        })
    }
}

/// Keeps the files whose month falls in `season`, keyed by `YYYYMM`. A later
/// file for an already selected month replaces the earlier one.
pub fn select_by_season(files: Vec<GridFile>, season: Season) -> BTreeMap<String, GridFile> {
    files
        .into_iter()
        .filter(|f| season.includes(f.month))
        .map(|f| (f.year_month(), f))
        .collect()
}
