pub mod aeronet;
pub mod discovery;
pub mod metadata;
pub mod netcdf;
pub mod types;

pub use aeronet::{AeronetReader, AeronetStations};
pub use discovery::find_grid_files;
pub use metadata::StationRepository;
pub use netcdf::NetcdfGridReader;
pub use types::{GridFile, GridSource, ReadError, StationLookup, StationRecord, StationSource};
