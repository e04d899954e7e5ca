pub mod contour;
pub mod spatial;
pub mod temporal;

pub use spatial::{
    ContourPolygon, CorrelationField, OUTER_LEVEL, SpatialVariability, SpatialVariabilityEngine,
};
pub use temporal::{TemporalOutcome, TemporalVariabilityEngine};
