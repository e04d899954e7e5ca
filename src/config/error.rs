use thiserror::Error;

use crate::channels::Wavelength;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lag_min ({min}) must be lower than lag_max ({max})")]
    LagRange { min: i64, max: i64 },

    #[error("{requested} nm is not a gridded channel, closest is {closest} nm")]
    GridChannel {
        requested: Wavelength,
        closest: Wavelength,
    },
}
