use std::fmt::Display;

/// Wavelength in nanometres.
pub type Wavelength = u32;

/// Sentinel used by station files for a missing AOD value.
pub const MISSING_VALUE: f64 = -999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Aeronet,
    Cams,
}

#[derive(Debug)]
pub struct Channels {
    instrument: Instrument,
    wavelengths: &'static [Wavelength],
}

impl Channels {
    pub fn new(instrument: Instrument) -> Self {
        let wavelengths: &'static [Wavelength] = match instrument {
            // Candidates for the temporal analysis, in priority order
            Instrument::Aeronet => &[440, 443, 412, 400, 490],
            // Surface AOD variables provided by the reanalysis
            Instrument::Cams => &[469, 550, 670, 865, 1240],
        };
        Self {
            instrument,
            wavelengths,
        }
    }

    pub fn wavelengths(&self) -> &[Wavelength] {
        self.wavelengths
    }

    pub fn supports(&self, wavelength: Wavelength) -> bool {
        self.wavelengths.contains(&wavelength)
    }

    pub fn closest_band(&self, target: Wavelength) -> Wavelength {
        self.wavelengths
            .iter()
            .copied()
            .min_by_key(|w| (*w as i64 - target as i64).abs())
            .unwrap_or(target)
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instrument::Aeronet => write!(f, "AERONET"),
            Instrument::Cams => write!(f, "CAMS"),
        }
    }
}

impl Display for Channels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instrument: {}, Wavelengths: {:?}",
            self.instrument, self.wavelengths
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_channels() {
        let channels = Channels::new(Instrument::Cams);
        assert!(channels.supports(469));
        assert!(!channels.supports(440));
        assert_eq!(channels.closest_band(500), 469);
        assert_eq!(channels.closest_band(1020), 865);
    }

    #[test]
    fn test_station_priority_order() {
        let channels = Channels::new(Instrument::Aeronet);
        assert_eq!(channels.wavelengths(), &[440, 443, 412, 400, 490]);
    }
}
