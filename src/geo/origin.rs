//! Per-location UTM origins.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// UTM coordinates of the local origin of one map location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapOrigin {
    /// UTM zone number (1-60).
    pub zone_number: u8,

    /// UTM latitude band letter (C-X, without I and O).
    pub zone_letter: char,

    /// Easting of the local origin, in metres.
    pub easting: f64,

    /// Northing of the local origin, in metres.
    pub northing: f64,
}

impl MapOrigin {
    /// Creates an origin, rejecting zones the inverse projection cannot handle.
    pub fn new(
        zone_number: u8,
        zone_letter: char,
        easting: f64,
        northing: f64,
    ) -> Result<Self, ExportError> {
        let origin = Self {
            zone_number,
            zone_letter: zone_letter.to_ascii_uppercase(),
            easting,
            northing,
        };
        origin.validate()?;
        Ok(origin)
    }

    /// Checks the zone number and letter.
    pub fn validate(&self) -> Result<(), ExportError> {
        let letter = self.zone_letter.to_ascii_uppercase();
        let letter_ok = ('C'..='X').contains(&letter) && letter != 'I' && letter != 'O';
        if !(1..=60).contains(&self.zone_number) || !letter_ok {
            return Err(ExportError::InvalidZone {
                number: self.zone_number,
                letter: self.zone_letter,
            });
        }
        Ok(())
    }

    /// Bands N and above lie in the northern hemisphere.
    #[inline]
    pub fn is_northern(&self) -> bool {
        self.zone_letter.to_ascii_uppercase() >= 'N'
    }
}

/// Origins of the locations shipped with the dataset.
pub const BUILTIN_LOCATIONS: [(&str, MapOrigin); 4] = [
    (
        "singapore-onenorth",
        MapOrigin {
            zone_number: 48,
            zone_letter: 'N',
            easting: 364802.37,
            northing: 142396.09,
        },
    ),
    (
        "singapore-queenstown",
        MapOrigin {
            zone_number: 48,
            zone_letter: 'N',
            easting: 362863.68,
            northing: 141305.52,
        },
    ),
    (
        "singapore-hollandvillage",
        MapOrigin {
            zone_number: 48,
            zone_letter: 'N',
            easting: 364510.57,
            northing: 143641.40,
        },
    ),
    (
        "boston-seaport",
        MapOrigin {
            zone_number: 19,
            zone_letter: 'T',
            easting: 330510.68,
            northing: 4689209.05,
        },
    ),
];

/// Lookup of map origins by location name.
///
/// Starts from [`BUILTIN_LOCATIONS`]; a YAML file may add locations or
/// override built-in ones:
///
/// ```yaml
/// my-test-track:
///   zone_number: 32
///   zone_letter: U
///   easting: 691000.0
///   northing: 5335000.0
/// ```
#[derive(Clone, Debug)]
pub struct OriginTable {
    entries: BTreeMap<String, MapOrigin>,
}

impl Default for OriginTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OriginTable {
    /// The built-in locations only.
    pub fn builtin() -> Self {
        let entries = BUILTIN_LOCATIONS
            .iter()
            .map(|(name, origin)| (name.to_string(), *origin))
            .collect();
        Self { entries }
    }

    /// Adds or overrides locations.
    ///
    /// Every origin is validated first; on error the table is unchanged.
    pub fn extend<I>(&mut self, origins: I) -> Result<(), ExportError>
    where
        I: IntoIterator<Item = (String, MapOrigin)>,
    {
        let origins = origins
            .into_iter()
            .map(|(name, origin)| {
                let MapOrigin {
                    zone_number,
                    zone_letter,
                    easting,
                    northing,
                } = origin;
                MapOrigin::new(zone_number, zone_letter, easting, northing)
                    .map(|origin| (name, origin))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.entries.extend(origins);
        Ok(())
    }

    /// Merges origins from a YAML file.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), ExportError> {
        let yaml = fs::read_to_string(path).map_err(ExportError::Io)?;
        let parsed = parse_yaml(&yaml).map_err(|source| ExportError::OriginsParse {
            path: path.to_path_buf(),
            source,
        })?;
        self.extend(parsed)
    }

    /// Returns the origin of `name`, failing for unknown locations.
    pub fn get(&self, name: &str) -> Result<MapOrigin, ExportError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| ExportError::UnknownLocation(name.to_string()))
    }

    /// Location names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn parse_yaml(yaml: &str) -> Result<BTreeMap<String, MapOrigin>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
