//! Inverse UTM projection and the per-map [`Projector`].
//!
//! The series itself comes from the `utm` crate. Its northing range is
//! relaxed here: a point just across the equator from its zone's hemisphere
//! is read against the other hemisphere's false northing, so local map
//! frames that straddle the envelope still yield a coordinate.

use serde::{Deserialize, Serialize};

use super::origin::MapOrigin;
use crate::error::ExportError;

const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A WGS84 position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Creates a new position.
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Converts UTM easting/northing to latitude/longitude.
///
/// The zone is validated first. Northings a little outside the hemisphere
/// of `zone_letter` are accepted.
pub fn utm_to_lat_lon(
    easting: f64,
    northing: f64,
    zone_number: u8,
    zone_letter: char,
) -> Result<LatLon, ExportError> {
    let origin = MapOrigin::new(zone_number, zone_letter, 0.0, 0.0)?;
    inverse_utm(easting, northing, origin.zone_number, origin.is_northern())
}

fn inverse_utm(
    easting: f64,
    northing: f64,
    zone_number: u8,
    northern: bool,
) -> Result<LatLon, ExportError> {
    // Only the hemisphere of the band letter matters to the series.
    let (band, utm_northing) = match (northern, northing) {
        (true, n) if n < 0.0 => ('M', n + FALSE_NORTHING_SOUTH),
        (false, n) if n > FALSE_NORTHING_SOUTH => ('N', n - FALSE_NORTHING_SOUTH),
        (true, n) => ('N', n),
        (false, n) => ('M', n),
    };

    let (lat, lon) = utm::wsg84_utm_to_lat_lon(easting, utm_northing, zone_number, band)
        .map_err(|err| ExportError::OutOfProjectionRange {
            easting,
            northing,
            zone: zone_number,
            reason: format!("{err:?}"),
        })?;
    let latlon = LatLon::new(lat, lon);
    if !latlon.is_finite() {
        return Err(ExportError::OutOfProjectionRange {
            easting,
            northing,
            zone: zone_number,
            reason: "non-finite result".to_string(),
        });
    }
    Ok(latlon)
}

/// Projects local map coordinates of one location to latitude/longitude.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    origin: MapOrigin,
}

impl Projector {
    /// Creates a projector for an already validated origin.
    pub fn new(origin: MapOrigin) -> Self {
        Self { origin }
    }

    /// The origin this projector offsets from.
    pub fn origin(&self) -> &MapOrigin {
        &self.origin
    }

    /// Projects a local `(x, y)` in metres.
    pub fn project(&self, x: f64, y: f64) -> Result<LatLon, ExportError> {
        inverse_utm(
            x + self.origin.easting,
            y + self.origin.northing,
            self.origin.zone_number,
            self.origin.is_northern(),
        )
    }
}
