//! GPX document writer.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};

use super::osm::xml_escape;
use crate::error::ExportError;
use crate::geo::LatLon;

const GPX_ROOT: &str = concat!(
    "<gpx xmlns=\"http://www.topografix.com/GPX/1/1\"",
    " xmlns:gpxx=\"http://www.garmin.com/xmlschemas/GpxExtensions/v3\"",
    " xmlns:gpxtpx=\"http://www.garmin.com/xmlschemas/TrackPointExtension/v1\"",
    " creator=\"nuscenes-osm\" version=\"1.1\"",
    " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"",
    " xsi:schemaLocation=\"http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd",
    " http://www.garmin.com/xmlschemas/GpxExtensions/v3 http://www.garmin.com/xmlschemas/GpxExtensionsv3.xsd",
    " http://www.garmin.com/xmlschemas/TrackPointExtension/v1 http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd\">",
);

/// One track point, already projected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GpxPoint {
    pub position: LatLon,
    pub time: DateTime<Utc>,
}

/// Number of tracks and points written to a GPX document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GpxCounts {
    pub tracks: usize,
    pub points: usize,
}

/// Streams tracks as a GPX 1.1 document.
pub struct GpxWriter<W: Write> {
    out: W,
    counts: GpxCounts,
}

impl<W: Write> GpxWriter<W> {
    pub fn begin(mut out: W) -> io::Result<Self> {
        writeln!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>"
        )?;
        writeln!(out, "{GPX_ROOT}")?;
        Ok(Self {
            out,
            counts: GpxCounts::default(),
        })
    }

    /// Writes one `trk` with a single segment.
    pub fn track(&mut self, name: &str, points: &[GpxPoint]) -> io::Result<()> {
        self.counts.tracks += 1;
        self.counts.points += points.len();

        writeln!(self.out, "  <trk>")?;
        writeln!(self.out, "    <name>{}</name>", xml_escape(name))?;
        writeln!(self.out, "    <trkseg>")?;
        for point in points {
            writeln!(
                self.out,
                "      <trkpt lat=\"{:.7}\" lon=\"{:.7}\">",
                point.position.lat, point.position.lon
            )?;
            writeln!(
                self.out,
                "        <time>{}</time>",
                point.time.to_rfc3339_opts(SecondsFormat::Micros, true)
            )?;
            writeln!(self.out, "      </trkpt>")?;
        }
        writeln!(self.out, "    </trkseg>")?;
        writeln!(self.out, "  </trk>")
    }

    pub fn finish(mut self) -> io::Result<(W, GpxCounts)> {
        writeln!(self.out, "</gpx>")?;
        self.out.flush()?;
        Ok((self.out, self.counts))
    }
}

/// Converts a dataset timestamp (microseconds since the Unix epoch).
pub fn timestamp_to_utc(micros: i64) -> Result<DateTime<Utc>, ExportError> {
    DateTime::from_timestamp_micros(micros).ok_or(ExportError::InvalidTimestamp(micros))
}
