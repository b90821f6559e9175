//! Per-run export report.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::gpx::GpxCounts;
use super::osm::OsmCounts;

/// Element counts of one written document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum UnitStats {
    Osm {
        nodes: usize,
        ways: usize,
        relations: usize,
    },
    Gpx {
        tracks: usize,
        points: usize,
    },
}

impl From<OsmCounts> for UnitStats {
    fn from(counts: OsmCounts) -> Self {
        Self::Osm {
            nodes: counts.nodes,
            ways: counts.ways,
            relations: counts.relations,
        }
    }
}

impl From<GpxCounts> for UnitStats {
    fn from(counts: GpxCounts) -> Self {
        Self::Gpx {
            tracks: counts.tracks,
            points: counts.points,
        }
    }
}

impl fmt::Display for UnitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osm {
                nodes,
                ways,
                relations,
            } => write!(f, "{nodes} nodes, {ways} ways, {relations} relations"),
            Self::Gpx { tracks, points } => write!(f, "{tracks} tracks, {points} points"),
        }
    }
}

/// Result of one export unit (a map or a scene).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UnitOutcome {
    Written { path: PathBuf, stats: UnitStats },
    Failed { message: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnitReport {
    /// Map name or `scene <index>`.
    pub unit: String,
    pub outcome: UnitOutcome,
}

/// Everything a run produced, in unit order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExportReport {
    pub units: Vec<UnitReport>,
}

impl ExportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&mut self, unit: impl Into<String>, path: PathBuf, stats: UnitStats) {
        self.units.push(UnitReport {
            unit: unit.into(),
            outcome: UnitOutcome::Written { path, stats },
        });
    }

    pub fn failed(&mut self, unit: impl Into<String>, message: impl Into<String>) {
        self.units.push(UnitReport {
            unit: unit.into(),
            outcome: UnitOutcome::Failed {
                message: message.into(),
            },
        });
    }

    pub fn total(&self) -> usize {
        self.units.len()
    }

    pub fn failure_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Failed { .. }))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            match &unit.outcome {
                UnitOutcome::Written { path, stats } => {
                    writeln!(f, "  ok      {}: {} ({})", unit.unit, path.display(), stats)?
                }
                UnitOutcome::Failed { message } => {
                    writeln!(f, "  FAILED  {}: {}", unit.unit, message)?
                }
            }
        }

        let failed = self.failure_count();
        writeln!(
            f,
            "{} unit(s) exported, {} failed",
            self.total() - failed,
            failed
        )
    }
}
