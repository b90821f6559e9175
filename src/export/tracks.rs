//! Track assembly: walks a scene's sample chain and groups every
//! observation by the entity it belongs to.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::dataset::{EgoPose, Sample, SampleAnnotation};
use crate::error::ExportError;

/// Name of the ego vehicle's track.
pub const EGO_VEHICLE: &str = "egovehicle";

/// Read access to a linked chain of samples.
///
/// `'d` is the lifetime of the underlying dataset; everything handed out
/// borrows from it, not from the chain itself.
pub trait SampleChain<'d> {
    fn sample(&self, token: &str) -> Result<&'d Sample, ExportError>;

    /// Ego pose recorded at `sample`.
    fn ego_pose(&self, sample: &Sample) -> Result<&'d EgoPose, ExportError>;

    /// Annotations of `sample`, in dataset order.
    fn annotations(&self, sample: &Sample) -> Result<Vec<&'d SampleAnnotation>, ExportError>;
}

/// Whether the last sample of a chain contributes track points.
///
/// The historical exporters stop as soon as a sample has no successor, so
/// the terminal sample is dropped and an N-sample chain yields N-1 points
/// per track. `Exclude` reproduces that output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminalSample {
    #[default]
    Exclude,
    Include,
}

/// Identity of a track.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKey {
    EgoVehicle,
    /// An annotated object, keyed by its instance token.
    Instance(String),
}

impl EntityKey {
    pub fn name(&self) -> &str {
        match self {
            Self::EgoVehicle => EGO_VEHICLE,
            Self::Instance(token) => token,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What was seen at one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Observation<'d> {
    Ego(&'d EgoPose),
    Annotation(&'d SampleAnnotation),
}

impl<'d> Observation<'d> {
    /// Token of the backing record.
    pub fn token(&self) -> &'d str {
        match self {
            Self::Ego(pose) => &pose.token,
            Self::Annotation(annotation) => &annotation.token,
        }
    }

    /// Position in local map metres.
    pub fn translation(&self) -> [f64; 3] {
        match self {
            Self::Ego(pose) => pose.translation,
            Self::Annotation(annotation) => annotation.translation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint<'d> {
    /// Sample timestamp, microseconds since the Unix epoch.
    pub timestamp: i64,
    pub observation: Observation<'d>,
}

/// Tracks in first-observation order; points within a track in chain order.
#[derive(Clone, Debug, Default)]
pub struct Tracks<'d> {
    tracks: IndexMap<EntityKey, Vec<TrackPoint<'d>>>,
}

impl<'d> Tracks<'d> {
    fn push(&mut self, key: EntityKey, point: TrackPoint<'d>) {
        self.tracks.entry(key).or_default().push(point);
    }

    pub fn get(&self, key: &EntityKey) -> Option<&[TrackPoint<'d>]> {
        self.tracks.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &[TrackPoint<'d>])> {
        self.tracks.iter().map(|(key, points)| (key, points.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.tracks.keys()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total number of points over all tracks.
    pub fn point_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }
}

/// Walks the chain from `head` and groups observations into tracks.
///
/// Each visited sample adds one ego point and one point per annotation,
/// keyed by the annotation's instance. A chain that loops back on itself
/// fails with [`ExportError::SampleCycle`].
pub fn assemble_tracks<'d, C>(
    chain: &C,
    head: &str,
    terminal: TerminalSample,
) -> Result<Tracks<'d>, ExportError>
where
    C: SampleChain<'d> + ?Sized,
{
    let mut tracks = Tracks::default();
    let mut visited = HashSet::new();
    let mut sample = chain.sample(head)?;

    loop {
        if !visited.insert(sample.token.as_str()) {
            return Err(ExportError::SampleCycle(sample.token.clone()));
        }

        let next = sample.next();
        if next.is_none() && terminal == TerminalSample::Exclude {
            break;
        }

        let timestamp = sample.timestamp;
        tracks.push(
            EntityKey::EgoVehicle,
            TrackPoint {
                timestamp,
                observation: Observation::Ego(chain.ego_pose(sample)?),
            },
        );
        for annotation in chain.annotations(sample)? {
            tracks.push(
                EntityKey::Instance(annotation.instance_token.clone()),
                TrackPoint {
                    timestamp,
                    observation: Observation::Annotation(annotation),
                },
            );
        }

        match next {
            Some(token) => sample = chain.sample(token)?,
            None => break,
        }
    }

    Ok(tracks)
}
