//! Rail track geometry.
//!
//! A track is described symbolically as a chain of straights and curves, each
//! starting where the previous one ended. [`TrackBuilder`] turns that chain
//! into a dense polyline with one sample roughly every [`SEGMENT_LENGTH`]
//! world units, and [`Track::sample`] answers "where am I, and which way am I
//! facing, after travelling `d` units along the track".
mod builder;

use geom::{heading_dir, heading_of, lerp, v64, Pose, EPSILON};

pub use crate::builder::{BuildError, BuildErrorKind, TrackBuilder, MAX_SEGMENT_SAMPLES};

/// Target spacing between consecutive samples, in world units.
pub const SEGMENT_LENGTH: f64 = 1.0;

/// Track gauge used by the world renderer for the two rails.
pub const GAUGE: f64 = 1.435;

/// Width of the ballast strip under the rails.
pub const BALLAST_WIDTH: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    Straight { length: f64, gradient_permille: f64 },
    /// Positive `angle_deg` turns left, negative turns right.
    Curve { radius: f64, angle_deg: f64, gradient_permille: f64 },
}

/// One element of the symbolic track description, together with its own
/// sampled polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: Pose,
    pub end: Pose,
    pub horizontal_length: f64,
    pub line: u32,
    pub points: Vec<v64>,
    pub tangents: Vec<v64>,
}

/// The fully built track. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    start: Pose,
    segments: Vec<Segment>,
    points: Vec<v64>,
    tangents: Vec<v64>,
    cumulative_distance: Vec<f64>,
    total_length: f64,
}

/// Result of a track query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: v64,
    /// Unit length; carries the slope when the track has a gradient.
    pub tangent: v64,
}

impl SegmentKind {
    pub fn gradient_permille(&self) -> f64 {
        match *self {
            SegmentKind::Straight { gradient_permille, .. }
            | SegmentKind::Curve { gradient_permille, .. } => gradient_permille,
        }
    }
}

impl Sample {
    /// What an empty track answers with.
    pub const DEFAULT: Sample = Sample { position: v64::ZERO, tangent: v64::Z };

    pub fn heading(&self) -> f64 {
        heading_of(self.tangent)
    }
}

impl Default for Track {
    fn default() -> Track {
        Track::empty(Pose::default())
    }
}

impl Track {
    pub fn empty(start: Pose) -> Track {
        Track {
            start,
            segments: Vec::new(),
            points: Vec::new(),
            tangents: Vec::new(),
            cumulative_distance: Vec::new(),
            total_length: 0.0,
        }
    }

    pub(crate) fn from_segments(start: Pose, segments: Vec<Segment>) -> Track {
        let n_samples = segments.iter().map(|it| it.points.len()).sum();
        let mut points: Vec<v64> = Vec::with_capacity(n_samples);
        let mut tangents = Vec::with_capacity(n_samples);
        for segment in &segments {
            // The first sample of every segment repeats the last one of its
            // predecessor.
            let skip = if points.is_empty() { 0 } else { 1 };
            points.extend_from_slice(&segment.points[skip..]);
            tangents.extend_from_slice(&segment.tangents[skip..]);
        }

        let mut cumulative_distance = Vec::with_capacity(points.len());
        let mut total_length = 0.0;
        for (i, &p) in points.iter().enumerate() {
            if i > 0 {
                total_length += (p - points[i - 1]).norm();
            }
            cumulative_distance.push(total_length);
        }

        log::debug!(
            "built track: {} segments, {} samples, {:.2} wu",
            segments.len(),
            points.len(),
            total_length
        );
        Track { start, segments, points, tangents, cumulative_distance, total_length }
    }

    pub fn start(&self) -> Pose {
        self.start
    }
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
    pub fn points(&self) -> &[v64] {
        &self.points
    }
    pub fn tangents(&self) -> &[v64] {
        &self.tangents
    }
    pub fn cumulative_distance(&self) -> &[f64] {
        &self.cumulative_distance
    }
    pub fn total_length(&self) -> f64 {
        self.total_length
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position and tangent after `distance` units of travel, clamped to
    /// `[0, total_length]`.
    pub fn sample(&self, distance: f64) -> Sample {
        let n = self.points.len();
        match n {
            0 => return Sample::DEFAULT,
            1 => return Sample { position: self.points[0], tangent: self.tangents[0] },
            _ => (),
        }
        let d = if distance.is_nan() { 0.0 } else { distance.clamp(0.0, self.total_length) };

        let i = self.cumulative_distance.partition_point(|&c| c <= d).saturating_sub(1).min(n - 2);
        let (c0, c1) = (self.cumulative_distance[i], self.cumulative_distance[i + 1]);
        let span = c1 - c0;
        if span < EPSILON {
            return Sample { position: self.points[i], tangent: self.tangents[i] };
        }
        let t = ((d - c0) / span).clamp(0.0, 1.0);

        let position = lerp(self.points[i], self.points[i + 1], t);
        let tangent = lerp(self.tangents[i], self.tangents[i + 1], t);
        let tangent =
            if tangent.norm() < EPSILON { self.tangents[i] } else { tangent.to_unit() };
        Sample { position, tangent }
    }

    /// Reduces `distance` into the half-open range `[0, total_length)`.
    pub fn wrap(&self, distance: f64) -> f64 {
        if self.total_length < EPSILON || !distance.is_finite() {
            return 0.0;
        }
        let res = distance.rem_euclid(self.total_length);
        // rem_euclid of a tiny negative number rounds up to the modulus
        if res >= self.total_length {
            0.0
        } else {
            res
        }
    }

    pub fn sample_looped(&self, distance: f64) -> Sample {
        self.sample(self.wrap(distance))
    }

    /// The polyline shifted sideways by `offset` units, positive to the left
    /// of the direction of travel. The world renderer builds the ballast
    /// strip and both rails from these.
    pub fn offset_line(&self, offset: f64) -> Vec<v64> {
        self.points
            .iter()
            .zip(&self.tangents)
            .map(|(&p, &t)| p + heading_dir(heading_of(t) + core::f64::consts::FRAC_PI_2) * offset)
            .collect()
    }

    /// Left and right rail centre lines.
    pub fn rails(&self) -> [Vec<v64>; 2] {
        [self.offset_line(GAUGE / 2.0), self.offset_line(-GAUGE / 2.0)]
    }

    /// Left and right edges of the ballast strip.
    pub fn ballast(&self) -> [Vec<v64>; 2] {
        [self.offset_line(BALLAST_WIDTH / 2.0), self.offset_line(-BALLAST_WIDTH / 2.0)]
    }
}
