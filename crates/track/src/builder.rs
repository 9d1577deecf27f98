use geom::{heading_dir, v64, Pose, EPSILON};

use crate::{Segment, SegmentKind, Track, SEGMENT_LENGTH};

/// line {line}: {kind}
#[derive(Debug, Clone, PartialEq, displaydoc::Display)]
pub struct BuildError {
    pub line: u32,
    pub kind: BuildErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, displaydoc::Display)]
pub enum BuildErrorKind {
    /// curve radius is zero, segment skipped
    ZeroRadius,
    /// segment has zero length, skipped
    ZeroLength,
    /// segment parameters are not finite, skipped
    NotFinite,
    /// segment is too long to sample, skipped
    TooLong,
    /// sample spacing must be positive
    InvalidSpacing,
}

/// Upper bound on the samples of one segment.
pub const MAX_SEGMENT_SAMPLES: usize = 1 << 20;

/// Accumulates segments head to tail, then produces a [`Track`].
///
/// The head pose is available at every step, which is what scene placements
/// are positioned relative to.
pub struct TrackBuilder {
    start: Pose,
    segments: Vec<Segment>,
    segment_length: f64,
}

impl TrackBuilder {
    pub fn new(start: Pose) -> TrackBuilder {
        TrackBuilder { start, segments: Vec::new(), segment_length: SEGMENT_LENGTH }
    }

    pub fn with_segment_length(
        mut self,
        segment_length: f64,
    ) -> Result<TrackBuilder, BuildErrorKind> {
        if !(segment_length.is_finite() && segment_length > 0.0) {
            return Err(BuildErrorKind::InvalidSpacing);
        }
        self.segment_length = segment_length;
        Ok(self)
    }

    /// Moves the start of the track. Only possible before the first segment.
    pub fn set_start(&mut self, start: Pose) -> bool {
        if !self.segments.is_empty() {
            return false;
        }
        self.start = start;
        true
    }

    /// Pose at the end of the last appended segment.
    pub fn head(&self) -> Pose {
        self.segments.last().map_or(self.start, |it| it.end)
    }

    pub fn push(&mut self, kind: SegmentKind, line: u32) -> Result<&Segment, BuildError> {
        let segment = sample_segment(kind, self.head(), line, self.segment_length)
            .map_err(|kind| BuildError { line, kind })?;
        self.segments.push(segment);
        Ok(&self.segments[self.segments.len() - 1])
    }

    pub fn finish(self) -> Track {
        Track::from_segments(self.start, self.segments)
    }
}

fn sample_segment(
    kind: SegmentKind,
    start: Pose,
    line: u32,
    segment_length: f64,
) -> Result<Segment, BuildErrorKind> {
    match kind {
        SegmentKind::Straight { length, gradient_permille } => {
            if !(length.is_finite() && gradient_permille.is_finite()) {
                return Err(BuildErrorKind::NotFinite);
            }
            if length < EPSILON {
                return Err(BuildErrorKind::ZeroLength);
            }
            check_samples(length, segment_length)?;
            Ok(straight(kind, start, line, length, gradient_permille, segment_length))
        }
        SegmentKind::Curve { radius, angle_deg, gradient_permille } => {
            if !(radius.is_finite() && angle_deg.is_finite() && gradient_permille.is_finite()) {
                return Err(BuildErrorKind::NotFinite);
            }
            if radius < EPSILON {
                return Err(BuildErrorKind::ZeroRadius);
            }
            let arc = (radius * angle_deg.to_radians()).abs();
            if arc < EPSILON {
                return Err(BuildErrorKind::ZeroLength);
            }
            check_samples(arc, segment_length)?;
            Ok(curve(kind, start, line, radius, angle_deg, gradient_permille, segment_length))
        }
    }
}

fn straight(
    kind: SegmentKind,
    start: Pose,
    line: u32,
    length: f64,
    gradient_permille: f64,
    segment_length: f64,
) -> Segment {
    let n = steps(length, segment_length, 1);
    let dir = start.dir();
    let slope = gradient_permille / 1000.0;
    let rise = length * slope;
    let tangent = (dir + v64::Y * slope).to_unit();

    let at = |i: usize| {
        let f = i as f64 / n as f64;
        start.pos + dir * (length * f) + v64::Y * (rise * f)
    };
    let points: Vec<v64> = (0..=n).map(at).collect();
    let tangents = vec![tangent; points.len()];
    let end = Pose::new(points[n], start.heading);
    Segment { kind, start, end, horizontal_length: length, line, points, tangents }
}

fn curve(
    kind: SegmentKind,
    start: Pose,
    line: u32,
    radius: f64,
    angle_deg: f64,
    gradient_permille: f64,
    segment_length: f64,
) -> Segment {
    let theta = angle_deg.to_radians();
    let arc = (radius * theta).abs();
    let n = steps(arc, segment_length, 2);
    let slope = gradient_permille / 1000.0;
    let rise = arc * slope;

    // Signed radius: the centre sits on the left for left turns, on the right
    // for right turns.
    let r = radius * theta.signum();
    let center = start.pos.horizontal() + start.left() * r;
    let left_at = |heading: f64| heading_dir(heading + core::f64::consts::FRAC_PI_2);

    let mut points = Vec::with_capacity(n + 1);
    let mut tangents = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let f = i as f64 / n as f64;
        let heading = start.heading + theta * f;
        let ground = center - left_at(heading) * r;
        points.push(v64(ground.x, start.pos.y + rise * f, ground.z));
        tangents.push((heading_dir(heading) + v64::Y * slope).to_unit());
    }
    // Snap the first sample so that segments join exactly.
    points[0] = start.pos;

    let end = Pose::new(points[n], start.heading + theta);
    Segment { kind, start, end, horizontal_length: arc, line, points, tangents }
}

fn check_samples(length: f64, segment_length: f64) -> Result<(), BuildErrorKind> {
    if length / segment_length > MAX_SEGMENT_SAMPLES as f64 {
        return Err(BuildErrorKind::TooLong);
    }
    Ok(())
}

/// Number of equal steps needed so that no step exceeds `segment_length`.
fn steps(length: f64, segment_length: f64, min: usize) -> usize {
    let n = (length / segment_length - EPSILON).ceil();
    (n.max(min as f64)) as usize
}
