use std::{fmt, num::ParseFloatError, ops, str::FromStr};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[allow(non_camel_case_types)]
pub struct v64 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A point on the ground plane, in world units.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Xz {
    pub x: f64,
    pub z: f64,
}

/// Position plus heading of something that moves along the ground.
///
/// Heading `0` faces `+Z`, and positive headings turn left, towards `+X`.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Pose {
    pub pos: v64,
    pub heading: f64,
}

/// {0}
#[derive(Debug, displaydoc::Display)]
pub struct ParseVectorError(ParseVectorErrorRepr);

#[derive(Debug, displaydoc::Display)]
enum ParseVectorErrorRepr {
    /// {0}
    ParseFloatError(ParseFloatError),
    /// expected {0} comma-separated coordinates
    InvalidFormat(usize),
}

pub const EPSILON: f64 = 1e-9;

pub const fn v64(x: f64, y: f64, z: f64) -> v64 {
    v64 { x, y, z }
}

pub const fn xz(x: f64, z: f64) -> Xz {
    Xz { x, z }
}

impl v64 {
    pub const ZERO: v64 = v64(0.0, 0.0, 0.0);
    pub const Y: v64 = v64(0.0, 1.0, 0.0);
    pub const Z: v64 = v64(0.0, 0.0, 1.0);

    pub fn xz(self) -> Xz {
        Xz { x: self.x, z: self.z }
    }
    pub fn to_unit(self) -> v64 {
        self / self.norm()
    }
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }
    pub fn norm_squared(self) -> f64 {
        dot(self, self)
    }
    /// Same vector with the vertical component dropped.
    pub fn horizontal(self) -> v64 {
        v64(self.x, 0.0, self.z)
    }
}

impl Xz {
    pub const ZERO: Xz = xz(0.0, 0.0);

    pub fn with_y(self, y: f64) -> v64 {
        v64(self.x, y, self.z)
    }
    pub fn distance(self, other: Xz) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

impl Pose {
    pub fn new(pos: v64, heading: f64) -> Pose {
        Pose { pos, heading }
    }

    /// Unit vector along the heading.
    pub fn dir(&self) -> v64 {
        heading_dir(self.heading)
    }

    /// Unit vector pointing to the left of the heading.
    pub fn left(&self) -> v64 {
        heading_dir(self.heading + core::f64::consts::FRAC_PI_2)
    }

    /// Maps an offset expressed in the pose's local frame (`z` forward) into
    /// world space.
    pub fn to_world(&self, local: v64) -> v64 {
        self.pos + rotate_y(local, self.heading)
    }
}

/// Direction of travel for a heading given in radians.
pub fn heading_dir(heading: f64) -> v64 {
    let (sin, cos) = heading.sin_cos();
    v64(sin, 0.0, cos)
}

/// Heading of a direction; the vertical component is ignored.
pub fn heading_of(dir: v64) -> f64 {
    dir.x.atan2(dir.z)
}

/// Rotation about `+Y`, in the same sense as headings turn.
pub fn rotate_y(v: v64, angle: f64) -> v64 {
    let (sin, cos) = angle.sin_cos();
    v64(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

pub fn rotate_x(v: v64, angle: f64) -> v64 {
    let (sin, cos) = angle.sin_cos();
    v64(v.x, v.y * cos - v.z * sin, v.y * sin + v.z * cos)
}

pub fn rotate_z(v: v64, angle: f64) -> v64 {
    let (sin, cos) = angle.sin_cos();
    v64(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Exact at both ends: `lerp(a, b, 1.0) == b`.
pub fn lerp(a: v64, b: v64, t: f64) -> v64 {
    a * (1.0 - t) + b * t
}

impl fmt::Display for Xz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

impl FromStr for Xz {
    type Err = ParseVectorError;

    fn from_str(s: &str) -> Result<Xz, ParseVectorError> {
        let [x, z] = split_n::<2>(s, ',')
            .ok_or(ParseVectorErrorRepr::InvalidFormat(2))?
            .map(|it| it.trim().parse::<f64>().map_err(ParseVectorErrorRepr::ParseFloatError));
        Ok(xz(x?, z?))
    }
}

fn split_n<const N: usize>(s: &str, p: char) -> Option<[&str; N]> {
    let mut components = s.split(p);
    let mut res = [""; N];
    for slot in res.iter_mut() {
        *slot = components.next()?;
    }
    if components.next().is_some() {
        return None;
    }
    Some(res)
}

pub fn dot(lhs: v64, rhs: v64) -> f64 {
    lhs.x * rhs.x + lhs.y * rhs.y + lhs.z * rhs.z
}

impl ops::Neg for v64 {
    type Output = v64;

    fn neg(self) -> v64 {
        v64(-self.x, -self.y, -self.z)
    }
}

impl ops::Add for v64 {
    type Output = v64;

    fn add(self, rhs: v64) -> v64 {
        v64(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::Sub for v64 {
    type Output = v64;

    fn sub(self, rhs: v64) -> v64 {
        v64(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Div<f64> for v64 {
    type Output = v64;

    fn div(self, c: f64) -> v64 {
        let r = 1.0 / c;
        v64(self.x * r, self.y * r, self.z * r)
    }
}

impl ops::Mul<f64> for v64 {
    type Output = v64;

    fn mul(self, c: f64) -> v64 {
        v64(self.x * c, self.y * c, self.z * c)
    }
}

impl ops::Mul<v64> for f64 {
    type Output = v64;

    fn mul(self, v: v64) -> v64 {
        v * self
    }
}

impl From<ParseVectorErrorRepr> for ParseVectorError {
    fn from(repr: ParseVectorErrorRepr) -> ParseVectorError {
        ParseVectorError(repr)
    }
}
