//! Longitudinal motion of the tram along a built [`Track`].
//!
//! The model is deliberately simple: a signed speed integrated once per
//! frame, pulled towards zero by friction when coasting and by the brakes
//! when braking.
use geom::{v64, EPSILON};
use track::{Sample, Track};

/// Speeds below this count as standing still.
const STANDSTILL: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TramConfig {
    /// World units per second.
    pub max_speed: f64,
    /// World units per second squared.
    pub acceleration: f64,
    pub braking: f64,
    pub friction: f64,
    /// Height of the driver's eye above the rail.
    pub cab_height: f64,
}

impl Default for TramConfig {
    fn default() -> TramConfig {
        TramConfig {
            max_speed: 20.0,
            acceleration: 1.5,
            braking: 4.0,
            friction: 0.3,
            cab_height: 2.6,
        }
    }
}

/// What the HUD shows about the driver's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Accelerating,
    Braking,
    CoastingForward,
    CoastingBackward,
    Idle,
}

/// Where the tram is and where the cab camera looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabPose {
    pub position: v64,
    pub tangent: v64,
    pub eye: v64,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
}

#[derive(Debug, Clone)]
pub struct Tram {
    pub config: TramConfig,
    distance_on_track: f64,
    current_speed: f64,
    is_accelerating: bool,
    is_braking: bool,
    reverse: bool,
    looping: bool,
}

impl Tram {
    pub fn new(config: TramConfig, looping: bool) -> Tram {
        Tram {
            config,
            distance_on_track: 0.0,
            current_speed: 0.0,
            is_accelerating: false,
            is_braking: false,
            reverse: false,
            looping,
        }
    }

    pub fn distance_on_track(&self) -> f64 {
        self.distance_on_track
    }
    pub fn speed(&self) -> f64 {
        self.current_speed
    }
    pub fn speed_kmh(&self) -> f64 {
        self.current_speed * 3.6
    }
    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_accelerating(&mut self, on: bool) {
        self.is_accelerating = on;
    }
    pub fn set_braking(&mut self, on: bool) {
        self.is_braking = on;
    }
    /// Makes the throttle drive the tram backwards.
    pub fn set_reverse(&mut self, on: bool) {
        self.reverse = on;
    }
    pub fn set_looping(&mut self, on: bool) {
        self.looping = on;
    }

    /// Advances the simulation by `dt` seconds and returns the new pose.
    pub fn update(&mut self, track: &Track, dt: f64) -> CabPose {
        let cfg = self.config;
        let mut speed = self.current_speed;
        if !self.is_accelerating && !self.is_braking {
            speed = toward_zero(speed, cfg.friction * dt);
        }
        if self.is_accelerating {
            let sign = if self.reverse { -1.0 } else { 1.0 };
            speed += sign * cfg.acceleration * dt;
        }
        if self.is_braking {
            speed = toward_zero(speed, cfg.braking * dt);
        }
        speed = speed.clamp(-cfg.max_speed, cfg.max_speed);

        let total = track.total_length();
        let mut distance = self.distance_on_track + speed * dt;
        if self.looping {
            distance = track.wrap(distance);
        } else if distance <= 0.0 {
            distance = 0.0;
            if speed < 0.0 {
                log::debug!("tram stopped at the start of the track");
                speed = 0.0;
            }
        } else if distance >= total {
            distance = total;
            if speed > 0.0 {
                log::debug!("tram stopped at the end of the track");
                speed = 0.0;
            }
        }

        self.current_speed = speed;
        self.distance_on_track = distance;
        self.pose(track)
    }

    /// Pose at the current distance, without advancing.
    pub fn pose(&self, track: &Track) -> CabPose {
        let sample = if self.looping {
            track.sample_looped(self.distance_on_track)
        } else {
            track.sample(self.distance_on_track)
        };
        cab_pose(sample, self.config.cab_height)
    }

    pub fn control(&self) -> Control {
        if self.is_accelerating {
            Control::Accelerating
        } else if self.is_braking {
            Control::Braking
        } else if self.current_speed > STANDSTILL {
            Control::CoastingForward
        } else if self.current_speed < -STANDSTILL {
            Control::CoastingBackward
        } else {
            Control::Idle
        }
    }
}

fn toward_zero(speed: f64, amount: f64) -> f64 {
    if speed > 0.0 {
        (speed - amount).max(0.0)
    } else {
        (speed + amount).min(0.0)
    }
}

fn cab_pose(sample: Sample, cab_height: f64) -> CabPose {
    let Sample { position, tangent } = sample;
    let pitch = if tangent.norm() < EPSILON { 0.0 } else { tangent.y.clamp(-1.0, 1.0).asin() };
    CabPose {
        position,
        tangent,
        eye: position + v64::Y * cab_height,
        yaw_deg: sample.heading().to_degrees(),
        pitch_deg: pitch.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geom::Pose;
    use track::{SegmentKind, TrackBuilder};

    use super::*;

    fn track(length: f64) -> Track {
        let mut b = TrackBuilder::new(Pose::default());
        b.push(SegmentKind::Straight { length, gradient_permille: 0.0 }, 1).unwrap();
        b.finish()
    }

    fn config() -> TramConfig {
        TramConfig {
            max_speed: 10.0,
            acceleration: 2.0,
            braking: 4.0,
            friction: 1.0,
            cab_height: 2.0,
        }
    }

    #[test]
    fn accelerates_up_to_max_speed() {
        let track = track(1000.0);
        let mut tram = Tram::new(config(), false);
        tram.set_accelerating(true);
        tram.update(&track, 1.0);
        assert_abs_diff_eq!(tram.speed(), 2.0);
        assert_abs_diff_eq!(tram.distance_on_track(), 2.0);
        for _ in 0..20 {
            tram.update(&track, 1.0);
        }
        assert_abs_diff_eq!(tram.speed(), 10.0);
        assert_eq!(tram.control(), Control::Accelerating);
    }

    #[test]
    fn friction_and_brakes_stop_at_zero() {
        let track = track(1000.0);
        let mut tram = Tram::new(config(), false);
        tram.set_accelerating(true);
        tram.update(&track, 3.0);
        tram.set_accelerating(false);
        tram.update(&track, 1.0);
        assert_abs_diff_eq!(tram.speed(), 5.0);
        assert_eq!(tram.control(), Control::CoastingForward);
        tram.set_braking(true);
        tram.update(&track, 1.0);
        assert_abs_diff_eq!(tram.speed(), 1.0);
        assert_eq!(tram.control(), Control::Braking);
        tram.update(&track, 1.0);
        assert_eq!(tram.speed(), 0.0);
        tram.set_braking(false);
        tram.update(&track, 1.0);
        assert_eq!(tram.speed(), 0.0);
        assert_eq!(tram.control(), Control::Idle);
    }

    #[test]
    fn reverse_coasts_backwards() {
        let track = track(100.0);
        let mut tram = Tram::new(config(), true);
        tram.set_reverse(true);
        tram.set_accelerating(true);
        tram.update(&track, 1.0);
        assert_abs_diff_eq!(tram.speed(), -2.0);
        tram.set_accelerating(false);
        tram.update(&track, 0.5);
        assert_abs_diff_eq!(tram.speed(), -1.5);
        assert_eq!(tram.control(), Control::CoastingBackward);
        // Looping wraps below zero back to the far end.
        assert!(tram.distance_on_track() > 90.0);
    }

    #[test]
    fn clamps_at_the_end_without_looping() {
        let track = track(10.0);
        let mut tram = Tram::new(config(), false);
        tram.set_accelerating(true);
        for _ in 0..10 {
            tram.update(&track, 1.0);
        }
        assert_eq!(tram.distance_on_track(), track.total_length());
        // Stopped at the buffer: the accelerator cannot push further.
        tram.set_accelerating(false);
        tram.update(&track, 0.0);
        assert_eq!(tram.speed(), 0.0);
        let pose = tram.pose(&track);
        assert_abs_diff_eq!(pose.position.z, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.eye.y, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn wraps_with_looping() {
        let track = track(10.0);
        let mut tram = Tram::new(TramConfig { friction: 0.0, ..config() }, true);
        tram.set_accelerating(true);
        tram.update(&track, 2.0);
        tram.set_accelerating(false);
        let pose = tram.update(&track, 2.0);
        // 8 + 8 = 16 wraps to 6.
        assert_abs_diff_eq!(tram.distance_on_track(), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.position.z, 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pose.yaw_deg, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_track_is_safe() {
        let track = Track::default();
        let mut tram = Tram::new(config(), false);
        tram.set_accelerating(true);
        let pose = tram.update(&track, 1.0);
        assert_eq!(pose.position, v64::ZERO);
        assert_eq!(pose.tangent, v64::Z);
        assert_eq!(tram.speed(), 0.0);
    }
}
