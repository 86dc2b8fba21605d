use crate::config::{
    AUTO_ROTATE_RADIANS_PER_SECOND, CAMERA_FOV_DEG, CAMERA_START_POSITION, ORBIT_MAX_DISTANCE,
    ORBIT_MIN_DISTANCE, PRESET_FLIGHT_SECONDS,
};
use crate::error::ConfiguratorError;
use crate::scene::SceneBounds;
use glam::{Quat, Vec3};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPreset {
    Front,
    Top,
    Left,
    Right,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 4] = [
        ViewPreset::Front,
        ViewPreset::Top,
        ViewPreset::Left,
        ViewPreset::Right,
    ];

    pub fn position(self) -> Vec3 {
        match self {
            ViewPreset::Front => Vec3::new(0.0, 5.0, 20.0),
            ViewPreset::Top => Vec3::new(0.0, 25.0, 0.0),
            ViewPreset::Left => Vec3::new(25.0, 5.0, 0.0),
            ViewPreset::Right => Vec3::new(-25.0, 5.0, 0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewPreset::Front => "front",
            ViewPreset::Top => "top",
            ViewPreset::Left => "left",
            ViewPreset::Right => "right",
        }
    }
}

impl FromStr for ViewPreset {
    type Err = ConfiguratorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ViewPreset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ConfiguratorError::UnknownPreset(value.to_string()))
    }
}

/// Camera distance at which an object `max_dimension` tall fills a vertical
/// field of view of `vertical_fov_rad`.
pub fn fit_distance(max_dimension: f32, vertical_fov_rad: f32) -> f32 {
    max_dimension / (2.0 * (vertical_fov_rad * 0.5).tan())
}

/// Quartic ease-out: fast start, slow settle.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

#[derive(Debug, Clone, Copy)]
struct Flight {
    from: Vec3,
    to: Vec3,
    duration: f32,
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct CameraDirector {
    pose: CameraPose,
    fov_deg: f32,
    auto_rotate: bool,
    flight: Option<Flight>,
}

impl Default for CameraDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDirector {
    pub fn new() -> Self {
        Self {
            pose: CameraPose {
                position: Vec3::from_array(CAMERA_START_POSITION),
                look_at: Vec3::ZERO,
            },
            fov_deg: CAMERA_FOV_DEG,
            auto_rotate: true,
            flight: None,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Target of the flight in progress, if any.
    pub fn destination(&self) -> Option<Vec3> {
        self.flight.map(|flight| flight.to)
    }

    /// Frames `bounds` head-on: the camera sits in front of the bounds' centre,
    /// raised by half their height, far enough back for the largest dimension
    /// to fit the vertical field of view.
    pub fn fit_to_bounds(&mut self, bounds: &SceneBounds, vertical_fov_deg: f32) -> CameraPose {
        let size = bounds.size();
        let center = bounds.center();
        let distance = fit_distance(bounds.max_dimension(), vertical_fov_deg.to_radians());
        self.fov_deg = vertical_fov_deg;
        self.flight = None;
        self.pose = CameraPose {
            position: Vec3::new(center.x, center.y + size.y * 0.5, center.z + distance),
            look_at: center,
        };
        self.pose
    }

    /// Starts an eased move to `target`, replacing any move in progress.
    pub fn fly_to(&mut self, target: Vec3, duration_seconds: f32) {
        self.auto_rotate = false;
        if duration_seconds.is_nan() || duration_seconds <= 0.0 {
            self.flight = None;
            self.pose.position = target;
            return;
        }
        self.flight = Some(Flight {
            from: self.pose.position,
            to: target,
            duration: duration_seconds,
            elapsed: 0.0,
        });
    }

    pub fn go_to(&mut self, preset: ViewPreset) {
        log::debug!("Flying to {} view", preset.name());
        self.fly_to(preset.position(), PRESET_FLIGHT_SECONDS);
    }

    /// Manual navigation around the look-at point. Stops auto-rotation and
    /// any flight; distance stays within the orbit limits.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32, zoom_delta: f32) {
        const POLE_MARGIN: f32 = 1e-3;
        self.auto_rotate = false;
        self.flight = None;

        let offset = self.pose.position - self.pose.look_at;
        let radius = offset.length().max(1e-6);
        let theta = offset.x.atan2(offset.z) + yaw_delta;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + pitch_delta)
            .clamp(POLE_MARGIN, std::f32::consts::PI - POLE_MARGIN);
        let radius = (radius - zoom_delta).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);

        self.pose.position = self.pose.look_at
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Moves the camera along for one tick. Returns whether the pose changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        let dt = dt.max(0.0);
        if let Some(flight) = &mut self.flight {
            flight.elapsed += dt;
            let t = flight.elapsed / flight.duration;
            self.pose.position = flight.from.lerp(flight.to, ease_out(t));
            if t >= 1.0 {
                self.pose.position = flight.to;
                self.flight = None;
            }
            return true;
        }
        if self.auto_rotate && dt > 0.0 {
            let rotation = Quat::from_rotation_y(AUTO_ROTATE_RADIANS_PER_SECOND * dt);
            let offset = self.pose.position - self.pose.look_at;
            self.pose.position = self.pose.look_at + rotation * offset;
            return true;
        }
        false
    }
}
