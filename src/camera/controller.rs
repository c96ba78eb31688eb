use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::camera::input::PointerButton;
use crate::config::CameraConfig;

/// Something the camera can be pointed at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FocusPoint {
    pub position: Vec3,
    pub radius: f32,
}

/// Ordered set of focus candidates the camera cycles through.
pub trait FocusRegistry {
    fn focus_count(&self) -> usize;
    fn focus_point(&self, index: usize) -> Option<FocusPoint>;
}

/// Pointer interaction; at most one is active at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging,
    Panning,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Orientation {
    /// Degrees. Pitch is measured from the horizontal plane.
    YawPitch { yaw: f32, pitch: f32 },
    /// Radians. Elevation is measured from +Y.
    Spherical { azimuth: f32, elevation: f32 },
}

// Camera that orbits a target point at a given distance
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    orientation: Orientation,
    anchor: Vec3,     // focused body position, or the fixed centre
    pan_offset: Vec3, // panning applied on top of the anchor
    distance: f32,
    min_distance: f32,
    max_distance: f32,
    interaction: Interaction,
    last_pointer: Option<Vec2>,
    focus: Option<usize>,
    settings: CameraConfig,
}

impl OrbitCamera {
    /// Yaw/pitch camera for the solar-system scenes.
    pub fn solar(settings: &CameraConfig, distance: f32) -> Self {
        Self::new(
            Orientation::YawPitch {
                yaw: -90.0,
                pitch: 0.0,
            },
            distance,
            settings.solar_min_distance,
            settings.solar_max_distance,
            settings,
        )
    }

    /// Azimuth/elevation camera for the black-hole scene.
    pub fn black_hole(settings: &CameraConfig, radius: f32) -> Self {
        Self::new(
            Orientation::Spherical {
                azimuth: 0.0,
                elevation: PI / 2.0,
            },
            radius,
            settings.black_hole_min_radius,
            settings.black_hole_max_radius,
            settings,
        )
    }

    fn new(orientation: Orientation, distance: f32, min_distance: f32, max_distance: f32, settings: &CameraConfig) -> Self {
        Self {
            orientation,
            anchor: Vec3::ZERO,
            pan_offset: Vec3::ZERO,
            distance: distance.clamp(min_distance, max_distance),
            min_distance,
            max_distance,
            interaction: Interaction::Idle,
            last_pointer: None,
            focus: None,
            settings: settings.clone(),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.anchor + self.pan_offset
    }

    /// Camera position, derived from target, distance and orientation.
    pub fn position(&self) -> Vec3 {
        let offset = match self.orientation {
            Orientation::YawPitch { yaw, pitch } => {
                let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
                Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
            }
            Orientation::Spherical { azimuth, elevation } => {
                let elevation = elevation.clamp(self.settings.elevation_epsilon, PI - self.settings.elevation_epsilon);
                Vec3::new(
                    elevation.sin() * azimuth.cos(),
                    elevation.cos(),
                    elevation.sin() * azimuth.sin(),
                )
            }
        };
        self.target() + offset * self.distance
    }

    /// `(forward, right, up)` with `forward = normalize(target - position)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target() - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (forward, right, up)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target(), Vec3::Y)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// True while dragging or panning.
    pub fn is_moving(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    fn interaction_for(&self, button: PointerButton) -> Option<Interaction> {
        match (self.orientation, button) {
            (_, PointerButton::Left) => Some(Interaction::Dragging),
            (Orientation::YawPitch { .. }, PointerButton::Right | PointerButton::Middle) => Some(Interaction::Panning),
            (Orientation::Spherical { .. }, PointerButton::Middle) => Some(Interaction::Panning),
            (Orientation::Spherical { .. }, PointerButton::Right) => None,
        }
    }

    /// Returns whether the button belongs to the camera.
    pub fn handle_mouse_press(&mut self, button: PointerButton) -> bool {
        match self.interaction_for(button) {
            Some(interaction) => {
                self.interaction = interaction;
                true
            }
            None => false,
        }
    }

    pub fn handle_mouse_release(&mut self, button: PointerButton) -> bool {
        match self.interaction_for(button) {
            Some(interaction) => {
                if self.interaction == interaction {
                    self.interaction = Interaction::Idle;
                }
                true
            }
            None => false,
        }
    }

    /// Returns whether the view changed.
    pub fn handle_mouse_move(&mut self, position: Vec2) -> bool {
        let delta = self.last_pointer.map_or(Vec2::ZERO, |last| position - last);
        self.last_pointer = Some(position);
        if delta == Vec2::ZERO {
            return false;
        }
        match self.interaction {
            Interaction::Dragging => {
                self.rotate(delta.x, delta.y);
                true
            }
            Interaction::Panning => {
                self.pan(delta.x, delta.y);
                true
            }
            Interaction::Idle => false,
        }
    }

    pub fn handle_mouse_wheel(&mut self, notches: f32) {
        self.zoom(notches);
    }

    /// Rotate by a pointer delta in pixels (screen y grows downwards).
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        match &mut self.orientation {
            Orientation::YawPitch { yaw, pitch } => {
                let sensitivity = self.settings.yaw_pitch_sensitivity;
                let limit = self.settings.pitch_limit_deg;
                *yaw = (*yaw + dx * sensitivity).rem_euclid(360.0);
                *pitch = (*pitch - dy * sensitivity).clamp(-limit, limit);
            }
            Orientation::Spherical { azimuth, elevation } => {
                let speed = self.settings.orbit_speed;
                let eps = self.settings.elevation_epsilon;
                *azimuth = (*azimuth + dx * speed).rem_euclid(TAU);
                *elevation = (*elevation - dy * speed).clamp(eps, PI - eps);
            }
        }
    }

    /// Translate the target in the view plane; speed scales with distance.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (_, right, up) = self.basis();
        let speed = self.distance * self.settings.pan_scale;
        self.pan_offset -= right * dx * speed;
        self.pan_offset += up * dy * speed;
    }

    /// Positive notches zoom in.
    pub fn zoom(&mut self, notches: f32) {
        if !notches.is_finite() || notches == 0.0 {
            return;
        }
        let factor = if notches > 0.0 {
            self.settings.zoom_in_factor
        } else {
            self.settings.zoom_out_factor
        };
        self.distance = (self.distance * factor.powf(notches.abs())).clamp(self.min_distance, self.max_distance);
    }

    /// Move focus to the next registry entry (wrapping) and frame it at a
    /// fixed multiple of its radius. Pan offsets are discarded.
    ///
    /// Only the maximum distance applies here, so bodies smaller than the
    /// zoom floor are still framed at the multiple. The next zoom clamps again.
    pub fn cycle_focus(&mut self, registry: &impl FocusRegistry) -> Option<usize> {
        let count = registry.focus_count();
        if count == 0 {
            self.focus = None;
            return None;
        }
        let next = self.focus.map_or(0, |index| (index + 1) % count);
        let point = registry.focus_point(next)?;
        self.focus = Some(next);
        self.anchor = point.position;
        self.pan_offset = Vec3::ZERO;
        self.distance = (point.radius * self.settings.focus_distance_multiple).min(self.max_distance);
        Some(next)
    }

    /// Re-anchor on the focused entry's current position.
    pub fn follow(&mut self, registry: &impl FocusRegistry) {
        if let Some(index) = self.focus {
            match registry.focus_point(index) {
                Some(point) => self.anchor = point.position,
                None => self.focus = None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Points(Vec<FocusPoint>);

    impl FocusRegistry for Points {
        fn focus_count(&self) -> usize {
            self.0.len()
        }

        fn focus_point(&self, index: usize) -> Option<FocusPoint> {
            self.0.get(index).copied()
        }
    }

    fn settings() -> CameraConfig {
        CameraConfig::default()
    }

    #[test]
    fn dragging_and_panning_are_exclusive() {
        let mut camera = OrbitCamera::solar(&settings(), 1.0e10);
        assert!(camera.handle_mouse_press(PointerButton::Left));
        assert_eq!(camera.interaction(), Interaction::Dragging);
        camera.handle_mouse_press(PointerButton::Right);
        assert_eq!(camera.interaction(), Interaction::Panning);
        // Releasing the button that is no longer active changes nothing
        camera.handle_mouse_release(PointerButton::Left);
        assert_eq!(camera.interaction(), Interaction::Panning);
        assert!(camera.is_moving());
        camera.handle_mouse_release(PointerButton::Right);
        assert!(!camera.is_moving());
    }

    #[test]
    fn right_button_is_not_a_camera_button_around_black_hole() {
        let mut camera = OrbitCamera::black_hole(&settings(), 6.34e10);
        assert!(!camera.handle_mouse_press(PointerButton::Right));
        assert_eq!(camera.interaction(), Interaction::Idle);
        assert!(camera.handle_mouse_press(PointerButton::Middle));
        assert_eq!(camera.interaction(), Interaction::Panning);
    }

    #[test]
    fn zoom_is_multiplicative_and_clamped() {
        let mut camera = OrbitCamera::black_hole(&settings(), 5.0e11);
        camera.zoom(1.0);
        assert!((camera.distance() - 4.5e11).abs() < 1.0e6);
        for _ in 0..100 {
            camera.zoom(-1.0);
        }
        assert_eq!(camera.distance(), 1.0e12);
        for _ in 0..100 {
            camera.zoom(3.0);
        }
        assert_eq!(camera.distance(), 1.0e10);
    }

    #[test]
    fn position_follows_yaw_pitch() {
        let camera = OrbitCamera::solar(&settings(), 100.0e6);
        // yaw -90 deg, pitch 0 puts the camera on -Z
        let position = camera.position();
        assert!(position.x.abs() < 10.0);
        assert!((position.z + 100.0e6).abs() < 10.0);
    }

    #[test]
    fn elevation_clamp_keeps_camera_off_the_pole() {
        let mut camera = OrbitCamera::black_hole(&settings(), 1.0e11);
        camera.handle_mouse_press(PointerButton::Left);
        camera.handle_mouse_move(Vec2::new(0.0, 0.0));
        for i in 1..200 {
            camera.handle_mouse_move(Vec2::new(0.0, i as f32 * 50.0));
        }
        let Orientation::Spherical { elevation, .. } = camera.orientation() else {
            panic!("expected spherical camera");
        };
        assert_eq!(elevation, 0.01);
        let (forward, right, _) = camera.basis();
        assert!(forward.is_finite() && right.length() > 0.99);
    }

    #[test]
    fn pan_speed_scales_with_distance() {
        let mut near = OrbitCamera::solar(&settings(), 1.0e8);
        let mut far = OrbitCamera::solar(&settings(), 1.0e10);
        near.pan(10.0, 0.0);
        far.pan(10.0, 0.0);
        let ratio = far.target().length() / near.target().length();
        assert!((ratio - 100.0).abs() < 1e-2);
    }

    #[test]
    fn follow_tracks_moving_focus() {
        let mut registry = Points(vec![FocusPoint {
            position: Vec3::new(1.0e9, 0.0, 0.0),
            radius: 1.0e6,
        }]);
        let mut camera = OrbitCamera::solar(&settings(), 1.0e10);
        camera.cycle_focus(&registry);
        registry.0[0].position = Vec3::new(2.0e9, 0.0, 0.0);
        camera.follow(&registry);
        assert_eq!(camera.target(), Vec3::new(2.0e9, 0.0, 0.0));
        registry.0.clear();
        camera.follow(&registry);
        assert_eq!(camera.focus(), None);
    }

    #[test]
    fn cycling_empty_registry_is_harmless() {
        let mut camera = OrbitCamera::solar(&settings(), 1.0e10);
        assert_eq!(camera.cycle_focus(&Points(Vec::new())), None);
        assert_eq!(camera.distance(), 1.0e10);
    }

    #[test]
    fn focus_frames_small_bodies_below_the_zoom_floor() {
        let config = settings();
        let registry = Points(vec![FocusPoint {
            position: Vec3::ZERO,
            radius: 1.0e5,
        }]);
        let mut camera = OrbitCamera::solar(&config, 1.0e10);
        camera.cycle_focus(&registry);
        assert_eq!(camera.distance(), 1.0e5 * config.focus_distance_multiple);
        assert!(camera.distance() < config.solar_min_distance);
        camera.zoom(1.0);
        assert_eq!(camera.distance(), config.solar_min_distance);
    }
}
