use bytemuck::{Pod, Zeroable};

use crate::camera::OrbitCamera;
use crate::config::LensingConfig;

/// Camera parameters for the lensing pass (std140, 80 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraBlock {
    pub position: [f32; 3],
    pub _pad0: f32,
    pub right: [f32; 3],
    pub _pad1: f32,
    pub up: [f32; 3],
    pub _pad2: f32,
    pub forward: [f32; 3],
    pub _pad3: f32,
    pub tan_half_fov: f32,
    pub aspect: f32,
    pub moving: u32,
    pub _pad4: i32,
}

impl CameraBlock {
    pub fn new(camera: &OrbitCamera, fov_deg: f32, aspect: f32) -> Self {
        let (forward, right, up) = camera.basis();
        Self {
            position: camera.position().to_array(),
            right: right.to_array(),
            up: up.to_array(),
            forward: forward.to_array(),
            tan_half_fov: (fov_deg.to_radians() * 0.5).tan(),
            aspect,
            moving: camera.is_moving() as u32,
            ..Self::zeroed()
        }
    }
}

/// Accretion disk parameters (16 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DiskBlock {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub num: f32,
    pub thickness: f32,
}

impl DiskBlock {
    pub fn around(r_s: f64) -> Self {
        Self {
            inner_radius: (r_s * 2.2) as f32,
            outer_radius: (r_s * 5.2) as f32,
            num: 2.0,
            thickness: 1.0e9,
        }
    }
}

/// Compute-target resolution for the lensing pass, reduced while the
/// camera is being dragged or panned.
pub fn lensing_extent(config: &LensingConfig, moving: bool) -> (u32, u32) {
    if moving {
        (config.moving_width, config.moving_height)
    } else {
        (config.compute_width, config.compute_height)
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use crate::camera::PointerButton;
    use crate::config::CameraConfig;

    use super::*;

    #[test]
    fn camera_block_is_std140() {
        assert_eq!(size_of::<CameraBlock>(), 80);
        assert_eq!(offset_of!(CameraBlock, right), 16);
        assert_eq!(offset_of!(CameraBlock, forward), 48);
        assert_eq!(offset_of!(CameraBlock, tan_half_fov), 64);
        assert_eq!(offset_of!(CameraBlock, moving), 72);
        assert_eq!(size_of::<DiskBlock>(), 16);
    }

    #[test]
    fn moving_flag_follows_interaction() {
        let mut camera = OrbitCamera::black_hole(&CameraConfig::default(), 6.34e10);
        let idle = CameraBlock::new(&camera, 60.0, 4.0 / 3.0);
        assert_eq!(idle.moving, 0);
        assert!((idle.tan_half_fov - 0.57735).abs() < 1e-4);
        camera.handle_mouse_press(PointerButton::Left);
        assert_eq!(CameraBlock::new(&camera, 60.0, 4.0 / 3.0).moving, 1);
    }

    #[test]
    fn extent_drops_while_moving() {
        let config = LensingConfig::default();
        assert_eq!(lensing_extent(&config, false), (800, 600));
        assert_eq!(lensing_extent(&config, true), (200, 150));
    }

    #[test]
    fn disk_scales_with_horizon() {
        let disk = DiskBlock::around(1.0e10);
        assert_eq!(disk.inner_radius, 2.2e10);
        assert_eq!(disk.outer_radius, 5.2e10);
    }
}
