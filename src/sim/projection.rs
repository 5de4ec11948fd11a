//! Lane/depth to screen projection
//!
//! Pure functions. Depth 1 sits on the horizon, depth 0 at the runner's feet.
//! Lanes fan out as they approach, which gives the converging-road look.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GROUND_BOTTOM, HORIZON_Y, LANE_COUNT, VIEW_WIDTH};
use crate::lerp;

/// Lane spread at the horizon (pixels between lane centres)
const FAR_SPREAD: f32 = 55.0;
/// Extra spread gained by the time a lane reaches the runner
const NEAR_SPREAD_GAIN: f32 = 220.0;
/// Vanishing-point shift per lane of camera drift, far and near
const CAMERA_SHIFT_FAR: f32 = 22.0;
const CAMERA_SHIFT_NEAR_GAIN: f32 = 14.0;

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 1.05;

/// Projected screen position and sprite scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPos {
    pub pos: Vec2,
    pub scale: f32,
}

impl Default for ScreenPos {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

#[inline]
fn center_lane() -> f32 {
    (LANE_COUNT as f32 - 1.0) / 2.0
}

/// Screen X for a (possibly fractional) lane at a depth.
///
/// `camera_lane` is the runner's smoothed lane; the road centre shifts the
/// opposite way so the camera appears to lean into the turn.
pub fn lane_to_x(lane: f32, depth: f32, camera_lane: f32) -> f32 {
    let near = 1.0 - depth;
    let center = VIEW_WIDTH / 2.0
        - (camera_lane - center_lane()) * (CAMERA_SHIFT_FAR + near * CAMERA_SHIFT_NEAR_GAIN);
    let spread = FAR_SPREAD + near * NEAR_SPREAD_GAIN;
    center + (lane - center_lane()) * spread
}

/// Screen Y for a depth (horizon at depth 1)
pub fn depth_to_y(depth: f32) -> f32 {
    lerp(HORIZON_Y, GROUND_BOTTOM, 1.0 - depth)
}

/// Sprite scale for a depth, in [`MIN_SCALE`, `MAX_SCALE`] over depth 1..0
pub fn depth_scale(depth: f32) -> f32 {
    lerp(MIN_SCALE, MAX_SCALE, 1.0 - depth)
}

/// Project an entity; depths behind the runner are pinned to 0
pub fn project(lane: f32, depth: f32, camera_lane: f32) -> ScreenPos {
    let d = depth.clamp(0.0, 1.0);
    ScreenPos {
        pos: Vec2::new(lane_to_x(lane, d, camera_lane), depth_to_y(d)),
        scale: depth_scale(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_endpoints() {
        assert!((depth_to_y(1.0) - HORIZON_Y).abs() < 1e-4);
        assert!((depth_to_y(0.0) - GROUND_BOTTOM).abs() < 1e-4);
        assert!((depth_scale(1.0) - MIN_SCALE).abs() < 1e-6);
        assert!((depth_scale(0.0) - MAX_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic_in_depth() {
        let mut prev_y = f32::INFINITY;
        let mut prev_scale = f32::INFINITY;
        for i in 0..=20 {
            let d = i as f32 / 20.0;
            let y = depth_to_y(d);
            let s = depth_scale(d);
            assert!(y < prev_y);
            assert!(s < prev_scale);
            prev_y = y;
            prev_scale = s;
        }
    }

    #[test]
    fn test_lanes_spread_wider_when_near() {
        let far = lane_to_x(2.0, 1.0, 1.0) - lane_to_x(0.0, 1.0, 1.0);
        let near = lane_to_x(2.0, 0.0, 1.0) - lane_to_x(0.0, 0.0, 1.0);
        assert!(near > far);
        // Centre lane sits on screen centre when the camera is centred
        assert!((lane_to_x(1.0, 0.3, 1.0) - VIEW_WIDTH / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_camera_shifts_opposite() {
        let centred = lane_to_x(1.0, 0.5, 1.0);
        let drifted = lane_to_x(1.0, 0.5, 2.0);
        assert!(drifted < centred);
    }

    #[test]
    fn test_project_pins_passed_depth() {
        let p = project(1.0, -0.1, 1.0);
        assert!((p.pos.y - GROUND_BOTTOM).abs() < 1e-4);
        assert!((p.scale - MAX_SCALE).abs() < 1e-6);
    }
}
