//! Interpolation for track values.
//!
//! Rotations slerp, positions and weights lerp. Easing reshapes the segment
//! parameter before the value blend; step never blends.

pub mod functions;

use posekit_api_core::rotation::{lerp_f, lerp_vec3, slerp_quat};
use posekit_api_core::{Quat, Vec3};

/// A value that can be blended between two samples.
pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for Quat {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        slerp_quat(a, b, t)
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        lerp_vec3(a, b, t)
    }
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        lerp_f(a, b, t)
    }
}
