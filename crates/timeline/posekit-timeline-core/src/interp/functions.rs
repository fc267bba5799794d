//! Easing helpers:
//! - ease_in_out_quad (symmetric quadratic)
//! - eased_value (applies a keyframe easing to one segment)

use crate::data::Easing;
use crate::interp::Interpolate;

#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * 0.5
    }
}

/// Reshape a segment parameter in [0, 1]. `None` means hold the left value.
#[inline]
pub fn ease(easing: Easing, t: f32) -> Option<f32> {
    match easing {
        Easing::Linear => Some(t.clamp(0.0, 1.0)),
        Easing::EaseInOutQuad => Some(ease_in_out_quad(t)),
        Easing::Step => None,
    }
}

/// Blend one segment `left -> right` at local parameter `t` shaped by `easing`.
#[inline]
pub fn eased_value<V: Interpolate>(left: V, right: V, t: f32, easing: Easing) -> V {
    match ease(easing, t) {
        Some(u) => V::interpolate(left, right, u),
        None => left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_quad_shape() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_quad(0.25) - 0.125).abs() < 1e-6);
        assert!((ease_in_out_quad(0.75) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn step_holds_left() {
        assert_eq!(eased_value(2.0f32, 8.0, 0.9, Easing::Step), 2.0);
        assert_eq!(eased_value(2.0f32, 8.0, 0.5, Easing::Linear), 5.0);
    }
}
