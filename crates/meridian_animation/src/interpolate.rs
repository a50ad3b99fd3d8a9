//! Interpolation helpers for animation payloads
//!
//! The scheduler never looks inside payloads. These impls exist for step
//! callbacks that want the usual `start + (end - start) * t` blend.

/// Linear blend between two values of the same kind
pub trait Interpolate {
    /// Blend from `self` to `to`. `t` is not clamped, so overshoot easings
    /// extrapolate past either end.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl<T: Interpolate, const N: usize> Interpolate for [T; N] {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i].interpolate(&to[i], t))
    }
}
