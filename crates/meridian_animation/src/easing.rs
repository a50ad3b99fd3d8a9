//! Easing functions for animations
//!
//! An easing remaps normalized progress in `[0, 1]` to eased progress. The
//! result is left unclamped: overshoot variants such as
//! [`Easing::SpringOut`] leave the unit range and callers interpolating
//! payloads are expected to extrapolate accordingly.

use std::f64::consts::PI;

/// Overshoot amount shared by the spring variants.
const SPRING_OVERSHOOT: f64 = 1.70158;

/// Easing function type
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    SineIn,
    SineOut,
    SineInOut,
    BounceIn,
    BounceOut,
    /// Pulls back below zero before accelerating towards the end.
    SpringIn,
    /// Shoots past one before settling on the end value.
    SpringOut,
    CubicBezier(f64, f64, f64, f64),
    /// User supplied progress mapping.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(f64) -> f64),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInCubic => t * t * t,
            Easing::EaseOut | Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut | Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::SpringIn => t * t * ((SPRING_OVERSHOOT + 1.0) * t - SPRING_OVERSHOOT),
            Easing::SpringOut => {
                let u = t - 1.0;
                u * u * ((SPRING_OVERSHOOT + 1.0) * u + SPRING_OVERSHOOT) + 1.0
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }

    /// Whether this easing may leave the `[0, 1]` range for in-range input
    pub fn overshoots(&self) -> bool {
        match self {
            Easing::SpringIn | Easing::SpringOut | Easing::Custom(_) => true,
            Easing::CubicBezier(_, y1, _, y2) => !(0.0..=1.0).contains(y1) || !(0.0..=1.0).contains(y2),
            _ => false,
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// Cubic bezier easing calculation (matches CSS spec / browser implementations).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = t;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - t).abs() < 1e-7 {
            break;
        }
        if val < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDED: [Easing; 18] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::BounceIn,
        Easing::BounceOut,
    ];

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_endpoints() {
        for easing in BOUNDED {
            assert!(approx(easing.apply(0.0), 0.0), "{easing:?} at 0");
            assert!(approx(easing.apply(1.0), 1.0), "{easing:?} at 1");
        }
        assert!(approx(Easing::SpringIn.apply(0.0), 0.0));
        assert!(approx(Easing::SpringOut.apply(1.0), 1.0));
    }

    #[test]
    fn test_linear_is_identity() {
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            assert_eq!(Easing::Linear.apply(t), t);
        }
    }

    #[test]
    fn test_bounded_variants_stay_in_unit_range() {
        for easing in BOUNDED {
            assert!(!easing.overshoots());
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{easing:?} gave {v}");
            }
        }
    }

    #[test]
    fn test_spring_overshoots() {
        assert!(Easing::SpringOut.overshoots());
        assert!(Easing::SpringOut.apply(0.7) > 1.0);
        assert!(Easing::SpringIn.apply(0.2) < 0.0);
    }

    #[test]
    fn test_cubic_bezier_linear_control_points() {
        let easing = Easing::CubicBezier(0.25, 0.25, 0.75, 0.75);
        for t in [0.1, 0.3, 0.5, 0.9] {
            assert!((easing.apply(t) - t).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cubic_bezier_css_curves() {
        // CSS `ease` and `ease-in-out` keyword curves
        let ease = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);
        assert!((ease.apply(0.5) - 0.802_403_4).abs() < 1e-4);

        let ease_in_out = Easing::CubicBezier(0.42, 0.0, 0.58, 1.0);
        assert!((ease_in_out.apply(0.25) - 0.129_162).abs() < 1e-4);
        assert!((ease_in_out.apply(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }

    #[test]
    fn test_cubic_bezier_overshoot_detection() {
        assert!(Easing::CubicBezier(0.3, -0.5, 0.7, 1.5).overshoots());
        assert!(!Easing::CubicBezier(0.42, 0.0, 0.58, 1.0).overshoots());
    }

    #[test]
    fn test_custom() {
        fn half(t: f64) -> f64 {
            t / 2.0
        }
        assert_eq!(Easing::Custom(half).apply(0.5), 0.25);
    }
}
