// animation.rs — 逐帧平滑的公共换算

use std::time::Duration;

/// Smoothing fractions are tuned per frame at this rate.
pub const REFERENCE_FRAME: Duration = Duration::from_micros(16_667);

/// Fraction of the remaining distance to cover after `dt`, given the fraction
/// covered per reference frame. One reference frame yields `per_frame` itself.
pub fn frame_fraction(per_frame: f32, dt: Duration) -> f32 {
    if per_frame >= 1.0 {
        return 1.0;
    }
    if per_frame <= 0.0 || dt.is_zero() {
        return 0.0;
    }
    let frames = dt.as_secs_f32() / REFERENCE_FRAME.as_secs_f32();
    (1.0 - (1.0 - per_frame).powf(frames)).clamp(0.0, 1.0)
}
