use glam::DVec3;

/// `((n % m) + m) % m`, kept in this form so negative hues wrap the same
/// way the reference renderer wraps them.
#[inline]
fn euclidean_modulo(n: f64, m: f64) -> f64 {
    ((n % m) + m) % m
}

#[inline]
fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

/// Converts hue/saturation/lightness to linear RGB in `[0, 1]`.
///
/// Hue wraps around `1.0`; saturation and lightness are clamped.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> DVec3 {
    let h = euclidean_modulo(h, 1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return DVec3::splat(l);
    }

    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;

    DVec3::new(
        hue_to_channel(q, p, h + 1.0 / 3.0),
        hue_to_channel(q, p, h),
        hue_to_channel(q, p, h - 1.0 / 3.0),
    )
}
