//! Declarative heat layer style: piecewise-linear curves over volume, zoom
//! and density.

use ratatui::style::Color;

/// Linear interpolation through `(input, output)` stops, clamped at both ends.
#[derive(Debug, Clone, Copy)]
pub struct Curve {
    stops: &'static [(f64, f64)],
}

impl Curve {
    pub const fn linear(stops: &'static [(f64, f64)]) -> Self {
        Self { stops }
    }

    pub fn eval(&self, input: f64) -> f64 {
        let Some(&(first_in, first_out)) = self.stops.first() else {
            return 0.0;
        };
        if input <= first_in {
            return first_out;
        }

        for pair in self.stops.windows(2) {
            let (lo_in, lo_out) = pair[0];
            let (hi_in, hi_out) = pair[1];
            if input <= hi_in {
                let span = hi_in - lo_in;
                if span <= 0.0 {
                    return hi_out;
                }
                let t = (input - lo_in) / span;
                return (hi_out - lo_out).mul_add(t, lo_out);
            }
        }

        self.stops.last().map_or(first_out, |&(_, out)| out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn transparent(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0.0 }
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
            a: (other.a - self.a).mul_add(t, self.a),
        }
    }

    /// Flattens onto a black terminal background.
    pub fn over_black(self, opacity: f64) -> Color {
        let alpha = (self.a * opacity).clamp(0.0, 1.0);
        Color::Rgb(
            scale_channel(self.r, alpha),
            scale_channel(self.g, alpha),
            scale_channel(self.b, alpha),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(to) - f64::from(from))
        .mul_add(t, f64::from(from))
        .round()
        .clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_channel(channel: u8, alpha: f64) -> u8 {
    (f64::from(channel) * alpha).round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, Copy)]
pub struct ColorRamp {
    stops: &'static [(f64, Rgba)],
}

impl ColorRamp {
    pub const fn new(stops: &'static [(f64, Rgba)]) -> Self {
        Self { stops }
    }

    pub fn eval(&self, density: f64) -> Rgba {
        let Some(&(first_at, first)) = self.stops.first() else {
            return Rgba::transparent(0, 0, 0);
        };
        if density <= first_at {
            return first;
        }

        for pair in self.stops.windows(2) {
            let (lo_at, lo) = pair[0];
            let (hi_at, hi) = pair[1];
            if density <= hi_at {
                let span = hi_at - lo_at;
                if span <= 0.0 {
                    return hi;
                }
                return lo.lerp(hi, (density - lo_at) / span);
            }
        }

        self.stops.last().map_or(first, |&(_, color)| color)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeatmapStyle {
    /// Forecast volume to point weight
    pub weight: Curve,
    /// Zoom to global density multiplier
    pub intensity: Curve,
    /// Zoom to kernel radius in map pixels
    pub radius: Curve,
    /// Zoom to layer opacity
    pub opacity: Curve,
    /// Density to colour
    pub color: ColorRamp,
}

pub const HEATMAP_STYLE: HeatmapStyle = HeatmapStyle {
    // 15 calls saturates the gradient
    weight: Curve::linear(&[(0.0, 0.0), (15.0, 1.0)]),
    intensity: Curve::linear(&[(0.0, 1.0), (9.0, 3.0)]),
    radius: Curve::linear(&[(0.0, 2.0), (9.0, 20.0)]),
    opacity: Curve::linear(&[(2.0, 0.4), (9.0, 0.9), (22.0, 0.95)]),
    color: ColorRamp::new(DENSITY_RAMP),
};

const DENSITY_RAMP: &[(f64, Rgba)] = &[
    (0.0, Rgba::transparent(33, 102, 172)),
    (0.2, Rgba::rgb(103, 169, 207)),
    (0.4, Rgba::rgb(209, 229, 240)),
    (0.6, Rgba::rgb(253, 219, 199)),
    (0.8, Rgba::rgb(239, 138, 98)),
    (1.0, Rgba::rgb(178, 24, 43)),
];

/// Legend swatches, highest demand first.
pub const LEGEND: [(Color, &str); 4] = [
    (Color::Red, "high"),
    (Color::Rgb(255, 165, 0), ""),
    (Color::Yellow, ""),
    (Color::White, "low"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn curve_interpolates_and_clamps() {
        let weight = HEATMAP_STYLE.weight;
        assert!(close(weight.eval(-3.0), 0.0));
        assert!(close(weight.eval(7.5), 0.5));
        assert!(close(weight.eval(15.0), 1.0));
        assert!(close(weight.eval(40.0), 1.0));

        let opacity = HEATMAP_STYLE.opacity;
        assert!(close(opacity.eval(0.0), 0.4));
        assert!(close(opacity.eval(9.0), 0.9));
        assert!(close(opacity.eval(15.5), 0.925));
        assert!(close(opacity.eval(30.0), 0.95));
    }

    #[test]
    fn zoom_curves_match_layer_config() {
        assert!(close(HEATMAP_STYLE.radius.eval(8.0), 18.0));
        assert!(close(HEATMAP_STYLE.intensity.eval(4.5), 2.0));
    }

    #[test]
    fn empty_curve_is_zero() {
        assert!(close(Curve::linear(&[]).eval(5.0), 0.0));
    }

    #[test]
    fn color_ramp_hits_stops_and_blends_between() {
        let ramp = HEATMAP_STYLE.color;
        assert_eq!(ramp.eval(0.0).a, 0.0);
        assert_eq!(ramp.eval(1.0), Rgba::rgb(178, 24, 43));
        assert_eq!(ramp.eval(2.0), Rgba::rgb(178, 24, 43));

        let mid = ramp.eval(0.1);
        assert_eq!((mid.r, mid.g, mid.b), (68, 136, 190));
        assert!(close(mid.a, 0.5));
    }

    #[test]
    fn transparent_colour_flattens_to_black() {
        assert_eq!(Rgba::transparent(33, 102, 172).over_black(1.0), Color::Rgb(0, 0, 0));
        assert_eq!(Rgba::rgb(200, 100, 50).over_black(0.5), Color::Rgb(100, 50, 25));
    }
}
