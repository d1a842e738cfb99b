/// A weighted point in panel cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatPoint {
    pub col: f64,
    pub row: f64,
    pub weight: f64,
}

/// Heat density per terminal cell, each value in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    cols: u16,
    rows: u16,
    values: Vec<f64>,
}

impl DensityGrid {
    /// Splats every point over an elliptical kernel of `radius_cols` x
    /// `radius_rows` cells with a smooth falloff, scaled by `intensity`.
    pub fn accumulate<I>(
        cols: u16,
        rows: u16,
        points: I,
        radius_cols: f64,
        radius_rows: f64,
        intensity: f64,
    ) -> Self
    where
        I: IntoIterator<Item = HeatPoint>,
    {
        let mut values = vec![0.0; usize::from(cols) * usize::from(rows)];
        let radius_cols = radius_cols.max(0.5);
        let radius_rows = radius_rows.max(0.5);

        for point in points {
            if point.weight <= 0.0 {
                continue;
            }

            let (col_lo, col_hi) = span(point.col, radius_cols, cols);
            let (row_lo, row_hi) = span(point.row, radius_rows, rows);

            for row in row_lo..row_hi {
                for col in col_lo..col_hi {
                    let dx = (f64::from(col) + 0.5 - point.col) / radius_cols;
                    let dy = (f64::from(row) + 0.5 - point.row) / radius_rows;
                    let distance = dx.hypot(dy);
                    if distance >= 1.0 {
                        continue;
                    }
                    let falloff = distance.mul_add(-distance, 1.0).powi(2);
                    values[usize::from(row) * usize::from(cols) + usize::from(col)] +=
                        point.weight * intensity * falloff;
                }
            }
        }

        for value in &mut values {
            *value = value.clamp(0.0, 1.0);
        }

        Self { cols, rows, values }
    }

    pub const fn cols(&self) -> u16 {
        self.cols
    }

    pub const fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, col: u16, row: u16) -> f64 {
        if col >= self.cols || row >= self.rows {
            return 0.0;
        }
        self.values[usize::from(row) * usize::from(self.cols) + usize::from(col)]
    }

    pub fn peak(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Cell index range `[lo, hi)` covered by a kernel centred at `centre`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn span(centre: f64, radius: f64, len: u16) -> (u16, u16) {
    let lo = (centre - radius).floor().clamp(0.0, f64::from(len)) as u16;
    let hi = (centre + radius).ceil().clamp(0.0, f64::from(len)) as u16;
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_cold() {
        let grid = DensityGrid::accumulate(10, 5, Vec::new(), 2.0, 1.0, 1.0);
        assert_eq!(grid.peak(), 0.0);
        assert_eq!((grid.cols(), grid.rows()), (10, 5));
    }

    #[test]
    fn point_heats_its_own_cell_most() {
        let point = HeatPoint { col: 5.5, row: 2.5, weight: 0.5 };
        let grid = DensityGrid::accumulate(11, 5, [point], 3.0, 2.0, 1.0);
        let centre = grid.get(5, 2);
        assert!((centre - 0.5).abs() < 1e-9);
        assert!(grid.get(6, 2) < centre);
        assert!(grid.get(6, 2) > 0.0);
        assert_eq!(grid.get(0, 0), 0.0);
    }

    #[test]
    fn density_saturates_at_one() {
        let points = (0..10).map(|_| HeatPoint { col: 1.5, row: 1.5, weight: 1.0 });
        let grid = DensityGrid::accumulate(3, 3, points, 1.0, 1.0, 3.0);
        assert_eq!(grid.get(1, 1), 1.0);
        assert_eq!(grid.peak(), 1.0);
    }

    #[test]
    fn points_outside_panel_only_bleed_in() {
        let outside = HeatPoint { col: -0.5, row: 1.5, weight: 1.0 };
        let far = HeatPoint { col: -50.0, row: 1.5, weight: 1.0 };
        let grid = DensityGrid::accumulate(4, 3, [outside, far], 2.0, 1.0, 1.0);
        assert!(grid.get(0, 1) > 0.0);
        assert_eq!(grid.get(3, 1), 0.0);
        assert_eq!(grid.get(9, 9), 0.0);
    }

    #[test]
    fn weightless_points_are_ignored() {
        let point = HeatPoint { col: 1.5, row: 1.5, weight: 0.0 };
        let grid = DensityGrid::accumulate(3, 3, [point], 1.0, 1.0, 1.0);
        assert_eq!(grid.peak(), 0.0);
    }
}
