//! Terminal rendition of the demand heat layer.

pub mod density;
pub mod style;
pub mod viewport;

pub use density::{DensityGrid, HeatPoint};
pub use style::{HeatmapStyle, HEATMAP_STYLE};
pub use viewport::{Viewport, PX_PER_COL, PX_PER_ROW};

use crate::domain::{ClusterBoundaries, Feature};
use crate::forecast::TimeWindow;

/// Map state owned by the dashboard for its whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct MapView {
    pub viewport: Viewport,
    pub boundaries: Option<ClusterBoundaries>,
    pub show_boundaries: bool,
}

impl MapView {
    pub fn new() -> Self {
        Self {
            show_boundaries: true,
            ..Self::default()
        }
    }

    pub fn toggle_boundaries(&mut self) {
        self.show_boundaries = !self.show_boundaries;
    }

    /// Boundaries to draw, if loaded and enabled.
    pub fn visible_boundaries(&self) -> Option<&ClusterBoundaries> {
        self.boundaries.as_ref().filter(|_| self.show_boundaries)
    }

    /// Heat density for the features active in `window`.
    pub fn density(
        &self,
        features: &[Feature],
        window: TimeWindow,
        cols: u16,
        rows: u16,
        style: &HeatmapStyle,
    ) -> DensityGrid {
        let zoom = self.viewport.zoom;
        let radius_px = style.radius.eval(zoom);
        let points = window.filter(features).filter_map(|feature| {
            let (lon, lat) = feature.position()?;
            let (col, row) = self.viewport.to_cell(lon, lat, cols, rows);
            Some(HeatPoint {
                col,
                row,
                weight: style.weight.eval(feature.volume()),
            })
        });

        DensityGrid::accumulate(
            cols,
            rows,
            points,
            radius_px / PX_PER_COL,
            radius_px / PX_PER_ROW,
            style.intensity.eval(zoom),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClusterId, FeatureProperties, Geometry};
    use crate::forecast::DAY_MS;

    fn point(time: i64, volume: f64) -> Feature {
        Feature {
            geometry: Some(Geometry::Point {
                coordinates: vec![viewport::DEFAULT_CENTER.0, viewport::DEFAULT_CENTER.1],
            }),
            properties: FeatureProperties {
                time,
                volume,
                cluster_id: ClusterId::Number(1),
                cluster_volume: None,
            },
        }
    }

    #[test]
    fn only_features_in_window_produce_heat() {
        let view = MapView::new();
        let features = vec![point(0, 15.0), point(3 * DAY_MS, 15.0)];

        let active = view.density(&features, TimeWindow::starting_at(0), 40, 20, &HEATMAP_STYLE);
        assert!(active.get(20, 10) > 0.9);

        let idle = view.density(&features, TimeWindow::starting_at(DAY_MS + 1), 40, 20, &HEATMAP_STYLE);
        assert_eq!(idle.peak(), 0.0);
    }

    #[test]
    fn boundaries_toggle_hides_them() {
        let mut view = MapView::new();
        view.boundaries = Some(ClusterBoundaries::default());
        assert!(view.visible_boundaries().is_some());
        view.toggle_boundaries();
        assert!(view.visible_boundaries().is_none());
    }
}
