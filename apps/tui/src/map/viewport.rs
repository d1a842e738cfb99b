use std::f64::consts::PI;

/// Charlotte, NC
pub const DEFAULT_CENTER: (f64, f64) = (-80.75, 35.2464);
pub const DEFAULT_ZOOM: f64 = 8.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 21.0;
pub const ZOOM_SNAP: f64 = 0.5;

const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Map pixels covered by one terminal cell. Cells are roughly twice as tall
/// as they are wide.
pub const PX_PER_COL: f64 = 8.0;
pub const PX_PER_ROW: f64 = 16.0;

/// Web-mercator camera over the terminal map panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_lon: DEFAULT_CENTER.0,
            center_lat: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_SNAP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_SNAP);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        let snapped = (zoom / ZOOM_SNAP).round() * ZOOM_SNAP;
        self.zoom = snapped.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Shifts the centre by whole terminal cells (east and south positive).
    pub fn pan(&mut self, cols: f64, rows: f64) {
        let world = self.world_size();
        let (x, y) = mercator(self.center_lon, self.center_lat);
        let x = cols.mul_add(PX_PER_COL / world, x);
        let y = rows.mul_add(PX_PER_ROW / world, y).clamp(0.0, 1.0);
        let (lon, lat) = inverse_mercator(x.rem_euclid(1.0), y);
        self.center_lon = lon;
        self.center_lat = lat;
    }

    /// Fractional `(column, row)` of a coordinate inside a `cols` x `rows`
    /// panel, which may fall outside the panel.
    pub fn to_cell(&self, lon: f64, lat: f64, cols: u16, rows: u16) -> (f64, f64) {
        let world = self.world_size();
        let (cx, cy) = mercator(self.center_lon, self.center_lat);
        let (x, y) = mercator(lon, lat);
        let col = ((x - cx) * world).mul_add(1.0 / PX_PER_COL, f64::from(cols) / 2.0);
        let row = ((y - cy) * world).mul_add(1.0 / PX_PER_ROW, f64::from(rows) / 2.0);
        (col, row)
    }
}

/// Normalised mercator coordinates: x east, y south, both in `[0, 1]`.
fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn inverse_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = x.mul_add(360.0, -180.0);
    let lat = (PI * 2.0f64.mul_add(-y, 1.0)).sinh().atan().to_degrees();
    (lon, lat)
}
