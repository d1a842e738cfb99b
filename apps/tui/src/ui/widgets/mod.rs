pub mod charts;
pub mod heatmap;
pub mod popup;
pub mod tables;
