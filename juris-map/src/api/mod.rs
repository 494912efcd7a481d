//! HTTP API handlers for juris-map

pub mod health;
pub mod journeys;
pub mod map;
pub mod phases;
pub mod progress;
pub mod scroll;
pub mod selection;
pub mod stats;
pub mod views;

pub use health::health_routes;
pub use journeys::journey_routes;
pub use map::map_routes;
pub use phases::phase_routes;
pub use progress::progress_routes;
pub use scroll::scroll_routes;
pub use selection::selection_routes;
pub use stats::stats_routes;
