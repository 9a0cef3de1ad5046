//! Pure sensor-space geometry: zoom crop, tap-to-focus metering and
//! orientation mapping. No I/O, no threading.

pub mod focus;
pub mod orientation;
pub mod zoom;

pub use focus::{metering_rect, metering_rect_with_side, FOCUS_AREA_SIZE};
pub use orientation::jpeg_orientation;
pub use zoom::{clamp_zoom, crop_rect, zoom_eq, zoom_eq_within, ZOOM_EPSILON};
