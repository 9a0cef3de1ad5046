use crate::types::Rect;

/// Zoom factors closer than this compare equal.
pub const ZOOM_EPSILON: f32 = 1e-3;

/// Clamps `zoom` into `[1.0, max_zoom]`. A `max_zoom` below 1.0 is treated
/// as 1.0 (no digital zoom).
pub fn clamp_zoom(zoom: f32, max_zoom: f32) -> f32 {
    let max_zoom = if max_zoom.is_finite() { max_zoom.max(1.0) } else { 1.0 };
    zoom.clamp(1.0, max_zoom)
}

pub fn zoom_eq(a: f32, b: f32) -> bool {
    zoom_eq_within(a, b, ZOOM_EPSILON)
}

pub fn zoom_eq_within(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Sensor crop region for `zoom` over the active array.
///
/// `zoom <= 1.0` yields the full array; larger factors shrink the region
/// symmetrically by `((1 - 1/zoom) / 2) * dimension` on each side.
pub fn crop_rect(active_array: Rect, zoom: f32) -> Rect {
    if zoom.is_nan() || zoom <= 1.0 {
        return active_array;
    }
    let factor = (1.0 - 1.0 / zoom as f64) / 2.0;
    let offset_x = (factor * active_array.width() as f64) as i32;
    let offset_y = (factor * active_array.height() as f64) as i32;
    Rect::new(
        active_array.left + offset_x,
        active_array.top + offset_y,
        active_array.right - offset_x,
        active_array.bottom - offset_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY: Rect = Rect::new(0, 0, 4000, 3000);

    #[test]
    fn test_unit_zoom_is_identity() {
        assert_eq!(crop_rect(ARRAY, 1.0), ARRAY);
        assert_eq!(crop_rect(ARRAY, 0.5), ARRAY);
    }

    #[test]
    fn test_double_zoom_halves_each_axis() {
        let crop = crop_rect(ARRAY, 2.0);
        assert_eq!(crop, Rect::new(1000, 750, 3000, 2250));
        assert_eq!(crop.width(), 2000);
        assert_eq!(crop.height(), 1500);
    }

    #[test]
    fn test_offset_array_keeps_origin() {
        let array = Rect::new(8, 8, 4008, 3008);
        let crop = crop_rect(array, 4.0);
        assert_eq!(crop, Rect::new(1508, 1133, 2508, 1883));
    }

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(0.2, 4.0), 1.0);
        assert_eq!(clamp_zoom(2.5, 4.0), 2.5);
        assert_eq!(clamp_zoom(9.0, 4.0), 4.0);
        assert_eq!(clamp_zoom(3.0, 0.0), 1.0);
    }

    #[test]
    fn test_zoom_eq_epsilon() {
        assert!(zoom_eq(2.0, 2.0004));
        assert!(!zoom_eq(2.0, 2.01));
    }
}
