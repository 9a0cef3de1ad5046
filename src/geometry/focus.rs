use crate::types::Rect;

/// Default side of the metering square, in sensor units.
pub const FOCUS_AREA_SIZE: u32 = 300;

/// Maps a tap on the preview view into a sensor-space metering rectangle.
///
/// `display_orientation` is the clockwise rotation, in degrees, between the
/// sensor and the view (see [`jpeg_orientation`](super::jpeg_orientation)).
/// Values other than 0, 180 and 270 are treated as 90. Taps outside the
/// view are clamped to its edges. The result is always contained in
/// `active_array`.
pub fn metering_rect(
    active_array: Rect,
    display_orientation: u32,
    view_width: u32,
    view_height: u32,
    tap_x: f32,
    tap_y: f32,
) -> Rect {
    metering_rect_with_side(
        active_array,
        display_orientation,
        view_width,
        view_height,
        tap_x,
        tap_y,
        FOCUS_AREA_SIZE,
    )
}

/// [`metering_rect`] with an explicit square side.
pub fn metering_rect_with_side(
    active_array: Rect,
    display_orientation: u32,
    view_width: u32,
    view_height: u32,
    tap_x: f32,
    tap_y: f32,
    side: u32,
) -> Rect {
    let sensor_w = active_array.width().max(0) as f64;
    let sensor_h = active_array.height().max(0) as f64;

    let nx = normalize(tap_x, view_width);
    let ny = normalize(tap_y, view_height);

    let (fx, fy) = match display_orientation % 360 {
        0 => (nx * sensor_w, ny * sensor_h),
        180 => ((1.0 - nx) * sensor_w, (1.0 - ny) * sensor_h),
        270 => ((1.0 - ny) * sensor_w, nx * sensor_h),
        _ => (ny * sensor_w, (1.0 - nx) * sensor_h),
    };

    let half = side as f64 / 2.0;
    let left = (fx - half).max(0.0) as i32;
    let top = (fy - half).max(0.0) as i32;
    let right = (left as i64 + side as i64).min(sensor_w as i64) as i32;
    let bottom = (top as i64 + side as i64).min(sensor_h as i64) as i32;

    Rect::new(
        active_array.left + left.min(right),
        active_array.top + top.min(bottom),
        active_array.left + right,
        active_array.top + bottom,
    )
}

fn normalize(value: f32, extent: u32) -> f64 {
    if extent == 0 || !value.is_finite() {
        return 0.5;
    }
    (value as f64 / extent as f64).clamp(0.0, 1.0)
}
