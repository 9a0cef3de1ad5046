use crate::types::Rotation;

const SENSOR_ORIENTATION_INVERSE_DEGREES: u32 = 270;

/// Clockwise degrees the sensor image must be rotated to appear upright for
/// the given display rotation.
///
/// Sensors mounted at 270° use the inverse table; every other mounting is
/// treated as the common 90° case.
pub fn jpeg_orientation(sensor_orientation: u32, rotation: Rotation) -> u32 {
    if sensor_orientation % 360 == SENSOR_ORIENTATION_INVERSE_DEGREES {
        match rotation {
            Rotation::Deg0 => 270,
            Rotation::Deg90 => 180,
            Rotation::Deg180 => 90,
            Rotation::Deg270 => 0,
        }
    } else {
        match rotation {
            Rotation::Deg0 => 90,
            Rotation::Deg90 => 0,
            Rotation::Deg180 => 270,
            Rotation::Deg270 => 180,
        }
    }
}
