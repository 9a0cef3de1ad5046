use super::request::AfMode;
use crate::types::{Facing, Rect, Size};
use serde::{Deserialize, Serialize};

/// Physical lens direction as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LensFacing {
    Back,
    Front,
    External,
}

impl LensFacing {
    /// External cameras are presented as back-facing.
    pub fn as_facing(self) -> Facing {
        match self {
            LensFacing::Front => Facing::Front,
            LensFacing::Back | LensFacing::External => Facing::Back,
        }
    }
}

impl From<Facing> for LensFacing {
    fn from(facing: Facing) -> Self {
        match facing {
            Facing::Back => LensFacing::Back,
            Facing::Front => LensFacing::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HardwareLevel {
    Legacy,
    Limited,
    Full,
    Level3,
}

/// Static capabilities of one camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraCharacteristics {
    pub facing: LensFacing,
    pub hardware_level: HardwareLevel,
    /// Clockwise mounting angle of the sensor, in degrees.
    pub sensor_orientation: u32,
    pub active_array: Rect,
    pub preview_sizes: Vec<Size>,
    pub jpeg_sizes: Vec<Size>,
    pub video_sizes: Vec<Size>,
    pub af_modes: Vec<AfMode>,
    pub flash_available: bool,
    pub max_digital_zoom: f32,
    pub max_af_regions: u32,
}

impl CameraCharacteristics {
    /// False when the lens only reports `Off` (fixed focus).
    pub fn supports_auto_focus(&self) -> bool {
        self.af_modes.iter().any(|m| *m != AfMode::Off)
    }

    pub fn supports_af_mode(&self, mode: AfMode) -> bool {
        self.af_modes.contains(&mode)
    }

    pub fn max_zoom(&self) -> f32 {
        if self.max_digital_zoom.is_finite() && self.max_digital_zoom >= 1.0 {
            self.max_digital_zoom
        } else {
            1.0
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.hardware_level == HardwareLevel::Legacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_focus() -> CameraCharacteristics {
        CameraCharacteristics {
            facing: LensFacing::External,
            hardware_level: HardwareLevel::Limited,
            sensor_orientation: 0,
            active_array: Rect::from_size(1280, 720),
            preview_sizes: vec![Size::new(1280, 720)],
            jpeg_sizes: vec![Size::new(1280, 720)],
            video_sizes: vec![Size::new(1280, 720)],
            af_modes: vec![AfMode::Off],
            flash_available: false,
            max_digital_zoom: f32::NAN,
            max_af_regions: 0,
        }
    }

    #[test]
    fn test_fixed_focus_has_no_auto_focus() {
        assert!(!fixed_focus().supports_auto_focus());
    }

    #[test]
    fn test_external_presents_as_back() {
        assert_eq!(fixed_focus().facing.as_facing(), Facing::Back);
    }

    #[test]
    fn test_invalid_max_zoom_is_one() {
        assert_eq!(fixed_focus().max_zoom(), 1.0);
    }
}
