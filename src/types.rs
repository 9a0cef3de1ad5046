//! Value types shared by the controller, the negotiator and the HAL.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A stream resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        AspectRatio::of(self.width, self.height)
    }

    /// Orders the dimensions as (longer, shorter).
    pub fn landscape(&self) -> Size {
        if self.width < self.height {
            Size::new(self.height, self.width)
        } else {
            *self
        }
    }
}

// Sizes sort by area so that `BTreeSet::last()` is the largest candidate.
impl Ord for Size {
    fn cmp(&self, other: &Self) -> Ordering {
        self.area()
            .cmp(&other.area())
            .then(self.width.cmp(&other.width))
    }
}

impl PartialOrd for Size {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Width:height in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    x: u32,
    y: u32,
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl AspectRatio {
    /// Builds a reduced ratio. Zero components are kept as-is so that the
    /// ratio never divides by zero; such a ratio matches nothing.
    pub fn of(x: u32, y: u32) -> Self {
        let g = gcd(x, y);
        if g == 0 {
            return Self { x, y };
        }
        Self { x: x / g, y: y / g }
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn matches(&self, size: &Size) -> bool {
        size.width as u64 * self.y as u64 == size.height as u64 * self.x as u64
            && size.width != 0
    }

    pub fn inverse(&self) -> AspectRatio {
        AspectRatio::of(self.y, self.x)
    }
}

impl Ord for AspectRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.x as u64 * other.y as u64;
        let rhs = other.x as u64 * self.y as u64;
        lhs.cmp(&rhs).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for AspectRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(':')
            .ok_or_else(|| format!("malformed aspect ratio: {s}"))?;
        let x: u32 = x
            .trim()
            .parse()
            .map_err(|_| format!("malformed aspect ratio: {s}"))?;
        let y: u32 = y
            .trim()
            .parse()
            .map_err(|_| format!("malformed aspect ratio: {s}"))?;
        if x == 0 || y == 0 {
            return Err(format!("aspect ratio components must be positive: {s}"));
        }
        Ok(AspectRatio::of(x, y))
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// Axis-aligned rectangle in sensor coordinates, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Image,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Back,
    Front,
}

impl Facing {
    pub fn flipped(self) -> Facing {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flash {
    #[default]
    Off,
    On,
    Torch,
    Auto,
    RedEye,
}

/// Display rotation reported by the orientation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u32) -> Option<Rotation> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// User-facing capture parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureParameters {
    pub mode: Mode,
    pub facing: Facing,
    pub flash: Flash,
    pub auto_focus: bool,
    pub zoom: f32,
}

impl Default for CaptureParameters {
    fn default() -> Self {
        Self {
            mode: Mode::Image,
            facing: Facing::Back,
            flash: Flash::Off,
            auto_focus: true,
            zoom: 1.0,
        }
    }
}

/// Sizes selected for one preview run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfiguration {
    pub preview_size: Size,
    pub image_size: Option<Size>,
    pub video_size: Option<Size>,
    pub aspect_ratio: AspectRatio,
}

impl StreamConfiguration {
    /// The output size used by `mode`.
    pub fn output_size(&self, mode: Mode) -> Option<Size> {
        match mode {
            Mode::Image => self.image_size,
            Mode::Video => self.video_size,
        }
    }
}

/// Partial parameter set merged into the current state by
/// `start_preview`/`restart_preview`. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewParams {
    pub mode: Option<Mode>,
    pub facing: Option<Facing>,
    pub flash: Option<Flash>,
    pub auto_focus: Option<bool>,
    pub zoom: Option<f32>,
    pub aspect_ratio: Option<AspectRatio>,
    pub image_size: Option<Size>,
    pub video_size: Option<Size>,
}

impl PreviewParams {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    pub fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = Some(auto_focus);
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    /// Overlays `other` on top of `self`.
    pub fn merge(self, other: PreviewParams) -> PreviewParams {
        PreviewParams {
            mode: other.mode.or(self.mode),
            facing: other.facing.or(self.facing),
            flash: other.flash.or(self.flash),
            auto_focus: other.auto_focus.or(self.auto_focus),
            zoom: other.zoom.or(self.zoom),
            aspect_ratio: other.aspect_ratio.or(self.aspect_ratio),
            image_size: other.image_size.or(self.image_size),
            video_size: other.video_size.or(self.video_size),
        }
    }
}
