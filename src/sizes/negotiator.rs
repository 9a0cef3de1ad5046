use super::size_map::SizeMap;
use crate::errors::CameraError;
use crate::types::{AspectRatio, Mode, Size, StreamConfiguration};

/// Height cap for the 4:3 fallback when no output size matches the ratio.
pub const FALLBACK_MAX_HEIGHT: u32 = 1080;

/// Hardware-reported candidate sizes for one camera.
#[derive(Debug, Clone, Default)]
pub struct SizeNegotiator {
    preview: SizeMap,
    image: SizeMap,
    video: SizeMap,
}

impl SizeNegotiator {
    /// Builds the candidate maps. Video sizes taller than
    /// `max_video_height` are not offered.
    pub fn new(preview: &[Size], image: &[Size], video: &[Size], max_video_height: u32) -> Self {
        let mut video: SizeMap = video.iter().collect();
        video.retain_sizes(|s| s.height <= max_video_height);
        Self {
            preview: preview.iter().collect(),
            image: image.iter().collect(),
            video,
        }
    }

    pub fn preview_sizes(&self) -> &SizeMap {
        &self.preview
    }

    pub fn image_sizes(&self) -> &SizeMap {
        &self.image
    }

    pub fn video_sizes(&self) -> &SizeMap {
        &self.video
    }

    pub fn output_sizes(&self, mode: Mode) -> &SizeMap {
        match mode {
            Mode::Image => &self.image,
            Mode::Video => &self.video,
        }
    }

    /// Preview sizes whose ratio is also offered for `mode`. Falls back to
    /// every preview size if the intersection is empty.
    pub fn preview_for_mode(&self, mode: Mode) -> SizeMap {
        let mut restricted = self.preview.clone();
        restricted.retain_ratios_of(self.output_sizes(mode));
        if restricted.is_empty() {
            log::warn!(
                "No preview aspect ratio is shared with {:?} outputs, using all preview sizes",
                mode
            );
            return self.preview.clone();
        }
        restricted
    }

    /// Aspect ratios offered to the user for `mode`.
    pub fn supported_aspect_ratios(&self, mode: Mode) -> Vec<AspectRatio> {
        self.preview_for_mode(mode).ratios().collect()
    }

    /// Picks the preview and output sizes for `mode`.
    ///
    /// An explicit `requested_size` that is offered for `mode` wins and
    /// dictates the ratio. Otherwise `requested_ratio` is kept if it
    /// survives the preview restriction, else the smallest surviving ratio
    /// is taken.
    pub fn negotiate(
        &self,
        requested_ratio: AspectRatio,
        mode: Mode,
        requested_size: Option<Size>,
    ) -> Result<StreamConfiguration, CameraError> {
        let outputs = self.output_sizes(mode);
        if self.preview.is_empty() {
            return Err(CameraError::camera("Camera reports no preview sizes"));
        }
        if outputs.is_empty() {
            return Err(CameraError::camera(format!(
                "Camera reports no {:?} output sizes",
                mode
            )));
        }

        let preview_map = self.preview_for_mode(mode);
        let explicit = requested_size.filter(|s| outputs.contains(s));

        let ratio = match explicit {
            Some(size) => size.aspect_ratio(),
            None if preview_map.has_ratio(&requested_ratio) => requested_ratio,
            None => preview_map
                .ratios()
                .next()
                .ok_or_else(|| CameraError::camera("No preview aspect ratio available"))?,
        };

        let output = match explicit {
            Some(size) => size,
            None => choose_output_size(outputs, &ratio)
                .ok_or_else(|| CameraError::camera("No output size available"))?,
        };

        let preview = choose_preview_size(&self.preview, output)
            .ok_or_else(|| CameraError::camera("No preview size available"))?;

        log::debug!(
            "Negotiated {:?}: ratio {} preview {} output {}",
            mode,
            ratio,
            preview,
            output
        );

        let (image_size, video_size) = match mode {
            Mode::Image => (Some(output), None),
            Mode::Video => (None, Some(output)),
        };
        Ok(StreamConfiguration {
            preview_size: preview,
            image_size,
            video_size,
            aspect_ratio: ratio,
        })
    }
}

/// Largest output with `ratio`; else the largest 4:3 size no taller than
/// [`FALLBACK_MAX_HEIGHT`]; else the largest overall.
fn choose_output_size(outputs: &SizeMap, ratio: &AspectRatio) -> Option<Size> {
    outputs
        .largest_with_ratio(ratio)
        .or_else(|| {
            outputs
                .all()
                .into_iter()
                .filter(|s| s.width * 3 == s.height * 4 && s.height <= FALLBACK_MAX_HEIGHT)
                .max()
        })
        .or_else(|| outputs.largest())
}

/// Smallest preview that covers `output` with the same ratio; else the
/// largest with the same ratio; else the largest overall.
fn choose_preview_size(previews: &SizeMap, output: Size) -> Option<Size> {
    let target = output.landscape();
    let ratio = target.aspect_ratio();
    let matching = previews.sizes(&ratio);

    matching
        .and_then(|bucket| {
            bucket
                .iter()
                .find(|s| s.width >= target.width && s.height >= target.height)
                .copied()
        })
        .or_else(|| matching.and_then(|bucket| bucket.last()).copied())
        .or_else(|| previews.largest())
}

/// One-shot negotiation over raw candidate lists.
pub fn negotiate(
    preview: &[Size],
    image: &[Size],
    video: &[Size],
    requested_ratio: AspectRatio,
    mode: Mode,
) -> Result<StreamConfiguration, CameraError> {
    SizeNegotiator::new(preview, image, video, u32::MAX).negotiate(requested_ratio, mode, None)
}
