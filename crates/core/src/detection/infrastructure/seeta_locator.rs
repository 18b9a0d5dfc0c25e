use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::error::PredictionError;
use crate::shared::constants::SEETA_EXPAND_RATIO;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Minimum face size in pixels passed to the detector.
const MIN_FACE_SIZE: u32 = 20;

/// Detector score threshold; SeetaFace scores are unbounded, 2.0 filters
/// most false positives without dropping small frontal faces.
const SCORE_THRESH: f64 = 2.0;

/// Image pyramid scale step.
const PYRAMID_SCALE_FACTOR: f32 = 0.8;

/// Sliding window step in both axes.
const SLIDE_WINDOW_STEP: u32 = 4;

/// Face locator backed by the SeetaFace funnelled cascade (`rustface`).
///
/// The cascade operates on grayscale, so frames are reduced to luma
/// internally. A detector instance is created per call from the shared
/// model; the model itself is loaded once at construction.
pub struct SeetaFaceLocator {
    model: rustface::Model,
    expand_ratio: f32,
}

impl std::fmt::Debug for SeetaFaceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeetaFaceLocator")
            .field("expand_ratio", &self.expand_ratio)
            .finish_non_exhaustive()
    }
}

impl SeetaFaceLocator {
    /// Load a SeetaFace model file and build a locator with the cascade's
    /// calibrated expansion ratio.
    pub fn new(model_path: &Path) -> Result<Self, PredictionError> {
        Self::with_ratio(model_path, SEETA_EXPAND_RATIO)
    }

    pub fn with_ratio(model_path: &Path, expand_ratio: f32) -> Result<Self, PredictionError> {
        let file = File::open(model_path).map_err(|e| PredictionError::ModelLoad {
            path: model_path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model =
            rustface::read_model(BufReader::new(file)).map_err(|e| PredictionError::ModelLoad {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            model,
            expand_ratio,
        })
    }
}

/// Reduce a frame to a row-major luma buffer (Rec. 601 weights).
fn to_luma(frame: &Frame) -> Vec<u8> {
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let mut gray = Vec::with_capacity(w * h);
    for row in 0..h {
        for col in 0..w {
            let [r, g, b] = frame.rgb_at(row, col);
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            gray.push(luma.round() as u8);
        }
    }
    gray
}

impl FaceLocator for SeetaFaceLocator {
    fn expand_ratio(&self) -> f32 {
        self.expand_ratio
    }

    fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, PredictionError> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let gray = to_luma(frame);
        let faces = detector.detect(&rustface::ImageData::new(
            &gray,
            frame.width(),
            frame.height(),
        ));
        log::debug!("seeta cascade found {} face(s)", faces.len());

        let boxes = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox::new(
                    bbox.y(),
                    bbox.x() + bbox.width() as i32,
                    bbox.y() + bbox.height() as i32,
                    bbox.x(),
                )
                .clamped(frame.width(), frame.height())
                .expand(frame.width(), frame.height(), self.expand_ratio)
            })
            .collect();

        Ok(boxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::ChannelOrder;

    #[test]
    fn test_missing_model_is_model_load_error() {
        let result = SeetaFaceLocator::new(Path::new("/nonexistent/seeta.bin"));
        match result {
            Err(PredictionError::ModelLoad { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/seeta.bin"));
            }
            other => panic!("expected ModelLoad error, got {other:?}"),
        }
    }

    #[test]
    fn test_luma_of_white_is_white() {
        let frame = Frame::new(vec![255; 3], 1, 1, 3, ChannelOrder::Rgb);
        assert_eq!(to_luma(&frame), vec![255]);
    }

    #[test]
    fn test_luma_weights_channels() {
        // Pure green carries the largest luma weight.
        let red = Frame::new(vec![255, 0, 0], 1, 1, 3, ChannelOrder::Rgb);
        let green = Frame::new(vec![0, 255, 0], 1, 1, 3, ChannelOrder::Rgb);
        let blue = Frame::new(vec![0, 0, 255], 1, 1, 3, ChannelOrder::Rgb);
        let (r, g, b) = (to_luma(&red)[0], to_luma(&green)[0], to_luma(&blue)[0]);
        assert!(g > r && r > b);
    }

    #[test]
    fn test_luma_respects_channel_order() {
        // The same physical color through both layouts yields the same luma.
        let rgb = Frame::new(vec![200, 50, 10], 1, 1, 3, ChannelOrder::Rgb);
        let bgr = Frame::new(vec![10, 50, 200], 1, 1, 3, ChannelOrder::Bgr);
        assert_eq!(to_luma(&rgb), to_luma(&bgr));
    }
}
