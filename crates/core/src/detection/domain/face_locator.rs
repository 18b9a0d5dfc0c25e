use std::path::Path;

use crate::error::PredictionError;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for face localization.
///
/// Implementations may hold detector state, hence `&mut self`. Every box a
/// locator returns is already widened by the variant's calibrated expansion
/// ratio and clamped to the frame bounds. Zero faces is a successful, empty
/// result.
///
/// The path and bytes overloads decode internally by default; a variant
/// that cannot serve one of them overrides it to return
/// [`PredictionError::NotSupported`] rather than degrading silently.
pub trait FaceLocator: Send {
    /// Calibrated expansion ratio applied to raw detections.
    fn expand_ratio(&self) -> f32;

    fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, PredictionError>;

    /// Decode an image file and locate all faces in it.
    fn locate_path(&mut self, path: &Path) -> Result<Vec<FaceBox>, PredictionError> {
        let frame = Frame::open(path)?;
        self.locate(&frame)
    }

    /// Decode an in-memory encoded image and locate all faces in it.
    fn locate_bytes(&mut self, bytes: &[u8]) -> Result<Vec<FaceBox>, PredictionError> {
        let frame = Frame::from_bytes(bytes)?;
        self.locate(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::ChannelOrder;

    struct FixedLocator {
        boxes: Vec<FaceBox>,
        seen: Vec<(u32, u32)>,
    }

    impl FaceLocator for FixedLocator {
        fn expand_ratio(&self) -> f32 {
            1.0
        }

        fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, PredictionError> {
            self.seen.push((frame.width(), frame.height()));
            Ok(self.boxes.clone())
        }
    }

    fn write_test_image(dir: &Path, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join("faces.png");
        image::RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_locate_path_decodes_and_delegates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 64, 48);
        let mut locator = FixedLocator {
            boxes: vec![FaceBox::new(1, 10, 10, 1)],
            seen: Vec::new(),
        };

        let boxes = locator.locate_path(&path).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(locator.seen, vec![(64, 48)]);
    }

    #[test]
    fn test_locate_path_missing_file_is_decode_error() {
        let mut locator = FixedLocator {
            boxes: Vec::new(),
            seen: Vec::new(),
        };
        let result = locator.locate_path(Path::new("/nonexistent/faces.png"));
        assert!(matches!(result, Err(PredictionError::Decode(_))));
        assert!(locator.seen.is_empty());
    }

    #[test]
    fn test_locate_bytes_decodes_and_delegates() {
        let mut encoded = Vec::new();
        image::RgbImage::new(8, 8)
            .write_to(
                &mut std::io::Cursor::new(&mut encoded),
                image::ImageFormat::Png,
            )
            .unwrap();
        let mut locator = FixedLocator {
            boxes: Vec::new(),
            seen: Vec::new(),
        };

        let boxes = locator.locate_bytes(&encoded).unwrap();
        assert!(boxes.is_empty());
        assert_eq!(locator.seen, vec![(8, 8)]);
    }

    #[test]
    fn test_locator_is_object_safe() {
        let mut boxed: Box<dyn FaceLocator> = Box::new(FixedLocator {
            boxes: Vec::new(),
            seen: Vec::new(),
        });
        let frame = Frame::new(vec![0; 12], 2, 2, 3, ChannelOrder::Rgb);
        assert!(boxed.locate(&frame).unwrap().is_empty());
    }
}
