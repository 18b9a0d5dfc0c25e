use crate::error::PredictionError;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// A face region resized to a fixed model input size.
///
/// `data` is always row-major, channel-interleaved RGB of exactly
/// `width * height * 3` bytes, whatever the source frame's native layout
/// was. Crops pair with their originating boxes by index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceCrop {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Domain interface for extracting fixed-size face crops.
pub trait FaceCropper: Send {
    /// Extract each box from the frame and resize it to exactly
    /// `target_width x target_height`, in box order.
    fn crop_and_resize(
        &self,
        frame: &Frame,
        boxes: &[FaceBox],
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<FaceCrop>, PredictionError>;
}
