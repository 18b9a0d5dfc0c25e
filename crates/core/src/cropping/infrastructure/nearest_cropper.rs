use image::imageops::FilterType;
use image::RgbImage;

use crate::cropping::domain::face_cropper::{FaceCrop, FaceCropper};
use crate::error::PredictionError;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::{ChannelOrder, Frame};

/// Crops faces out of a frame and resizes them with nearest-neighbor
/// interpolation.
///
/// Nearest-neighbor also handles the upsampling case: a detection smaller
/// than the model input is genuinely enlarged, not passed through.
/// Serialization emits RGB bytes, swapping the channels of BGR-native
/// frames at that point.
pub struct NearestCropper;

impl FaceCropper for NearestCropper {
    fn crop_and_resize(
        &self,
        frame: &Frame,
        boxes: &[FaceBox],
        target_width: u32,
        target_height: u32,
    ) -> Result<Vec<FaceCrop>, PredictionError> {
        boxes
            .iter()
            .map(|face_box| crop_one(frame, face_box, target_width, target_height))
            .collect()
    }
}

fn crop_one(
    frame: &Frame,
    face_box: &FaceBox,
    target_width: u32,
    target_height: u32,
) -> Result<FaceCrop, PredictionError> {
    if face_box.width() <= 0 || face_box.height() <= 0 {
        return Err(PredictionError::Shape {
            reason: format!("face box {face_box:?} has no area"),
        });
    }

    // Copy the sub-region in the frame's native channel order; the
    // RGB swap happens when the resized pixels are serialized below.
    let (w, h) = (face_box.width() as u32, face_box.height() as u32);
    let mut sub = RgbImage::new(w, h);
    for row in 0..h {
        for col in 0..w {
            let src_row = (face_box.top + row as i32) as usize;
            let src_col = (face_box.left + col as i32) as usize;
            let idx = (src_row * frame.width() as usize + src_col) * frame.channels() as usize;
            let px = &frame.data()[idx..idx + 3];
            sub.put_pixel(col, row, image::Rgb([px[0], px[1], px[2]]));
        }
    }

    let resized = image::imageops::resize(&sub, target_width, target_height, FilterType::Nearest);

    let mut data = Vec::with_capacity((target_width * target_height * 3) as usize);
    for pixel in resized.pixels() {
        let [c0, c1, c2] = pixel.0;
        match frame.order() {
            ChannelOrder::Rgb => data.extend_from_slice(&[c0, c1, c2]),
            ChannelOrder::Bgr => data.extend_from_slice(&[c2, c1, c0]),
        }
    }

    Ok(FaceCrop {
        data,
        width: target_width,
        height: target_height,
    })
}
