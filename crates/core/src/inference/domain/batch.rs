use ndarray::Array4;

use crate::cropping::domain::face_cropper::FaceCrop;
use crate::error::PredictionError;

/// Stack N face crops into one `(N, height, width, depth)` float tensor.
///
/// Each crop's byte buffer is widened to `f32` and reshaped to one batch
/// row; rows keep the input order. A buffer whose length does not match
/// `height * width * depth` is an integration bug and fails loudly.
pub fn stack_crops(
    crops: &[FaceCrop],
    height: u32,
    width: u32,
    depth: u32,
) -> Result<Array4<f32>, PredictionError> {
    let expected = (height * width * depth) as usize;
    let mut flat = Vec::with_capacity(crops.len() * expected);

    for (index, crop) in crops.iter().enumerate() {
        if crop.data.len() != expected {
            return Err(PredictionError::Shape {
                reason: format!(
                    "crop {index} holds {} bytes, expected {expected} ({height}x{width}x{depth})",
                    crop.data.len()
                ),
            });
        }
        flat.extend(crop.data.iter().map(|&byte| byte as f32));
    }

    Array4::from_shape_vec(
        (
            crops.len(),
            height as usize,
            width as usize,
            depth as usize,
        ),
        flat,
    )
    .map_err(|e| PredictionError::Shape {
        reason: e.to_string(),
    })
}
