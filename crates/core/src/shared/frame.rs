use std::path::Path;

use ndarray::ArrayView3;

use crate::error::PredictionError;

/// Channel layout of a frame's pixel bytes.
///
/// Decoding through the `image` crate always yields [`ChannelOrder::Rgb`];
/// `Bgr` frames enter through interop constructors for libraries whose
/// native order is reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A decoded image: contiguous bytes in row-major, channel-interleaved
/// order, tagged with the producing library's channel layout.
///
/// The crop stage owns the conversion to RGB; everything downstream of it
/// treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, order: ChannelOrder) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            order,
        }
    }

    /// Decode an image file into an RGB frame.
    pub fn open(path: &Path) -> Result<Self, PredictionError> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self::new(rgb.into_raw(), width, height, 3, ChannelOrder::Rgb))
    }

    /// Decode an in-memory encoded image into an RGB frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PredictionError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self::new(rgb.into_raw(), width, height, 3, ChannelOrder::Rgb))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// The pixel at `(row, col)` in RGB order, regardless of the frame's
    /// native layout.
    pub fn rgb_at(&self, row: usize, col: usize) -> [u8; 3] {
        let idx = (row * self.width as usize + col) * self.channels as usize;
        let px = &self.data[idx..idx + 3];
        match self.order {
            ChannelOrder::Rgb => [px[0], px[1], px[2]],
            ChannelOrder::Bgr => [px[2], px[1], px[0]],
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, ChannelOrder::Rgb);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.order(), ChannelOrder::Rgb);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, ChannelOrder::Rgb);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, ChannelOrder::Rgb);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 3, ChannelOrder::Rgb);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[1, 0, 0]], 255); // R
        assert_eq!(arr[[1, 0, 1]], 0); // G
        assert_eq!(arr[[1, 0, 2]], 0); // B
    }

    #[test]
    fn test_rgb_at_passes_rgb_through() {
        let frame = Frame::new(vec![10, 20, 30], 1, 1, 3, ChannelOrder::Rgb);
        assert_eq!(frame.rgb_at(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_rgb_at_swaps_bgr() {
        let frame = Frame::new(vec![30, 20, 10], 1, 1, 3, ChannelOrder::Bgr);
        assert_eq!(frame.rgb_at(0, 0), [10, 20, 30]);
    }

    #[test]
    fn test_open_decodes_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");
        let mut img = image::RgbImage::new(4, 3);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();

        let frame = Frame::open(&path).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.order(), ChannelOrder::Rgb);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_open_nonexistent_is_decode_error() {
        let result = Frame::open(Path::new("/nonexistent/test.png"));
        assert!(matches!(result, Err(PredictionError::Decode(_))));
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let mut img = image::RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let mut encoded = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut encoded),
            image::ImageFormat::Png,
        )
        .unwrap();

        let frame = Frame::from_bytes(&encoded).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.rgb_at(0, 0), [255, 0, 0]);
    }

    #[test]
    fn test_from_bytes_garbage_is_decode_error() {
        let result = Frame::from_bytes(&[0u8; 16]);
        assert!(matches!(result, Err(PredictionError::Decode(_))));
    }
}
