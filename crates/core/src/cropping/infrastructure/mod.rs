pub mod nearest_cropper;
