pub mod face_cropper;
