//! Age and gender estimation for faces found in photographs.
//!
//! The crate composes three externally-supplied capabilities (face
//! localization, crop/resize, and tensor inference) behind small domain
//! traits, and assembles them into a [`pipeline::predictor::FacePredictor`]
//! that turns an image into one structured result per detected face.

pub mod cropping;
pub mod detection;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod preprocessing;
pub mod shared;
