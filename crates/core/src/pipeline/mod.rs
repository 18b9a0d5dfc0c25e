pub mod predictor;
pub mod result;
