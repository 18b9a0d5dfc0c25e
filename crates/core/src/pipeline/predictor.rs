use std::path::Path;

use ndarray::Array4;

use crate::cropping::domain::face_cropper::FaceCropper;
use crate::detection::domain::face_locator::FaceLocator;
use crate::error::PredictionError;
use crate::inference::domain::batch::stack_crops;
use crate::inference::domain::runner::{InferenceRunner, ModelOutput};
use crate::pipeline::result::{FaceResult, Gender, ResultSet};
use crate::preprocessing::domain::preprocessor::Preprocessor;
use crate::shared::constants::{
    DEFAULT_COLOR_DEPTH, DEFAULT_CROP_HEIGHT, DEFAULT_CROP_WIDTH, GENDER_THRESHOLD,
};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// The sub-components a predictor variant shares with its successors.
///
/// Locator, cropper, and preprocessor chain are independent of which
/// model is wired in; swapping variants moves these parts into the new
/// predictor instead of rebuilding them.
pub struct PipelineParts {
    pub locator: Box<dyn FaceLocator>,
    pub cropper: Box<dyn FaceCropper>,
    pub preprocessors: Vec<Box<dyn Preprocessor>>,
    pub input_width: u32,
    pub input_height: u32,
    pub input_depth: u32,
}

impl PipelineParts {
    pub fn new(locator: Box<dyn FaceLocator>, cropper: Box<dyn FaceCropper>) -> Self {
        Self {
            locator,
            cropper,
            preprocessors: Vec::new(),
            input_width: DEFAULT_CROP_WIDTH,
            input_height: DEFAULT_CROP_HEIGHT,
            input_depth: DEFAULT_COLOR_DEPTH,
        }
    }

    pub fn with_preprocessors(mut self, preprocessors: Vec<Box<dyn Preprocessor>>) -> Self {
        self.preprocessors = preprocessors;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32, depth: u32) -> Self {
        self.input_width = width;
        self.input_height = height;
        self.input_depth = depth;
        self
    }
}

/// Which predictions a pipeline variant produces, and through which model.
pub enum PredictorTask {
    Age {
        runner: Box<dyn InferenceRunner>,
        input_node: String,
        output_node: String,
    },
    Gender {
        runner: Box<dyn InferenceRunner>,
        input_node: String,
        output_node: String,
    },
    /// One network with separate age and gender heads, both fetched from a
    /// single forward pass.
    AgeAndGender {
        runner: Box<dyn InferenceRunner>,
        input_node: String,
        age_output: String,
        gender_output: String,
    },
}

/// The prediction pipeline: locate faces, crop them, batch and normalize
/// the crops, run the task's model, and convert the outputs.
pub struct FacePredictor {
    parts: PipelineParts,
    task: PredictorTask,
}

impl FacePredictor {
    pub fn new(parts: PipelineParts, task: PredictorTask) -> Self {
        Self { parts, task }
    }

    /// Release the shared sub-components for reuse by another variant.
    pub fn into_parts(self) -> PipelineParts {
        self.parts
    }

    /// Predict for every face in a decoded frame.
    pub fn predict(&mut self, frame: &Frame) -> Result<ResultSet, PredictionError> {
        let boxes = self.parts.locator.locate(frame)?;
        self.predict_located(frame, boxes)
    }

    /// Decode an image file and predict for every face in it.
    pub fn predict_path(&mut self, path: &Path) -> Result<ResultSet, PredictionError> {
        let frame = Frame::open(path)?;
        self.predict(&frame)
    }

    /// Decode an in-memory encoded image and predict for every face in it.
    pub fn predict_bytes(&mut self, bytes: &[u8]) -> Result<ResultSet, PredictionError> {
        let frame = Frame::from_bytes(bytes)?;
        self.predict(&frame)
    }

    fn predict_located(
        &mut self,
        frame: &Frame,
        boxes: Vec<FaceBox>,
    ) -> Result<ResultSet, PredictionError> {
        if boxes.is_empty() {
            log::debug!("no faces found");
            return Ok(Vec::new());
        }
        log::debug!("predicting for {} face(s)", boxes.len());

        let crops = self.parts.cropper.crop_and_resize(
            frame,
            &boxes,
            self.parts.input_width,
            self.parts.input_height,
        )?;
        let mut inputs = stack_crops(
            &crops,
            self.parts.input_height,
            self.parts.input_width,
            self.parts.input_depth,
        )?;
        for stage in &self.parts.preprocessors {
            inputs = stage.apply(inputs);
        }

        self.task.infer(inputs, &boxes)
    }
}

impl PredictorTask {
    fn infer(&mut self, inputs: Array4<f32>, boxes: &[FaceBox]) -> Result<ResultSet, PredictionError> {
        match self {
            PredictorTask::Age {
                runner,
                input_node,
                output_node,
            } => {
                let output = runner.run(inputs, input_node, output_node)?;
                let ages = per_face_values(boxes.len(), output)?;
                Ok(boxes
                    .iter()
                    .zip(ages)
                    .map(|(face_box, age)| FaceResult {
                        age,
                        ..FaceResult::unpredicted(*face_box)
                    })
                    .collect())
            }
            PredictorTask::Gender {
                runner,
                input_node,
                output_node,
            } => {
                let output = runner.run(inputs, input_node, output_node)?;
                let scores = per_face_values(boxes.len(), output)?;
                Ok(boxes
                    .iter()
                    .zip(scores)
                    .map(|(face_box, score)| FaceResult {
                        gender: classify_gender(score),
                        ..FaceResult::unpredicted(*face_box)
                    })
                    .collect())
            }
            PredictorTask::AgeAndGender {
                runner,
                input_node,
                age_output,
                gender_output,
            } => {
                let fetches = (age_output.as_str(), gender_output.as_str());
                let (age_out, gender_out) = runner.run_pair(inputs, input_node, fetches)?;
                let ages = per_face_values(boxes.len(), age_out)?;
                let scores = per_face_values(boxes.len(), gender_out)?;
                Ok(boxes
                    .iter()
                    .zip(ages.into_iter().zip(scores))
                    .map(|(face_box, (age, score))| FaceResult {
                        face_box: *face_box,
                        gender: classify_gender(score),
                        age,
                    })
                    .collect())
            }
        }
    }
}

/// Normalize a squeezed model output into one value per face.
///
/// A single face must arrive as a scalar and several faces as a batch with
/// exactly one entry each; any other pairing means the model and the
/// pipeline disagree about the batch and is reported as a shape defect.
fn per_face_values(face_count: usize, output: ModelOutput) -> Result<Vec<f32>, PredictionError> {
    match output {
        ModelOutput::Scalar(value) if face_count == 1 => Ok(vec![value]),
        ModelOutput::Batch(values) if face_count > 1 && values.len() == face_count => Ok(values),
        other => Err(PredictionError::Shape {
            reason: format!(
                "model produced {} value(s) for {face_count} face(s)",
                other.len()
            ),
        }),
    }
}

/// Binary decision over the gender head's sigmoid score.
fn classify_gender(score: f32) -> Gender {
    if score < GENDER_THRESHOLD {
        Gender::Male
    } else {
        Gender::Female
    }
}
