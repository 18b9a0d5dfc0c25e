/// Ultraface face locator using ONNX Runtime via `ort`.
///
/// A lightweight single-stage detector trained on learned features; the
/// 320x240 RFB variant is small enough for CPU-only use. Unlike the
/// cascade locator it serves decoded frames and image paths only;
/// locating faces straight from encoded bytes is reported as unsupported.
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::error::PredictionError;
use crate::shared::constants::ULTRAFACE_EXPAND_RATIO;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Ultraface RFB-320 input resolution.
const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 240;

/// Input/output tensor names baked into the Ultraface export.
const INPUT_NODE: &str = "input";
const SCORES_NODE: &str = "scores";
const BOXES_NODE: &str = "boxes";

/// Default confidence threshold on the face-class score.
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f32 = 0.3;

/// Face locator backed by an Ultraface ONNX Runtime session.
#[derive(Debug)]
pub struct UltrafaceLocator {
    session: ort::session::Session,
    confidence: f32,
    expand_ratio: f32,
}

impl UltrafaceLocator {
    /// Load an Ultraface ONNX model and build a locator with the learned
    /// detector's calibrated expansion ratio.
    pub fn new(model_path: &Path) -> Result<Self, PredictionError> {
        Self::with_options(model_path, DEFAULT_CONFIDENCE, ULTRAFACE_EXPAND_RATIO)
    }

    pub fn with_options(
        model_path: &Path,
        confidence: f32,
        expand_ratio: f32,
    ) -> Result<Self, PredictionError> {
        let session = ort::session::Session::builder()
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(|e| PredictionError::ModelLoad {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            session,
            confidence,
            expand_ratio,
        })
    }
}

impl FaceLocator for UltrafaceLocator {
    fn expand_ratio(&self) -> f32 {
        self.expand_ratio
    }

    fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, PredictionError> {
        let fw = frame.width();
        let fh = frame.height();

        let input_tensor = preprocess(frame, INPUT_WIDTH, INPUT_HEIGHT);
        let input_value =
            ort::value::Tensor::from_array(input_tensor).map_err(detection_failure)?;
        let outputs = self
            .session
            .run(ort::inputs![INPUT_NODE => input_value])
            .map_err(detection_failure)?;

        // Ultraface outputs two tensors:
        // - scores: [1, N, 2] (background, face)
        // - boxes:  [1, N, 4] (normalized x1, y1, x2, y2)
        let scores = outputs
            .get(SCORES_NODE)
            .ok_or_else(|| missing_output(SCORES_NODE))?
            .try_extract_array::<f32>()
            .map_err(detection_failure)?;
        let boxes = outputs
            .get(BOXES_NODE)
            .ok_or_else(|| missing_output(BOXES_NODE))?
            .try_extract_array::<f32>()
            .map_err(detection_failure)?;

        let score_data = scores.as_slice().ok_or_else(|| non_contiguous("scores"))?;
        let box_data = boxes.as_slice().ok_or_else(|| non_contiguous("boxes"))?;
        let num_priors = score_data.len() / 2;

        let mut raw_dets = Vec::new();
        for i in 0..num_priors {
            let score = score_data[i * 2 + 1];
            if score < self.confidence {
                continue;
            }
            if i * 4 + 4 > box_data.len() {
                break;
            }
            let b = &box_data[i * 4..i * 4 + 4];
            raw_dets.push(RawDet {
                x1: (b[0] * fw as f32).max(0.0),
                y1: (b[1] * fh as f32).max(0.0),
                x2: (b[2] * fw as f32).min(fw as f32),
                y2: (b[3] * fh as f32).min(fh as f32),
                score,
            });
        }

        let kept = nms(&mut raw_dets, NMS_IOU_THRESH);
        log::debug!("ultraface found {} face(s)", kept.len());

        let face_boxes = kept
            .iter()
            .map(|d| {
                FaceBox::new(d.y1 as i32, d.x2 as i32, d.y2 as i32, d.x1 as i32)
                    .expand(fw, fh, self.expand_ratio)
            })
            .collect();

        Ok(face_boxes)
    }

    fn locate_bytes(&mut self, _bytes: &[u8]) -> Result<Vec<FaceBox>, PredictionError> {
        Err(PredictionError::NotSupported {
            variant: "ultraface",
            operation: "locating faces from encoded bytes",
        })
    }
}

fn detection_failure(err: ort::Error) -> PredictionError {
    PredictionError::Detection {
        source: Box::new(err),
    }
}

fn missing_output(name: &str) -> PredictionError {
    PredictionError::Detection {
        source: format!("detector output '{name}' missing from session results").into(),
    }
}

fn non_contiguous(name: &str) -> PredictionError {
    PredictionError::Detection {
        source: format!("cannot take a contiguous view of detector output '{name}'").into(),
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize the frame to the model resolution and normalize to [-1, 1] NCHW.
fn preprocess(frame: &Frame, width: u32, height: u32) -> ndarray::Array4<f32> {
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let (w, h) = (width as usize, height as usize);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, h, w));

    for y in 0..h {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / h as f64) as usize).min(src_h - 1);
        for x in 0..w {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / w as f64) as usize).min(src_w - 1);
            let rgb = frame.rgb_at(src_y, src_x);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (rgb[c] as f32 - 127.0) / 128.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDet {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

fn nms(dets: &mut [RawDet], iou_thresh: f32) -> Vec<RawDet> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if suppressed[j] {
                continue;
            }
            if bbox_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn bbox_iou(a: &RawDet, b: &RawDet) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
