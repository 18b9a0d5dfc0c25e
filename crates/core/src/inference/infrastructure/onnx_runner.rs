use std::collections::HashSet;
use std::thread::{self, ThreadId};

use ndarray::Array4;

use crate::error::PredictionError;
use crate::inference::domain::endpoint::ModelEndpoint;
use crate::inference::domain::runner::{InferenceRunner, ModelOutput};

/// Input shape used for the post-load warm-up pass.
#[derive(Clone, Copy, Debug)]
pub struct WarmUpShape {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

struct LoadedModel {
    session: ort::session::Session,
    endpoint: ModelEndpoint,
}

/// Inference runner backed by an ONNX Runtime session.
///
/// Owns the model lifecycle: a session is built only when `configure` sees
/// a new model path, node names are resolved against the session's
/// metadata before the previous state is replaced, and an optional warm-up
/// pass moves lazy initialization cost into configuration time. Execution
/// is bound to one thread at a time; `configure` binds the configuring
/// thread, `bind_execution_thread` re-binds.
pub struct OnnxRunner {
    model: Option<LoadedModel>,
    warm_up: Option<WarmUpShape>,
    bound_thread: Option<ThreadId>,
}

impl OnnxRunner {
    pub fn new() -> Self {
        Self {
            model: None,
            warm_up: None,
            bound_thread: None,
        }
    }

    /// Runner that executes one all-ones dummy inference after every real
    /// load, so the first real request does not pay session start-up cost.
    pub fn with_warm_up(shape: WarmUpShape) -> Self {
        Self {
            warm_up: Some(shape),
            ..Self::new()
        }
    }

    fn load_session(endpoint: &ModelEndpoint) -> Result<ort::session::Session, PredictionError> {
        let model_load = |reason: String| PredictionError::ModelLoad {
            path: endpoint.model_path.clone(),
            reason,
        };

        let session = ort::session::Session::builder()
            .and_then(|builder| builder.with_execution_providers(preferred_execution_providers()))
            .and_then(|builder| builder.commit_from_file(&endpoint.model_path))
            .map_err(|e| model_load(e.to_string()))?;

        let input_names: HashSet<&str> = session.inputs().iter().map(|i| i.name()).collect();
        let output_names: HashSet<&str> = session.outputs().iter().map(|o| o.name()).collect();

        if !input_names.contains(endpoint.input_node.as_str()) {
            return Err(model_load(format!(
                "input node '{}' not found in graph",
                endpoint.input_node
            )));
        }
        for node in &endpoint.output_nodes {
            if !output_names.contains(node.as_str()) {
                return Err(model_load(format!("output node '{node}' not found in graph")));
            }
        }

        Ok(session)
    }

    fn warm_up_pass(
        session: &mut ort::session::Session,
        endpoint: &ModelEndpoint,
        shape: WarmUpShape,
    ) -> Result<(), PredictionError> {
        let dummy = Array4::<f32>::ones((
            1,
            shape.height as usize,
            shape.width as usize,
            shape.depth as usize,
        ));
        let fetches: Vec<&str> = endpoint.output_nodes.iter().map(String::as_str).collect();
        execute(session, dummy, &endpoint.input_node, &fetches)?;
        log::debug!("warm-up pass complete for {}", endpoint.model_path.display());
        Ok(())
    }

    fn check_thread(&self) -> Result<(), PredictionError> {
        match self.bound_thread {
            Some(id) if id == thread::current().id() => Ok(()),
            _ => Err(PredictionError::ThreadAffinity),
        }
    }
}

impl Default for OnnxRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Preferred ONNX execution providers for the current platform, falling
/// back to CPU when the platform-specific provider is unavailable.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Whether a reconfiguration must rebuild the session.
///
/// Endpoints are compared by model path alone; node names only take effect
/// through a real load.
fn needs_reload(current: Option<&ModelEndpoint>, next: &ModelEndpoint) -> bool {
    match current {
        Some(endpoint) => endpoint.model_path != next.model_path,
        None => true,
    }
}

/// Run one forward pass and extract the named fetches, squeezed.
fn execute(
    session: &mut ort::session::Session,
    inputs: Array4<f32>,
    input_node: &str,
    fetches: &[&str],
) -> Result<Vec<ModelOutput>, PredictionError> {
    let tensor = ort::value::Tensor::from_array(inputs)?;
    let outputs = session.run(ort::inputs![input_node => tensor])?;

    fetches
        .iter()
        .map(|name| {
            let value = outputs.get(*name).ok_or_else(|| PredictionError::Inference {
                reason: format!("output node '{name}' missing from session results"),
            })?;
            let view = value.try_extract_array::<f32>()?;
            Ok(ModelOutput::from_flat(view.iter().copied().collect()))
        })
        .collect()
}

impl InferenceRunner for OnnxRunner {
    fn configure(&mut self, endpoint: ModelEndpoint) -> Result<(), PredictionError> {
        if !needs_reload(self.model.as_ref().map(|m| &m.endpoint), &endpoint) {
            log::debug!(
                "model path unchanged, skipping reload: {}",
                endpoint.model_path.display()
            );
            return Ok(());
        }

        log::info!("loading model from {}", endpoint.model_path.display());
        let mut session = Self::load_session(&endpoint)?;
        if let Some(shape) = self.warm_up {
            Self::warm_up_pass(&mut session, &endpoint, shape)?;
        }

        // Only now is the previous state replaced; a failed load or
        // warm-up above leaves it fully intact.
        self.model = Some(LoadedModel { session, endpoint });
        self.bound_thread = Some(thread::current().id());
        Ok(())
    }

    fn bind_execution_thread(&mut self) {
        self.bound_thread = Some(thread::current().id());
    }

    fn run(
        &mut self,
        inputs: Array4<f32>,
        input_node: &str,
        output_node: &str,
    ) -> Result<ModelOutput, PredictionError> {
        if self.model.is_none() {
            return Err(PredictionError::NotConfigured);
        }
        self.check_thread()?;
        let loaded = self.model.as_mut().ok_or(PredictionError::NotConfigured)?;
        let mut outputs = execute(&mut loaded.session, inputs, input_node, &[output_node])?;
        Ok(outputs.remove(0))
    }

    fn run_pair(
        &mut self,
        inputs: Array4<f32>,
        input_node: &str,
        output_nodes: (&str, &str),
    ) -> Result<(ModelOutput, ModelOutput), PredictionError> {
        if self.model.is_none() {
            return Err(PredictionError::NotConfigured);
        }
        self.check_thread()?;
        let loaded = self.model.as_mut().ok_or(PredictionError::NotConfigured)?;
        let mut outputs = execute(
            &mut loaded.session,
            inputs,
            input_node,
            &[output_nodes.0, output_nodes.1],
        )?;
        let second = outputs.remove(1);
        let first = outputs.remove(0);
        Ok((first, second))
    }
}
