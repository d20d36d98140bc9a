// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime session wrapper for the re-identification model
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Single input / single output name discovery at load time
//! - Output dimension discovery via a probe inference at load time
//!
//! A failed `run` is scoped to its request; it never tears down the session.

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Per-request inference failures. These are client-visible and never fatal
/// to the process.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model execution failed: {0}")]
    Execution(String),

    #[error("Model returned an unexpected output: {0}")]
    UnexpectedOutput(String),
}

/// Execution-provider selection policy, resolved once at startup into a
/// concrete session. Never re-evaluated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPolicy {
    /// CUDA or fail startup
    ForceAccelerated,
    /// CUDA if available, ordered CPU fallback; CPU-only with a warning when
    /// CUDA is absent
    PreferAcceleratedWithFallback,
    /// Never query the CUDA provider
    StandardOnly,
}

impl ProviderPolicy {
    /// Maps the CUDA_ENABLED configuration flag onto a policy
    pub fn from_flag(cuda_enabled: bool) -> Self {
        if cuda_enabled {
            ProviderPolicy::PreferAcceleratedWithFallback
        } else {
            ProviderPolicy::StandardOnly
        }
    }
}

/// Synchronous embedding backend seam. The ONNX session implements this for
/// production; tests substitute a deterministic stub.
pub trait Embedder: Send + Sync {
    /// Runs the model on a `[1, 3, H, W]` tensor, returning the raw
    /// (un-normalized) embedding row
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Output dimension D declared by the model
    fn dimension(&self) -> usize;
}

/// Long-lived ONNX Runtime session for the re-id model
///
/// # Thread Safety
/// The session is wrapped in `Arc<Mutex>` internally, so callers share the
/// handle freely and never take their own lock. Each `run` call is fully
/// synchronous and blocking.
#[derive(Clone)]
pub struct ReidSession {
    /// ONNX Runtime session (wrapped in Arc<Mutex> for thread-safe shared access)
    session: Arc<Mutex<Session>>,

    /// Model input name, discovered at load time
    input_name: String,

    /// Model output name, discovered at load time
    output_name: String,

    /// Output dimension D, discovered by the load-time probe inference
    dimension: usize,

    /// Human-readable description of the provider chain actually selected
    provider: &'static str,
}

impl std::fmt::Debug for ReidSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReidSession")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("dimension", &self.dimension)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl ReidSession {
    /// Loads the model, builds the session according to `policy`, then runs
    /// a single probe inference on a zero `[1, 3, input_h, input_w]` tensor
    /// to discover and validate the output dimension.
    ///
    /// Any failure here is fatal: the process must not serve traffic
    /// without a usable model.
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        input_h: u32,
        input_w: u32,
        policy: ProviderPolicy,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }

        let (providers, provider_label) = resolve_providers(policy)?;

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers(providers)
            .context("Failed to set execution providers")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load ONNX model from {}",
                model_path.display()
            ))?;

        // The supported re-id model family has exactly one input and one
        // output tensor; anything else is a wrong model file.
        if session.inputs.len() != 1 {
            anyhow::bail!(
                "Expected a single model input, found {}",
                session.inputs.len()
            );
        }
        if session.outputs.len() != 1 {
            anyhow::bail!(
                "Expected a single model output, found {}",
                session.outputs.len()
            );
        }

        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();

        // Probe with a zero image to learn D from an actual output. Wrapped
        // in a block so the outputs are dropped before the session moves.
        let dimension = {
            let probe = Array4::<f32>::zeros((1, 3, input_h as usize, input_w as usize));
            let tensor =
                Value::from_array(probe).context("Failed to build probe input tensor")?;
            let outputs = session
                .run(ort::inputs![input_name.as_str() => tensor])
                .context("Probe inference failed; the model is unusable")?;
            // Index 0 is the only output; validated above
            let array = outputs[0]
                .try_extract_array::<f32>()
                .context("Probe output is not a float32 tensor")?;
            let shape = array.shape();
            if shape.len() != 2 || shape[0] != 1 {
                anyhow::bail!(
                    "Expected a [1, dimension] probe output, got shape {:?}",
                    shape
                );
            }
            shape[1]
        };

        info!(
            "Re-id model loaded: input={} output={} dimension={} provider={}",
            input_name, output_name, dimension, provider_label
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            dimension,
            provider: provider_label,
        })
    }

    /// Provider chain description, for the startup log
    pub fn provider(&self) -> &'static str {
        self.provider
    }
}

impl Embedder for ReidSession {
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let tensor =
            Value::from_array(input).map_err(|e| InferenceError::Execution(e.to_string()))?;

        // Lock scope covers the run only; a failed run leaves the session
        // untouched for the next request.
        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Execution("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| InferenceError::Execution(e.to_string()))?;

        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?;

        let shape = array.shape();
        if shape.len() != 2 || shape[0] != 1 || shape[1] != self.dimension {
            return Err(InferenceError::UnexpectedOutput(format!(
                "expected shape [1, {}], got {:?}",
                self.dimension, shape
            )));
        }

        Ok(array.iter().copied().collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Resolves the provider policy into a concrete provider chain.
///
/// When acceleration is preferred but CUDA is not available, startup still
/// succeeds on the CPU provider with a warning, not an error.
fn resolve_providers(
    policy: ProviderPolicy,
) -> Result<(Vec<ExecutionProviderDispatch>, &'static str)> {
    match policy {
        ProviderPolicy::StandardOnly => Ok((
            vec![CPUExecutionProvider::default().build()],
            "cpu",
        )),
        ProviderPolicy::PreferAcceleratedWithFallback => {
            if cuda_available() {
                info!("CUDA execution provider available, CPU registered as fallback");
                Ok((
                    vec![
                        CUDAExecutionProvider::default().build(),
                        CPUExecutionProvider::default().build(),
                    ],
                    "cuda+cpu-fallback",
                ))
            } else {
                warn!("CUDA requested but no CUDA execution provider is available, falling back to CPU");
                Ok((vec![CPUExecutionProvider::default().build()], "cpu"))
            }
        }
        ProviderPolicy::ForceAccelerated => {
            if cuda_available() {
                Ok((vec![CUDAExecutionProvider::default().build()], "cuda"))
            } else {
                anyhow::bail!("CUDA execution provider required but not available")
            }
        }
    }
}

fn cuda_available() -> bool {
    CUDAExecutionProvider::default()
        .is_available()
        .unwrap_or(false)
}
