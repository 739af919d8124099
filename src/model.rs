use std::{fs, path::Path, sync::OnceLock};

use ndarray::{Array2, Array4, Ix2};
use ort::{session::Session, value::Tensor};

use crate::{config::Backend, error::Result, storage::Group};

const MODEL_DATASET: &str = "model.onnx";

/// `None` once an install attempt found another ONNX Runtime API already
/// in place.
static BACKEND: OnceLock<Option<Backend>> = OnceLock::new();

/// A policy network: maps a batch of encoded boards `[B, planes, H, W]`
/// to one probability row per board `[B, H * W]`.
pub trait Model {
    fn predict(&mut self, input: Array4<f32>) -> Result<Array2<f32>>;
}

/// Models that can write themselves into, and be rebuilt from, a storage
/// group.
pub trait PersistModel: Sized {
    fn save_to_group(&self, group: &Group) -> Result<()>;

    fn load_from_group(group: &Group) -> Result<Self>;
}

/// Install the ONNX Runtime backend for this process.
///
/// Only the first call has an effect. Returns the backend this crate
/// installed, or `None` if the runtime API had already been set elsewhere
/// and is therefore unknown.
pub fn install_backend(backend: Backend) -> Option<Backend> {
    let active = *BACKEND.get_or_init(|| {
        let installed = match backend {
            Backend::Tract => ort::set_api(ort_tract::api()),
            Backend::Candle => ort::set_api(ort_candle::api()),
        };
        if installed {
            log::debug!("installed {backend:?} ONNX backend");
            Some(backend)
        } else {
            log::warn!("ONNX Runtime API already set elsewhere, {backend:?} not installed");
            None
        }
    });
    if let Some(active) = active {
        if active != backend {
            log::warn!("ONNX backend already set to {active:?}, ignoring {backend:?}");
        }
    }
    active
}

fn ensure_backend() {
    if BACKEND.get().is_none() {
        install_backend(Backend::default());
    }
}

/// ONNX policy network.
///
/// The raw model bytes are kept alongside the session so the model can
/// be written back out unchanged.
pub struct OnnxModel {
    session: Session,
    model_bytes: Vec<u8>,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    pub const DEFAULT_INPUT: &'static str = "input";
    pub const DEFAULT_OUTPUT: &'static str = "output";

    /// Initialize from a local `.onnx` file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        log::debug!("loaded {} bytes of model from {}", bytes.len(), path.as_ref().display());
        Self::from_memory(bytes)
    }

    /// Initialize from raw bytes
    pub fn from_memory(model_bytes: Vec<u8>) -> Result<Self> {
        ensure_backend();
        let session = Session::builder()?.commit_from_memory(&model_bytes)?;

        Ok(Self {
            session,
            model_bytes,
            input_name: Self::DEFAULT_INPUT.to_string(),
            output_name: Self::DEFAULT_OUTPUT.to_string(),
        })
    }

    /// Download the model over HTTP (blocking).
    pub fn from_url(url: &str) -> Result<Self> {
        log::debug!("downloading model from {url}");
        let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
        Self::from_memory(bytes.to_vec())
    }

    /// Names of the graph's board input and policy output.
    pub fn with_io_names(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_name = input.into();
        self.output_name = output.into();
        self
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl Model for OnnxModel {
    fn predict(&mut self, input: Array4<f32>) -> Result<Array2<f32>> {
        let Self {
            session,
            input_name,
            output_name,
            ..
        } = self;

        let outputs = session.run(ort::inputs! {
            input_name.as_str() => Tensor::from_array(input)?,
        })?;

        let probs = outputs[output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix2>()?
            .to_owned();
        Ok(probs)
    }
}

impl PersistModel for OnnxModel {
    fn save_to_group(&self, group: &Group) -> Result<()> {
        group.write_dataset(MODEL_DATASET, &self.model_bytes)?;
        group.set_attr("input_name", self.input_name.as_str())?;
        group.set_attr("output_name", self.output_name.as_str())?;
        Ok(())
    }

    fn load_from_group(group: &Group) -> Result<Self> {
        let bytes = group.read_dataset(MODEL_DATASET)?;
        let input = group.attr_str("input_name")?;
        let output = group.attr_str("output_name")?;
        Ok(Self::from_memory(bytes)?.with_io_names(input, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    #[test]
    fn test_second_install_keeps_first_backend() {
        let first = install_backend(Backend::Tract);
        let second = install_backend(Backend::Candle);
        assert!(first.is_some());
        assert_eq!(second, first);
        assert_eq!(install_backend(Backend::Tract), first);
    }

    #[test]
    fn test_from_memory_rejects_garbage() {
        assert!(matches!(
            OnnxModel::from_memory(b"not onnx".to_vec()),
            Err(AgentError::OrtError(_))
        ));
    }

    #[test]
    fn test_from_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OnnxModel::from_file(dir.path().join("absent.onnx")),
            Err(AgentError::IoError(_))
        ));
    }

    #[test]
    fn test_load_from_group_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let group = Group::create(dir.path()).unwrap();
        group.set_attr("input_name", "input").unwrap();
        group.set_attr("output_name", "output").unwrap();
        assert!(matches!(
            OnnxModel::load_from_group(&group),
            Err(AgentError::IoError(_))
        ));
    }
}
