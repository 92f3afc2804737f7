//! # CLIP Image Embedder
//!
//! CLIP ViT-B/32 image tower running on candle. Produces the projected
//! 512-dimensional image features, un-normalized.

use std::path::PathBuf;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::embed::ImageEmbedder;
use crate::error::{CoreError, Result};

/// Projection width of `openai/clip-vit-base-patch32`.
pub const CLIP_VIT_B32_DIM: usize = 512;

/// Input resolution of `openai/clip-vit-base-patch32`.
pub const CLIP_IMAGE_SIZE: usize = 224;

/// Weights file expected inside the model directory.
pub const WEIGHTS_FILE: &str = "model.safetensors";

const MODEL_NAME: &str = "openai/clip-vit-base-patch32";

/// Per-channel normalization used by the CLIP image processor.
const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Configuration for loading the CLIP embedder.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Directory holding `model.safetensors`.
    pub model_dir: PathBuf,
    /// Square input resolution.
    pub image_size: usize,
    /// Device to run inference on.
    pub device: Device,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/clip-vit-base-patch32"),
            image_size: CLIP_IMAGE_SIZE,
            device: Device::Cpu,
        }
    }
}

impl EmbedderConfig {
    /// Create a new configuration pointing at `model_dir`.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Self::default()
        }
    }

    /// Set the inference device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Path of the weights file.
    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(WEIGHTS_FILE)
    }
}

/// CLIP image embedder.
///
/// Loading maps the weights once; every call afterwards is a forward pass
/// over plain tensors, so nothing is tracked for gradients.
pub struct ClipEmbedder {
    model: ClipModel,
    image_size: usize,
    device: Device,
}

impl ClipEmbedder {
    /// Loads the CLIP weights from `config.model_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ModelLoad` if the weights file is missing or does
    /// not contain a CLIP ViT-B/32 checkpoint.
    pub fn load(config: &EmbedderConfig) -> Result<Self> {
        let weights = config.weights_path();
        if !weights.exists() {
            return Err(CoreError::ModelLoad(format!(
                "Model not found at {}",
                weights.display()
            )));
        }

        let clip_config = ClipConfig::vit_base_patch32();
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights], DType::F32, &config.device)
        }
        .map_err(|e| CoreError::ModelLoad(e.to_string()))?;
        let model = ClipModel::new(vb, &clip_config)
            .map_err(|e| CoreError::ModelLoad(format!("{}: {e}", weights.display())))?;

        tracing::info!(model = MODEL_NAME, path = %weights.display(), "CLIP image model loaded");

        Ok(Self {
            model,
            image_size: config.image_size,
            device: config.device.clone(),
        })
    }
}

impl ImageEmbedder for ClipEmbedder {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        CLIP_VIT_B32_DIM
    }

    fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>> {
        let pixels = preprocess(image, self.image_size, &self.device)?;
        let features = self
            .model
            .get_image_features(&pixels)
            .map_err(|e| CoreError::Inference(e.to_string()))?;

        let values: Vec<f32> = features.squeeze(0)?.to_dtype(DType::F32)?.to_vec1()?;
        if values.len() != CLIP_VIT_B32_DIM {
            return Err(CoreError::DimensionMismatch {
                expected: CLIP_VIT_B32_DIM,
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

/// Converts an image into CLIP pixel values of shape `[1, 3, size, size]`.
///
/// Resizes the shortest side to `size` with a bicubic filter, center-crops,
/// scales to `[0, 1]` and applies the CLIP mean/std.
pub fn preprocess(image: &DynamicImage, size: usize, device: &Device) -> Result<Tensor> {
    let side = size as u32;
    let rgb = image
        .resize_to_fill(side, side, FilterType::CatmullRom)
        .to_rgb8()
        .into_raw();

    let mean = Tensor::new(&CLIP_MEAN, device)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&CLIP_STD, device)?.reshape((3, 1, 1))?;

    let pixels = Tensor::from_vec(rgb, (size, size, 3), device)?
        .permute((2, 0, 1))?
        .to_dtype(DType::F32)?
        .affine(1.0 / 255.0, 0.0)?
        .broadcast_sub(&mean)?
        .broadcast_div(&std)?
        .unsqueeze(0)?;

    Ok(pixels)
}
