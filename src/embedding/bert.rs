//! BERT-family sentence encoder (e.g. MiniLM) with attention-masked mean pooling.
//!
//! Expects a directory with `config.json`, `model.safetensors` and `tokenizer.json`.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::constants::DEFAULT_MAX_SEQ_LEN;

use super::device::select_device;
use super::encoder::{TextEncoder, l2_normalize};
use super::error::EmbeddingError;

pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    model_dir: PathBuf,
}

impl std::fmt::Debug for BertEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEncoder")
            .field("device", &format!("{:?}", self.device))
            .field("dim", &self.dim)
            .field("model_dir", &self.model_dir)
            .finish()
    }
}

impl BertEncoder {
    /// Loads weights, config and tokenizer from `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self, EmbeddingError> {
        let model_dir = model_dir.as_ref();
        if !model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");
        let tokenizer_path = model_dir.join("tokenizer.json");
        for required in [&config_path, &weights_path, &tokenizer_path] {
            if !required.exists() {
                return Err(EmbeddingError::ModelNotFound {
                    path: required.clone(),
                });
            }
        }

        let device = select_device();

        let config_content = std::fs::read_to_string(&config_path)?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to parse config.json: {}", e),
            })?;

        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device).map_err(
                |e| EmbeddingError::ModelLoadFailed {
                    reason: format!("failed to map weights: {}", e),
                },
            )?
        };

        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)
        } else {
            BertModel::load(vb, &config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("failed to build BERT model: {}", e),
        })?;

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("failed to load tokenizer: {}", e),
            })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: DEFAULT_MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("failed to configure truncation: {}", e),
            })?;

        info!(
            model_dir = %model_dir.display(),
            hidden_size = config.hidden_size,
            "Text encoder loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            dim: config.hidden_size,
            model_dir: model_dir.to_path_buf(),
        })
    }

    fn row(&self, data: &[u32]) -> Result<Tensor, EmbeddingError> {
        Ok(Tensor::new(data, &self.device)?.unsqueeze(0)?)
    }
}

impl TextEncoder for BertEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            self.tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding text"
        );

        let input_ids = self.row(encoding.get_ids())?;
        let type_ids = self.row(encoding.get_type_ids())?;
        let attention_mask = self.row(encoding.get_attention_mask())?;

        // hidden: [1, seq_len, hidden_size]
        let hidden = self
            .model
            .forward(&input_ids, &type_ids, Some(&attention_mask))?;

        // mask: [1, seq_len, 1]
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?;

        let mut embedding = pooled.to_vec1::<f32>()?;
        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "bert"
    }
}
