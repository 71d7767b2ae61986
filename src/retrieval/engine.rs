//! ColPali retrieval engine
//!
//! Loads the pretrained ColPali model from the hub (downloads on first use)
//! and exposes late-interaction indexing and search over page images.

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::colpali::Model as ColPali;
use candle_transformers::models::paligemma;
use tokenizers::Tokenizer;

use crate::errors::{CheckError, Result};
use crate::retrieval::{rank_pages, HubClient, Operation, RetrievalModel, SearchHit};

/// Default pretrained model repository
pub const DEFAULT_MODEL_ID: &str = "vidore/colpali-v1.2-merged";

/// Fixed prompt paired with page images during indexing
const IMAGE_PROMPT: &str = "Describe the image.";

/// Retrieval engine backed by ColPali via Candle
pub struct ColPaliRetriever {
    model: ColPali,
    tokenizer: Tokenizer,
    device: Device,
    dtype: DType,
    /// Embeddings of indexed pages, one (tokens x dim) tensor per page
    pages: Vec<Tensor>,
}

impl ColPaliRetriever {
    /// Download and instantiate the pretrained model.
    ///
    /// May pull several GB of weights on first use; subsequent runs hit the
    /// hub cache.
    pub fn from_pretrained(model_id: &str, device: &Device) -> Result<Self> {
        let hub = HubClient::new()?;
        let repo = hub.model_repo(model_id);

        let tokenizer_path = repo.get("tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| CheckError::Tokenizer(e.to_string()))?;

        let weight_paths = hub.fetch_weights(&repo)?;

        let dtype = if device.is_cuda() {
            DType::BF16
        } else {
            DType::F32
        };

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&weight_paths, dtype, device)? };

        let config = paligemma::Config::paligemma_3b_448();
        let model = ColPali::new(&config, vb)?;

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            dtype,
            pages: Vec::new(),
        })
    }

    /// Number of pages currently indexed
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tokenize(&self, text: &str) -> Result<Tensor> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CheckError::Tokenizer(e.to_string()))?;
        let ids = Tensor::new(encoding.get_ids(), &self.device)?;
        Ok(ids.unsqueeze(0)?)
    }

    fn embed_query(&mut self, query: &str) -> Result<Tensor> {
        let input_ids = self.tokenize(&format!("Query: {query}"))?;
        let embedding = self.model.forward_text(&input_ids)?;
        // (1, tokens, dim) -> (tokens, dim), scored in f32
        Ok(embedding.squeeze(0)?.to_dtype(DType::F32)?)
    }
}

impl RetrievalModel for ColPaliRetriever {
    fn operations(&self) -> Vec<Operation> {
        vec![Operation::Index, Operation::Search]
    }

    fn index(&mut self, pages: &Tensor) -> Result<usize> {
        let pixel_values = pages.to_device(&self.device)?.to_dtype(self.dtype)?;
        let batch = pixel_values.dim(0)?;

        let input_ids = self.tokenize(IMAGE_PROMPT)?;
        let input_ids = input_ids.repeat((batch, 1))?;

        let embeddings = self.model.forward_images(&pixel_values, &input_ids)?;
        for i in 0..batch {
            self.pages.push(embeddings.get(i)?.to_dtype(DType::F32)?);
        }
        Ok(batch)
    }

    fn search(&mut self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embed_query(query)?;
        rank_pages(&query_embedding, &self.pages, top_k)
    }
}
