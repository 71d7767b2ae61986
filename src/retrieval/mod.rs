//! Retrieval layer
//!
//! Wraps the ColPali late-interaction retrieval model behind a small trait so
//! the diagnostic can probe a loaded handle for its supported operations
//! without invoking them.

use candle_core::Tensor;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub mod engine;
pub mod hub;

pub use engine::ColPaliRetriever;
pub use hub::HubClient;

/// Operations a retrieval model handle may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Index,
    Search,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Search => write!(f, "search"),
        }
    }
}

/// A ranked search result over indexed pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Position of the page in indexing order
    pub page: usize,
    /// MaxSim relevance score (higher is better)
    pub score: f32,
}

/// Handle to an instantiated retrieval model
pub trait RetrievalModel {
    /// Operations this handle supports
    fn operations(&self) -> Vec<Operation>;

    /// Embed and store a batch of page images (pixel values, NCHW).
    /// Returns the number of pages indexed.
    fn index(&mut self, pages: &Tensor) -> Result<usize>;

    /// Rank indexed pages against a text query
    fn search(&mut self, query: &str, top_k: usize) -> Result<Vec<SearchHit>>;
}

/// MaxSim late-interaction score between a query embedding (nq x d) and one
/// page embedding (np x d): for each query token take the best-matching page
/// token, then sum over query tokens.
pub fn maxsim_score(query: &Tensor, page: &Tensor) -> Result<f32> {
    let scores = query.matmul(&page.t()?)?;
    let score = scores.max(1)?.sum_all()?.to_scalar::<f32>()?;
    Ok(score)
}

/// Rank page embeddings against a query embedding, best first
pub fn rank_pages(query: &Tensor, pages: &[Tensor], top_k: usize) -> Result<Vec<SearchHit>> {
    let mut hits = Vec::with_capacity(pages.len());
    for (page, emb) in pages.iter().enumerate() {
        let score = maxsim_score(query, emb)?;
        hits.push(SearchHit { page, score });
    }

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(top_k);
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Index.to_string(), "index");
        assert_eq!(Operation::Search.to_string(), "search");
    }

    #[test]
    fn test_maxsim_identity() {
        let device = Device::Cpu;
        // Orthonormal query and page tokens: each query token matches one
        // page token exactly, so the score is the number of query tokens.
        let query = Tensor::from_vec(vec![1f32, 0.0, 0.0, 1.0], (2, 2), &device).unwrap();
        let page = Tensor::from_vec(vec![1f32, 0.0, 0.0, 1.0], (2, 2), &device).unwrap();

        let score = maxsim_score(&query, &page).unwrap();
        assert!((score - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_maxsim_prefers_aligned_page() {
        let device = Device::Cpu;
        let query = Tensor::from_vec(vec![1f32, 0.0], (1, 2), &device).unwrap();
        let aligned = Tensor::from_vec(vec![1f32, 0.0], (1, 2), &device).unwrap();
        let orthogonal = Tensor::from_vec(vec![0f32, 1.0], (1, 2), &device).unwrap();

        let a = maxsim_score(&query, &aligned).unwrap();
        let b = maxsim_score(&query, &orthogonal).unwrap();
        assert!(a > b);
    }

    #[test]
    fn test_rank_pages_orders_by_score() {
        let device = Device::Cpu;
        let query = Tensor::from_vec(vec![1f32, 0.0], (1, 2), &device).unwrap();
        let pages = vec![
            Tensor::from_vec(vec![0f32, 1.0], (1, 2), &device).unwrap(),
            Tensor::from_vec(vec![1f32, 0.0], (1, 2), &device).unwrap(),
            Tensor::from_vec(vec![0.5f32, 0.5], (1, 2), &device).unwrap(),
        ];

        let hits = rank_pages(&query, &pages, 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].page, 1);
        assert_eq!(hits[1].page, 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_rank_pages_empty() {
        let device = Device::Cpu;
        let query = Tensor::zeros((1, 2), DType::F32, &device).unwrap();
        let hits = rank_pages(&query, &[], 5).unwrap();
        assert!(hits.is_empty());
    }
}
