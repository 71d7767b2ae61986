//! ragcheck - Retrieval stack installation check
//!
//! Verifies that a machine can run a ColPali multimodal retrieval model:
//! acquires the accelerator runtime, the model-hub client and a working
//! compute backend, then optionally downloads and instantiates the
//! pretrained model and probes it for the expected operations.

pub mod accel;
pub mod cli;
pub mod doctor;
pub mod errors;
pub mod retrieval;

// Re-export commonly used types
pub use errors::{CheckError, Result};
