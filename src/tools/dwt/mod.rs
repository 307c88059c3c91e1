//! Batched multi-level Haar decomposition.
//!
//! The [`WaveletEngine`] cuts the position matrix into row batches sized to
//! the memory of a [`TransformBackend`] and assembles the final-level
//! approximation coefficients in sample order.

mod backend;
mod engine;
mod haar;

pub use backend::{
    BackendKind,
    CpuBackend,
    HaarOutput,
    ParallelCpuBackend,
    TransformBackend,
};
pub use engine::{
    CoefficientMatrix,
    WaveletEngine,
};
pub use haar::{
    haar_approximation,
    haar_step,
    level_lengths,
    MAX_DWT_LEVEL,
};
