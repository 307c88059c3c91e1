use ndarray::{
    Array2,
    ArrayView2,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use super::haar::{
    haar_approximation,
    level_lengths,
};
use crate::error::{
    DhunterError,
    Result,
};
use crate::utils::THREAD_POOL;

/// Final-level coefficients of one batch plus the length of every level.
#[derive(Debug, Clone)]
pub struct HaarOutput {
    pub coefficients:  Array2<f32>,
    pub level_lengths: Vec<usize>,
}

/// Device that runs the multi-level Haar transform on a batch of rows.
///
/// Calls are synchronous: the engine submits one batch at a time and waits
/// for its result.
pub trait TransformBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Bytes the backend can hold at once.
    fn available_memory(&self) -> u64;

    fn transform(
        &self,
        batch: ArrayView2<'_, f32>,
        levels: u32,
    ) -> Result<HaarOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Sequential reference implementation.
    Cpu,
    /// Rows transformed concurrently on the crate thread pool.
    #[default]
    Parallel,
}

impl BackendKind {
    pub fn build(
        &self,
        memory_budget: u64,
    ) -> Box<dyn TransformBackend> {
        match self {
            BackendKind::Cpu => Box::new(CpuBackend::new(memory_budget)),
            BackendKind::Parallel => {
                Box::new(ParallelCpuBackend::new(memory_budget))
            },
        }
    }
}

fn output_len(
    batch: &ArrayView2<'_, f32>,
    levels: u32,
) -> (Vec<usize>, usize) {
    let lengths = level_lengths(batch.ncols(), levels);
    let final_len = lengths.last().copied().unwrap_or(0);
    (lengths, final_len)
}

fn backend_error(
    backend: &str,
    error: ndarray::ShapeError,
) -> DhunterError {
    DhunterError::Backend {
        backend: backend.to_string(),
        source:  anyhow::Error::new(error),
    }
}

#[derive(Debug, Clone)]
pub struct CpuBackend {
    memory_budget: u64,
}

impl CpuBackend {
    pub fn new(memory_budget: u64) -> Self { Self { memory_budget } }
}

impl TransformBackend for CpuBackend {
    fn name(&self) -> &str { "cpu" }

    fn available_memory(&self) -> u64 { self.memory_budget }

    fn transform(
        &self,
        batch: ArrayView2<'_, f32>,
        levels: u32,
    ) -> Result<HaarOutput> {
        let (level_lengths, final_len) = output_len(&batch, levels);
        let mut coefficients = Array2::<f32>::zeros((batch.nrows(), final_len));
        for (mut out, row) in coefficients
            .outer_iter_mut()
            .zip(batch.outer_iter())
        {
            let approximation = haar_approximation(row, levels);
            out.iter_mut()
                .zip(approximation)
                .for_each(|(dst, src)| *dst = src);
        }
        Ok(HaarOutput {
            coefficients,
            level_lengths,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ParallelCpuBackend {
    memory_budget: u64,
}

impl ParallelCpuBackend {
    pub fn new(memory_budget: u64) -> Self { Self { memory_budget } }
}

impl TransformBackend for ParallelCpuBackend {
    fn name(&self) -> &str { "parallel-cpu" }

    fn available_memory(&self) -> u64 { self.memory_budget }

    fn transform(
        &self,
        batch: ArrayView2<'_, f32>,
        levels: u32,
    ) -> Result<HaarOutput> {
        let (level_lengths, final_len) = output_len(&batch, levels);
        let n_rows = batch.nrows();
        if final_len == 0 || n_rows == 0 {
            return Ok(HaarOutput {
                coefficients: Array2::zeros((n_rows, final_len)),
                level_lengths,
            });
        }

        let mut flat = vec![0f32; n_rows * final_len];
        THREAD_POOL.install(|| {
            flat.par_chunks_mut(final_len)
                .enumerate()
                .for_each(|(i, chunk)| {
                    let approximation = haar_approximation(batch.row(i), levels);
                    chunk.copy_from_slice(&approximation);
                })
        });

        let coefficients = Array2::from_shape_vec((n_rows, final_len), flat)
            .map_err(|e| backend_error(self.name(), e))?;
        Ok(HaarOutput {
            coefficients,
            level_lengths,
        })
    }
}
