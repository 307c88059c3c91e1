use log::debug;
use ndarray::{
    s,
    Array2,
    ArrayView1,
    ArrayView2,
};

use super::backend::TransformBackend;
use super::haar::{
    level_lengths,
    MAX_DWT_LEVEL,
};
use crate::data_structs::Channel;
use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::matrix::PositionMatrix;

const BYTES_PER_VALUE: u64 = std::mem::size_of::<f32>() as u64;

/// Final-level coefficients of every sample, in sample order.
#[derive(Debug, Clone)]
pub struct CoefficientMatrix {
    values:        Array2<f32>,
    level_lengths: Vec<usize>,
}

impl CoefficientMatrix {
    pub fn values(&self) -> ArrayView2<'_, f32> { self.values.view() }

    pub fn row(
        &self,
        sample: usize,
    ) -> ArrayView1<'_, f32> {
        self.values.row(sample)
    }

    pub fn get(
        &self,
        sample: usize,
        column: usize,
    ) -> f32 {
        self.values[[sample, column]]
    }

    /// `[W, ⌈W/2⌉, …]`, first entry is the dense row length.
    pub fn level_lengths(&self) -> &[usize] { &self.level_lengths }

    pub fn n_samples(&self) -> usize { self.values.nrows() }

    pub fn n_columns(&self) -> usize { self.values.ncols() }
}

/// Splits the position matrix into batches that fit the backend memory and
/// transforms them one after another.
pub struct WaveletEngine {
    backend:  Box<dyn TransformBackend>,
    /// Share of the backend memory a batch may use.
    fraction: f64,
}

impl WaveletEngine {
    pub fn new(
        backend: Box<dyn TransformBackend>,
        fraction: f64,
    ) -> Self {
        Self { backend, fraction }
    }

    pub fn backend_name(&self) -> &str { self.backend.name() }

    /// Bytes usable by a single batch.
    pub fn batch_budget(&self) -> u64 {
        (self.fraction * self.backend.available_memory() as f64).floor() as u64
    }

    /// Number of rows of length `row_len` per batch, `0` if a single row
    /// does not fit.
    pub fn batch_rows(
        &self,
        row_len: usize,
    ) -> usize {
        let row_bytes = (row_len as u64).saturating_mul(BYTES_PER_VALUE);
        if row_bytes == 0 {
            return usize::MAX;
        }
        (self.batch_budget() / row_bytes) as usize
    }

    pub fn transform(
        &self,
        matrix: &PositionMatrix,
        levels: u32,
        chromosome: &str,
        channel: Channel,
    ) -> Result<CoefficientMatrix> {
        if !(1..=MAX_DWT_LEVEL).contains(&levels) {
            return Err(DhunterError::invalid_parameter(
                "dwt_level",
                format!("must be in 1..={}, got {}", MAX_DWT_LEVEL, levels),
            ));
        }

        let row_len = matrix.row_len();
        let n_samples = matrix.n_samples();
        let lengths = level_lengths(row_len, levels);
        let final_len = lengths.last().copied().unwrap_or(0);

        let batch_rows = self.batch_rows(row_len);
        if batch_rows == 0 {
            return Err(DhunterError::Capacity {
                chromosome: chromosome.to_string(),
                channel,
                row_bytes: row_len as u64 * BYTES_PER_VALUE,
                budget: self.batch_budget(),
            });
        }

        let mut values = Array2::<f32>::zeros((n_samples, final_len));
        let mut start = 0;
        while start < n_samples {
            let end = start.saturating_add(batch_rows).min(n_samples);
            debug!(
                "{} {}: transforming rows {}..{} on {} ({} rows per batch)",
                chromosome,
                channel,
                start,
                end,
                self.backend.name(),
                batch_rows
            );

            let batch = matrix
                .values()
                .slice(s![start..end, ..])
                .to_owned();
            let output = self.backend.transform(batch.view(), levels)?;
            drop(batch);

            if output.coefficients.dim() != (end - start, final_len)
                || output.level_lengths != lengths
            {
                return Err(DhunterError::Backend {
                    backend: self.backend.name().to_string(),
                    source:  anyhow::anyhow!(
                        "expected {}x{} coefficients, got {:?}",
                        end - start,
                        final_len,
                        output.coefficients.dim()
                    ),
                });
            }
            values
                .slice_mut(s![start..end, ..])
                .assign(&output.coefficients);
            start = end;
        }

        Ok(CoefficientMatrix {
            values,
            level_lengths: lengths,
        })
    }
}
