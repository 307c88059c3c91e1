use ndarray::ArrayView1;

/// Deepest decomposition level accepted by the engine.
pub const MAX_DWT_LEVEL: u32 = 24;

/// Lengths of the approximation at every level: `[W, ⌈W/2⌉, …, ⌈W/2^L⌉]`.
pub fn level_lengths(
    width: usize,
    levels: u32,
) -> Vec<usize> {
    let mut lengths = Vec::with_capacity(levels as usize + 1);
    let mut len = width;
    lengths.push(len);
    for _ in 0..levels {
        len = len.div_ceil(2);
        lengths.push(len);
    }
    lengths
}

/// One Haar averaging step. An odd trailing value is paired with zero.
pub fn haar_step(input: &[f32]) -> Vec<f32> {
    input
        .chunks(2)
        .map(|pair| {
            match pair {
                [a, b] => (a + b) / 2.0,
                [a] => a / 2.0,
                _ => 0.0,
            }
        })
        .collect()
}

/// Approximation coefficients of `row` after `levels` steps.
pub fn haar_approximation(
    row: ArrayView1<'_, f32>,
    levels: u32,
) -> Vec<f32> {
    let mut current: Vec<f32> = row.iter().copied().collect();
    for _ in 0..levels {
        current = haar_step(&current);
    }
    current
}
