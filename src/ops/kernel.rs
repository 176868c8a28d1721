//! Truncated 1-D Gaussian kernels and their sigma-derivatives.
//!
//! The truncation radius is an explicit caller parameter rather than a
//! function of sigma, so a fitted sigma can move freely without changing the
//! support of the convolution.

/// Floor applied to sigma before building a kernel. Below this the kernel
/// degenerates to a discrete delta instead of dividing by zero.
pub const SIGMA_EPS: f64 = 1e-12;

/// Samples `exp(-d^2 / (2 sigma^2))` for `d in -window_radius..=window_radius`
/// and normalizes to unit sum. The center tap is always 1 before
/// normalization, so the sum is never zero.
///
/// Radius validation lives at the blur entry points; a zero radius here
/// degenerates to the single-tap delta.
pub fn gaussian_kernel(sigma: f64, window_radius: usize) -> Vec<f64> {
    let sigma = sigma.max(SIGMA_EPS);
    let len = 2 * window_radius + 1;
    let mut kernel = vec![0.0; len];
    for (i, tap) in kernel.iter_mut().enumerate() {
        let d = i as f64 - window_radius as f64;
        *tap = (-0.5 * d * d / (sigma * sigma)).exp();
    }
    let sum: f64 = kernel.iter().sum();
    for tap in &mut kernel {
        *tap /= sum;
    }
    kernel
}

/// Exact derivative of the *normalized* kernel with respect to sigma.
///
/// With `m2` the second moment of the normalized kernel,
/// `dk[d] = k[d] * (d^2 - m2) / sigma^3`. Normalization keeps total mass
/// constant, so the taps sum to zero.
pub fn gaussian_kernel_grad_sigma(sigma: f64, window_radius: usize) -> Vec<f64> {
    let sigma = sigma.max(SIGMA_EPS);
    let kernel = gaussian_kernel(sigma, window_radius);
    let m2: f64 = kernel
        .iter()
        .enumerate()
        .map(|(i, tap)| {
            let d = i as f64 - window_radius as f64;
            tap * d * d
        })
        .sum();
    let sigma3 = sigma * sigma * sigma;
    kernel
        .iter()
        .enumerate()
        .map(|(i, tap)| {
            let d = i as f64 - window_radius as f64;
            tap * (d * d - m2) / sigma3
        })
        .collect()
}
