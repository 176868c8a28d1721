//! Anisotropic radial distance grids for center-weighted priors.
//!
//! Pixel coordinates are mapped to `[-1, 1)` per axis, the vertical axis is
//! scaled by `alpha`, and the whole grid is normalized so the horizontal
//! extremes sit at distance one regardless of `alpha`. A small constant
//! offset keeps the vertical coordinate away from exact zero.

use crate::ops::EPS;
use ndarray::Array2;

/// Offset added to the normalized vertical coordinate of every pixel.
pub const CENTER_OFFSET: f64 = 1e-4;

fn axes(height: usize, width: usize) -> (Vec<f64>, Vec<f64>) {
    let half_h = 0.5 * height as f64;
    let half_w = 0.5 * width as f64;
    let ys = (0..height)
        .map(|i| (i as f64 - half_h) / half_h + CENTER_OFFSET)
        .collect();
    let xs = (0..width).map(|j| (j as f64 - half_w) / half_w).collect();
    (ys, xs)
}

/// Distance of every pixel from the image center,
/// `sqrt(x^2 + alpha * y^2) / sqrt(1 + alpha)`.
pub fn distance_grid(height: usize, width: usize, alpha: f64) -> Array2<f64> {
    let (ys, xs) = axes(height, width);
    let norm = (1.0 + alpha).max(EPS).sqrt();
    Array2::from_shape_fn((height, width), |(i, j)| {
        let y = ys[i];
        let x = xs[j];
        (x * x + alpha * y * y).max(0.0).sqrt() / norm
    })
}

/// Elementwise derivative of [`distance_grid`] with respect to `alpha`.
pub fn distance_grid_grad_alpha(height: usize, width: usize, alpha: f64) -> Array2<f64> {
    let (ys, xs) = axes(height, width);
    let norm = (1.0 + alpha).max(EPS).sqrt();
    Array2::from_shape_fn((height, width), |(i, j)| {
        let y = ys[i];
        let x = xs[j];
        let radius = (x * x + alpha * y * y).max(0.0).sqrt().max(EPS);
        y * y / (2.0 * radius * norm) - radius / (2.0 * norm.powi(3))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corner_reaches_unit_distance() {
        let grid = distance_grid(101, 101, 1.0);
        assert_relative_eq!(grid[[0, 0]], 1.0, epsilon = 1e-3);
        assert_relative_eq!(grid[[100, 100]], 1.0, epsilon = 2e-2);
    }

    #[test]
    fn center_pixel_is_near_zero() {
        let grid = distance_grid(100, 100, 1.0);
        assert!(grid[[50, 50]] < 1e-3);
    }

    #[test]
    fn alpha_reweights_the_vertical_axis() {
        // With alpha near zero, vertical displacement is free while the
        // horizontal extremes keep unit distance.
        let grid = distance_grid(100, 100, 1e-8);
        assert!(grid[[0, 50]] < 1e-3);
        assert_relative_eq!(grid[[50, 0]], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn alpha_gradient_matches_finite_differences() {
        let alpha = 1.3;
        let h = 1e-6;
        let grad = distance_grid_grad_alpha(7, 6, alpha);
        let numeric =
            (&distance_grid(7, 6, alpha + h) - &distance_grid(7, 6, alpha - h)) / (2.0 * h);
        assert_relative_eq!(grad, numeric, epsilon = 1e-6, max_relative = 1e-4);
    }
}
