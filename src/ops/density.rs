//! Log-density normalization and fixation log-likelihoods.
//!
//! A nonnegative saliency map is turned into a log probability distribution
//! by dividing by its total mass in log space. Fixations index into that
//! map with `(x, y)` integer coordinates; the gather and its mean have
//! scatter-add adjoints over the same coordinates.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Floor applied to map values before taking logarithms.
pub const DENSITY_EPS: f64 = 1e-12;

/// `ln(input / input.sum())`, elementwise, with values floored at
/// [`DENSITY_EPS`] first.
pub fn log_density(input: &ArrayView2<f64>) -> Array2<f64> {
    let clamped = input.mapv(|v| v.max(DENSITY_EPS));
    let total = clamped.sum();
    clamped.mapv(|v| (v / total).ln())
}

/// Gradient of [`log_density`] with respect to its input,
/// `g / input - g.sum() / input.sum()` over the floored values.
pub fn log_density_vjp(
    grad_output: &ArrayView2<f64>,
    input: &ArrayView2<f64>,
) -> Result<Array2<f64>> {
    if grad_output.dim() != input.dim() {
        return Err(Error::ShapeMismatch {
            expected: vec![input.nrows(), input.ncols()],
            got: vec![grad_output.nrows(), grad_output.ncols()],
        });
    }
    let clamped = input.mapv(|v| v.max(DENSITY_EPS));
    let total = clamped.sum();
    let grad_total = grad_output.sum();
    Ok(grad_output / &clamped - grad_total / total)
}

fn validate_fixations(
    shape: (usize, usize),
    x_inds: &ArrayView1<i64>,
    y_inds: &ArrayView1<i64>,
) -> Result<()> {
    if x_inds.len() != y_inds.len() {
        return Err(Error::LengthMismatch {
            left: x_inds.len(),
            right: y_inds.len(),
        });
    }
    let (height, width) = shape;
    for (index, (&x, &y)) in x_inds.iter().zip(y_inds.iter()).enumerate() {
        if x < 0 || x >= width as i64 || y < 0 || y >= height as i64 {
            return Err(Error::FixationOutOfBounds {
                index,
                x,
                y,
                height,
                width,
            });
        }
    }
    Ok(())
}

/// Log-likelihood of each fixation, `log_density[y, x]` per pair.
pub fn fixation_log_likelihoods(
    log_density: &ArrayView2<f64>,
    x_inds: &ArrayView1<i64>,
    y_inds: &ArrayView1<i64>,
) -> Result<Array1<f64>> {
    validate_fixations(log_density.dim(), x_inds, y_inds)?;
    let mut lls = Array1::zeros(x_inds.len());
    for (i, (&x, &y)) in x_inds.iter().zip(y_inds.iter()).enumerate() {
        lls[i] = log_density[[y as usize, x as usize]];
    }
    Ok(lls)
}

/// Mean fixation log-likelihood. At least one fixation is required.
pub fn average_log_likelihood(
    log_density: &ArrayView2<f64>,
    x_inds: &ArrayView1<i64>,
    y_inds: &ArrayView1<i64>,
) -> Result<f64> {
    let lls = fixation_log_likelihoods(log_density, x_inds, y_inds)?;
    if lls.is_empty() {
        return Err(Error::EmptyFixations);
    }
    Ok(lls.sum() / lls.len() as f64)
}

/// Adjoint of the per-fixation gather: scatter-adds each upstream gradient
/// into its fixation cell. Repeated fixations accumulate.
pub fn fixation_log_likelihoods_vjp(
    grad_lls: &ArrayView1<f64>,
    shape: (usize, usize),
    x_inds: &ArrayView1<i64>,
    y_inds: &ArrayView1<i64>,
) -> Result<Array2<f64>> {
    validate_fixations(shape, x_inds, y_inds)?;
    if grad_lls.len() != x_inds.len() {
        return Err(Error::LengthMismatch {
            left: grad_lls.len(),
            right: x_inds.len(),
        });
    }
    let mut grad = Array2::zeros(shape);
    for (i, (&x, &y)) in x_inds.iter().zip(y_inds.iter()).enumerate() {
        grad[[y as usize, x as usize]] += grad_lls[i];
    }
    Ok(grad)
}

/// Adjoint of [`average_log_likelihood`]: each fixation cell receives
/// `grad / n`.
pub fn average_log_likelihood_vjp(
    grad: f64,
    shape: (usize, usize),
    x_inds: &ArrayView1<i64>,
    y_inds: &ArrayView1<i64>,
) -> Result<Array2<f64>> {
    validate_fixations(shape, x_inds, y_inds)?;
    if x_inds.is_empty() {
        return Err(Error::EmptyFixations);
    }
    let share = grad / x_inds.len() as f64;
    let mut out = Array2::zeros(shape);
    for (&x, &y) in x_inds.iter().zip(y_inds.iter()) {
        out[[y as usize, x as usize]] += share;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, Array1, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn log_density_matches_hand_computed_values() {
        let input = arr2(&[[1.0, 3.0]]);
        let logd = log_density(&input.view());
        assert_relative_eq!(logd[[0, 0]], (0.25f64).ln(), epsilon = 1e-12);
        assert_relative_eq!(logd[[0, 1]], (0.75f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn log_density_exponentiates_to_a_distribution() {
        let mut rng = StdRng::seed_from_u64(41);
        let input = Array2::random_using((4, 5), Uniform::new(0.1, 2.0), &mut rng);
        let mass = log_density(&input.view()).mapv(f64::exp).sum();
        assert_relative_eq!(mass, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn log_density_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut x = Array2::random_using((3, 4), Uniform::new(0.1, 1.0), &mut rng);
        let g = Array2::random_using((3, 4), Uniform::new(-1.0, 1.0), &mut rng);

        let grad = log_density_vjp(&g.view(), &x.view()).unwrap();

        let h = 1e-7;
        for i in 0..3 {
            for j in 0..4 {
                let orig = x[[i, j]];
                x[[i, j]] = orig + h;
                let lp = (&log_density(&x.view()) * &g).sum();
                x[[i, j]] = orig - h;
                let lm = (&log_density(&x.view()) * &g).sum();
                x[[i, j]] = orig;
                assert_relative_eq!(grad[[i, j]], (lp - lm) / (2.0 * h), max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn gradient_rejects_mismatched_shapes() {
        let g = Array2::<f64>::zeros((2, 3));
        let x = Array2::<f64>::ones((3, 2));
        let err = log_density_vjp(&g.view(), &x.view()).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: vec![3, 2],
                got: vec![2, 3],
            }
        );
    }

    #[test]
    fn likelihoods_gather_the_indexed_cells() {
        let logd = arr2(&[[-1.0, -2.0], [-3.0, -4.0]]);
        let x = arr1(&[0i64, 1, 1]);
        let y = arr1(&[0i64, 1, 1]);
        let lls = fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()).unwrap();
        assert_eq!(lls, arr1(&[-1.0, -4.0, -4.0]));

        let avg = average_log_likelihood(&logd.view(), &x.view(), &y.view()).unwrap();
        assert_relative_eq!(avg, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn repeated_fixations_accumulate_in_the_scatter() {
        let x = arr1(&[1i64, 1]);
        let y = arr1(&[0i64, 0]);
        let grad = average_log_likelihood_vjp(1.0, (2, 2), &x.view(), &y.view()).unwrap();
        assert_relative_eq!(grad[[0, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(grad.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gather_and_scatter_are_adjoint() {
        let mut rng = StdRng::seed_from_u64(47);
        let logd = Array2::random_using((3, 4), Uniform::new(-2.0, 0.0), &mut rng);
        let x = arr1(&[0i64, 3, 2, 3]);
        let y = arr1(&[2i64, 0, 1, 0]);
        let g = Array1::random_using(4, Uniform::new(-1.0, 1.0), &mut rng);

        let lls = fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()).unwrap();
        let scattered =
            fixation_log_likelihoods_vjp(&g.view(), (3, 4), &x.view(), &y.view()).unwrap();

        assert_relative_eq!((&lls * &g).sum(), (&logd * &scattered).sum(), epsilon = 1e-12);
    }

    #[test]
    fn out_of_bounds_fixations_are_reported() {
        let logd = arr2(&[[0.0, 0.0], [0.0, 0.0]]);
        let x = arr1(&[0i64, 5]);
        let y = arr1(&[0i64, 0]);
        let err = fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()).unwrap_err();
        assert_eq!(
            err,
            Error::FixationOutOfBounds {
                index: 1,
                x: 5,
                y: 0,
                height: 2,
                width: 2,
            }
        );

        let x = arr1(&[0i64]);
        let y = arr1(&[-1i64]);
        assert!(matches!(
            fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()),
            Err(Error::FixationOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn empty_fixations_error_on_the_mean_only() {
        let logd = arr2(&[[0.0, 0.0], [0.0, 0.0]]);
        let x = Array1::<i64>::zeros(0);
        let y = Array1::<i64>::zeros(0);

        let lls = fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()).unwrap();
        assert!(lls.is_empty());

        let err = average_log_likelihood(&logd.view(), &x.view(), &y.view()).unwrap_err();
        assert_eq!(err, Error::EmptyFixations);

        let err = average_log_likelihood_vjp(1.0, (2, 2), &x.view(), &y.view()).unwrap_err();
        assert_eq!(err, Error::EmptyFixations);
    }

    #[test]
    fn mismatched_index_lengths_are_rejected() {
        let logd = arr2(&[[0.0, 0.0]]);
        let x = arr1(&[0i64, 1]);
        let y = arr1(&[0i64]);
        let err = fixation_log_likelihoods(&logd.view(), &x.view(), &y.view()).unwrap_err();
        assert_eq!(err, Error::LengthMismatch { left: 2, right: 1 });
    }
}
