//! Separable Gaussian blur with edge replication.
//!
//! The 2-D blur is two 1-D passes: along the height axis, then along the
//! width axis. Replicate ("nearest") padding is folded into the passes by
//! clamping source indices, which is equivalent to padding by `window_radius`
//! and cropping a valid convolution. The adjoint pass scatters each upstream
//! gradient back through the same clamped indices, so border pixels absorb
//! the mass their replicas received.

use crate::error::{Error, Result};
use crate::ops::kernel::{gaussian_kernel, gaussian_kernel_grad_sigma};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, ArrayView3, ArrayViewMut1, Axis, Zip};
use rayon::prelude::*;

fn convolve_lane(input: &ArrayView1<f64>, kernel: &[f64], out: &mut ArrayViewMut1<f64>) {
    let len = input.len() as isize;
    let radius = (kernel.len() / 2) as isize;
    for i in 0..input.len() {
        let mut acc = 0.0;
        for (t, &tap) in kernel.iter().enumerate() {
            let src = (i as isize + t as isize - radius).clamp(0, len - 1) as usize;
            acc += tap * input[src];
        }
        out[i] = acc;
    }
}

fn convolve_lane_adjoint(grad: &ArrayView1<f64>, kernel: &[f64], out: &mut ArrayViewMut1<f64>) {
    let len = grad.len() as isize;
    let radius = (kernel.len() / 2) as isize;
    for i in 0..grad.len() {
        let go = grad[i];
        for (t, &tap) in kernel.iter().enumerate() {
            let src = (i as isize + t as isize - radius).clamp(0, len - 1) as usize;
            out[src] += tap * go;
        }
    }
}

/// One replicate-padded 1-D convolution pass along `axis`. The kernel length
/// must be odd; output shape equals input shape.
pub fn convolve_replicate(input: &ArrayView2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let mut output = Array2::zeros(input.dim());
    Zip::from(output.lanes_mut(axis))
        .and(input.lanes(axis))
        .par_for_each(|mut out_lane, in_lane| {
            convolve_lane(&in_lane, kernel, &mut out_lane);
        });
    output
}

/// Exact adjoint of [`convolve_replicate`] for the same kernel and axis.
pub fn convolve_replicate_adjoint(
    grad: &ArrayView2<f64>,
    kernel: &[f64],
    axis: Axis,
) -> Array2<f64> {
    let mut output = Array2::zeros(grad.dim());
    Zip::from(output.lanes_mut(axis))
        .and(grad.lanes(axis))
        .par_for_each(|mut out_lane, grad_lane| {
            convolve_lane_adjoint(&grad_lane, kernel, &mut out_lane);
        });
    output
}

fn validate_radius(window_radius: usize) -> Result<()> {
    if window_radius == 0 {
        return Err(Error::NonPositiveWindow {
            radius: window_radius,
        });
    }
    Ok(())
}

/// Blurs a single 2-D map: height pass, then width pass.
pub fn gaussian_blur(
    input: &ArrayView2<f64>,
    sigma: f64,
    window_radius: usize,
) -> Result<Array2<f64>> {
    validate_radius(window_radius)?;
    let kernel = gaussian_kernel(sigma, window_radius);
    let vertical = convolve_replicate(input, &kernel, Axis(0));
    Ok(convolve_replicate(&vertical.view(), &kernel, Axis(1)))
}

/// Gradient of the blur with respect to its input. The blur is linear, so
/// only the upstream gradient is needed: adjoint width pass, then adjoint
/// height pass.
pub fn gaussian_blur_vjp(
    grad_output: &ArrayView2<f64>,
    sigma: f64,
    window_radius: usize,
) -> Result<Array2<f64>> {
    validate_radius(window_radius)?;
    let kernel = gaussian_kernel(sigma, window_radius);
    let horizontal = convolve_replicate_adjoint(grad_output, &kernel, Axis(1));
    Ok(convolve_replicate_adjoint(
        &horizontal.view(),
        &kernel,
        Axis(0),
    ))
}

/// Gradient of the blur with respect to sigma, by the product rule over the
/// two passes: the sigma-derivative kernel replaces the Gaussian in one pass
/// at a time, and the upstream gradient contracts the sum of both paths.
pub fn gaussian_blur_grad_sigma(
    grad_output: &ArrayView2<f64>,
    input: &ArrayView2<f64>,
    sigma: f64,
    window_radius: usize,
) -> Result<f64> {
    validate_radius(window_radius)?;
    if grad_output.dim() != input.dim() {
        return Err(Error::ShapeMismatch {
            expected: vec![input.nrows(), input.ncols()],
            got: vec![grad_output.nrows(), grad_output.ncols()],
        });
    }
    let kernel = gaussian_kernel(sigma, window_radius);
    let dkernel = gaussian_kernel_grad_sigma(sigma, window_radius);

    let vertical = convolve_replicate(input, &kernel, Axis(0));
    let d_vertical = convolve_replicate(input, &dkernel, Axis(0));
    let path_height = convolve_replicate(&d_vertical.view(), &kernel, Axis(1));
    let path_width = convolve_replicate(&vertical.view(), &dkernel, Axis(1));

    Ok((grad_output * &(path_height + path_width)).sum())
}

/// Blurs a `(n, height, width)` stack of maps, one map per rayon task.
pub fn gaussian_blur_stack(
    input: &ArrayView3<f64>,
    sigma: f64,
    window_radius: usize,
) -> Result<Array3<f64>> {
    validate_radius(window_radius)?;
    let kernel = gaussian_kernel(sigma, window_radius);
    let mut output = Array3::zeros(input.dim());
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut out_map)| {
            let in_map = input.index_axis(Axis(0), i);
            let vertical = convolve_replicate(&in_map, &kernel, Axis(0));
            out_map.assign(&convolve_replicate(&vertical.view(), &kernel, Axis(1)));
        });
    Ok(output)
}

#[cfg(feature = "cuda")]
pub mod cuda {
    mod ffi {
        extern "C" {
            pub fn gaussian_blur_cuda(
                out: *mut f64,
                input: *const f64,
                sigma: f64,
                height: libc::c_longlong,
                width: libc::c_longlong,
                window_radius: libc::c_longlong,
            );
            pub fn gaussian_blur_backward_cuda(
                grad_input: *mut f64,
                grad_output: *const f64,
                sigma: f64,
                height: libc::c_longlong,
                width: libc::c_longlong,
                window_radius: libc::c_longlong,
            );
        }
    }

    pub fn gaussian_blur_cuda(
        out: *mut f64,
        input: *const f64,
        sigma: f64,
        height: i64,
        width: i64,
        window_radius: i64,
    ) {
        unsafe {
            ffi::gaussian_blur_cuda(out, input, sigma, height, width, window_radius);
        }
    }

    pub fn gaussian_blur_backward_cuda(
        grad_input: *mut f64,
        grad_output: *const f64,
        sigma: f64,
        height: i64,
        width: i64,
        window_radius: i64,
    ) {
        unsafe {
            ffi::gaussian_blur_backward_cuda(
                grad_input,
                grad_output,
                sigma,
                height,
                width,
                window_radius,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr2, Array2, Array3};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn constant_map_is_a_fixed_point() {
        let input = Array2::from_elem((5, 4), 3.7);
        let out = gaussian_blur(&input.view(), 2.0, 5).unwrap();
        for &v in out.iter() {
            assert_relative_eq!(v, 3.7, epsilon = 1e-12);
        }
    }

    #[test]
    fn output_stays_inside_the_input_range() {
        // Unit-sum kernel plus replicate padding makes every output pixel a
        // convex combination of input pixels, even when the window is larger
        // than the map.
        let mut rng = StdRng::seed_from_u64(5);
        let input = Array2::random_using((3, 2), Uniform::new(-1.0, 1.0), &mut rng);
        let out = gaussian_blur(&input.view(), 4.0, 10).unwrap();
        let min = input.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = input.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for &v in out.iter() {
            assert!(v >= min - 1e-12 && v <= max + 1e-12);
        }
    }

    #[test]
    fn adjoint_pass_satisfies_the_inner_product_identity() {
        let mut rng = StdRng::seed_from_u64(17);
        let x = Array2::random_using((7, 6), Uniform::new(-1.0, 1.0), &mut rng);
        let g = Array2::random_using((7, 6), Uniform::new(-1.0, 1.0), &mut rng);

        let forward = gaussian_blur(&x.view(), 1.5, 4).unwrap();
        let pulled_back = gaussian_blur_vjp(&g.view(), 1.5, 4).unwrap();

        let lhs = (&forward * &g).sum();
        let rhs = (&x * &pulled_back).sum();
        assert_relative_eq!(lhs, rhs, epsilon = 1e-10);
    }

    #[test]
    fn single_pass_adjoint_is_exact_per_axis() {
        let mut rng = StdRng::seed_from_u64(23);
        let x = Array2::random_using((6, 5), Uniform::new(-1.0, 1.0), &mut rng);
        let g = Array2::random_using((6, 5), Uniform::new(-1.0, 1.0), &mut rng);
        let kernel = gaussian_kernel(2.0, 3);
        for axis in [Axis(0), Axis(1)] {
            let forward = convolve_replicate(&x.view(), &kernel, axis);
            let adjoint = convolve_replicate_adjoint(&g.view(), &kernel, axis);
            assert_relative_eq!((&forward * &g).sum(), (&x * &adjoint).sum(), epsilon = 1e-10);
        }
    }

    #[test]
    fn sigma_gradient_matches_finite_differences() {
        let mut rng = StdRng::seed_from_u64(29);
        let x = Array2::random_using((6, 5), Uniform::new(0.0, 1.0), &mut rng);
        let g = Array2::random_using((6, 5), Uniform::new(-1.0, 1.0), &mut rng);
        let sigma = 2.0;
        let radius = 6;

        let grad = gaussian_blur_grad_sigma(&g.view(), &x.view(), sigma, radius).unwrap();

        let h = 1e-5;
        let lp = (&gaussian_blur(&x.view(), sigma + h, radius).unwrap() * &g).sum();
        let lm = (&gaussian_blur(&x.view(), sigma - h, radius).unwrap() * &g).sum();
        let numeric = (lp - lm) / (2.0 * h);
        assert_relative_eq!(grad, numeric, epsilon = 1e-7, max_relative = 1e-5);
    }

    #[test]
    fn stack_matches_per_map_blur() {
        let mut rng = StdRng::seed_from_u64(31);
        let stack = Array3::random_using((3, 5, 4), Uniform::new(0.0, 1.0), &mut rng);
        let blurred = gaussian_blur_stack(&stack.view(), 1.2, 3).unwrap();
        for i in 0..3 {
            let single =
                gaussian_blur(&stack.index_axis(Axis(0), i), 1.2, 3).unwrap();
            assert_relative_eq!(blurred.index_axis(Axis(0), i), single.view(), epsilon = 1e-13);
        }
    }

    #[test]
    fn zero_radius_is_rejected_at_every_entry_point() {
        let input = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let g = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
        let stack = Array3::from_elem((2, 2, 2), 1.0);
        let rejected = Error::NonPositiveWindow { radius: 0 };

        assert_eq!(gaussian_blur(&input.view(), 1.0, 0).unwrap_err(), rejected);
        assert_eq!(gaussian_blur_vjp(&g.view(), 1.0, 0).unwrap_err(), rejected);
        assert_eq!(
            gaussian_blur_grad_sigma(&g.view(), &input.view(), 1.0, 0).unwrap_err(),
            rejected
        );
        assert_eq!(
            gaussian_blur_stack(&stack.view(), 1.0, 0).unwrap_err(),
            rejected
        );
    }

    #[test]
    fn passes_commute() {
        // Clamped indexing keeps the two 1-D passes independent, so the
        // height-then-width order used by the blur equals width-then-height.
        let mut rng = StdRng::seed_from_u64(37);
        let x = Array2::random_using((5, 7), Uniform::new(-1.0, 1.0), &mut rng);
        let kernel = gaussian_kernel(1.7, 4);
        let hw = convolve_replicate(
            &convolve_replicate(&x.view(), &kernel, Axis(0)).view(),
            &kernel,
            Axis(1),
        );
        let wh = convolve_replicate(
            &convolve_replicate(&x.view(), &kernel, Axis(1)).view(),
            &kernel,
            Axis(0),
        );
        assert_relative_eq!(hw, wh, epsilon = 1e-12);
    }
}
