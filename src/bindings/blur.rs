use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::prelude::*;

use crate::ops;

#[pyfunction]
#[pyo3(signature = (input, sigma, window_radius = 40))]
pub fn gaussian_blur<'py>(
    py: Python<'py>,
    input: PyReadonlyArray2<f64>,
    sigma: f64,
    window_radius: usize,
) -> PyResult<&'py PyArray2<f64>> {
    let input_arr = input.as_array();
    let output = ops::gaussian_blur(&input_arr, sigma, window_radius)?;
    Ok(output.into_pyarray(py))
}

#[pyfunction]
#[pyo3(signature = (grad_output, input, sigma, window_radius = 40))]
pub fn gaussian_blur_backward<'py>(
    py: Python<'py>,
    grad_output: PyReadonlyArray2<f64>,
    input: PyReadonlyArray2<f64>,
    sigma: f64,
    window_radius: usize,
) -> PyResult<(&'py PyArray2<f64>, f64)> {
    let grad_output_arr = grad_output.as_array();
    let input_arr = input.as_array();

    let grad_input = ops::gaussian_blur_vjp(&grad_output_arr, sigma, window_radius)?;
    let grad_sigma =
        ops::gaussian_blur_grad_sigma(&grad_output_arr, &input_arr, sigma, window_radius)?;

    Ok((grad_input.into_pyarray(py), grad_sigma))
}

#[pyfunction]
#[pyo3(signature = (input, sigma, window_radius = 40))]
pub fn gaussian_blur_stack<'py>(
    py: Python<'py>,
    input: PyReadonlyArray3<f64>,
    sigma: f64,
    window_radius: usize,
) -> PyResult<&'py PyArray3<f64>> {
    let input_arr = input.as_array();
    let output = ops::gaussian_blur_stack(&input_arr, sigma, window_radius)?;
    Ok(output.into_pyarray(py))
}

#[cfg(feature = "cuda")]
#[pyfunction]
pub fn gaussian_blur_cuda(
    _py: Python,
    input_ptr: usize,
    out_ptr: usize,
    sigma: f64,
    height: i64,
    width: i64,
    window_radius: i64,
) -> PyResult<()> {
    ops::blur::cuda::gaussian_blur_cuda(
        out_ptr as *mut f64,
        input_ptr as *const f64,
        sigma,
        height,
        width,
        window_radius,
    );
    Ok(())
}

#[cfg(feature = "cuda")]
#[pyfunction]
pub fn gaussian_blur_backward_cuda(
    _py: Python,
    grad_output_ptr: usize,
    grad_input_ptr: usize,
    sigma: f64,
    height: i64,
    width: i64,
    window_radius: i64,
) -> PyResult<()> {
    ops::blur::cuda::gaussian_blur_backward_cuda(
        grad_input_ptr as *mut f64,
        grad_output_ptr as *const f64,
        sigma,
        height,
        width,
        window_radius,
    );
    Ok(())
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
    m.add_function(wrap_pyfunction!(gaussian_blur_backward, m)?)?;
    m.add_function(wrap_pyfunction!(gaussian_blur_stack, m)?)?;
    #[cfg(feature = "cuda")]
    m.add_function(wrap_pyfunction!(gaussian_blur_cuda, m)?)?;
    #[cfg(feature = "cuda")]
    m.add_function(wrap_pyfunction!(gaussian_blur_backward_cuda, m)?)?;
    Ok(())
}
