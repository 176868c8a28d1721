use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::ops;

#[pyfunction]
pub fn log_density<'py>(py: Python<'py>, input: PyReadonlyArray2<f64>) -> &'py PyArray2<f64> {
    ops::log_density(&input.as_array()).into_pyarray(py)
}

#[pyfunction]
pub fn log_density_backward<'py>(
    py: Python<'py>,
    grad_output: PyReadonlyArray2<f64>,
    input: PyReadonlyArray2<f64>,
) -> PyResult<&'py PyArray2<f64>> {
    let grad = ops::log_density_vjp(&grad_output.as_array(), &input.as_array())?;
    Ok(grad.into_pyarray(py))
}

#[pyfunction]
pub fn fixation_log_likelihoods<'py>(
    py: Python<'py>,
    log_density: PyReadonlyArray2<f64>,
    x_inds: PyReadonlyArray1<i64>,
    y_inds: PyReadonlyArray1<i64>,
) -> PyResult<&'py PyArray1<f64>> {
    let lls = ops::fixation_log_likelihoods(
        &log_density.as_array(),
        &x_inds.as_array(),
        &y_inds.as_array(),
    )?;
    Ok(lls.into_pyarray(py))
}

#[pyfunction]
pub fn average_log_likelihood(
    log_density: PyReadonlyArray2<f64>,
    x_inds: PyReadonlyArray1<i64>,
    y_inds: PyReadonlyArray1<i64>,
) -> PyResult<f64> {
    Ok(ops::average_log_likelihood(
        &log_density.as_array(),
        &x_inds.as_array(),
        &y_inds.as_array(),
    )?)
}

#[pyfunction]
pub fn average_log_likelihood_backward<'py>(
    py: Python<'py>,
    grad: f64,
    height: usize,
    width: usize,
    x_inds: PyReadonlyArray1<i64>,
    y_inds: PyReadonlyArray1<i64>,
) -> PyResult<&'py PyArray2<f64>> {
    let grad_map = ops::average_log_likelihood_vjp(
        grad,
        (height, width),
        &x_inds.as_array(),
        &y_inds.as_array(),
    )?;
    Ok(grad_map.into_pyarray(py))
}

#[pyfunction]
pub fn fixation_log_likelihoods_backward<'py>(
    py: Python<'py>,
    grad_lls: PyReadonlyArray1<f64>,
    height: usize,
    width: usize,
    x_inds: PyReadonlyArray1<i64>,
    y_inds: PyReadonlyArray1<i64>,
) -> PyResult<&'py PyArray2<f64>> {
    let grad_map = ops::fixation_log_likelihoods_vjp(
        &grad_lls.as_array(),
        (height, width),
        &x_inds.as_array(),
        &y_inds.as_array(),
    )?;
    Ok(grad_map.into_pyarray(py))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(log_density, m)?)?;
    m.add_function(wrap_pyfunction!(log_density_backward, m)?)?;
    m.add_function(wrap_pyfunction!(fixation_log_likelihoods, m)?)?;
    m.add_function(wrap_pyfunction!(fixation_log_likelihoods_backward, m)?)?;
    m.add_function(wrap_pyfunction!(average_log_likelihood, m)?)?;
    m.add_function(wrap_pyfunction!(average_log_likelihood_backward, m)?)?;
    Ok(())
}
