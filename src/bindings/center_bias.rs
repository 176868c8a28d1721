use numpy::{IntoPyArray, PyArray2};
use pyo3::prelude::*;

use crate::ops;

#[pyfunction]
#[pyo3(signature = (height, width, alpha = 1.0))]
pub fn distance_grid<'py>(
    py: Python<'py>,
    height: usize,
    width: usize,
    alpha: f64,
) -> &'py PyArray2<f64> {
    ops::distance_grid(height, width, alpha).into_pyarray(py)
}

#[pyfunction]
#[pyo3(signature = (height, width, alpha = 1.0))]
pub fn distance_grid_grad_alpha<'py>(
    py: Python<'py>,
    height: usize,
    width: usize,
    alpha: f64,
) -> &'py PyArray2<f64> {
    ops::distance_grid_grad_alpha(height, width, alpha).into_pyarray(py)
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(distance_grid, m)?)?;
    m.add_function(wrap_pyfunction!(distance_grid_grad_alpha, m)?)?;
    Ok(())
}
