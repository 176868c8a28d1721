use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::ops;

#[pyfunction]
pub fn piecewise_linear<'py>(
    py: Python<'py>,
    input: PyReadonlyArray2<f64>,
    xs: PyReadonlyArray1<f64>,
    ys: PyReadonlyArray1<f64>,
) -> PyResult<&'py PyArray2<f64>> {
    let input_arr = input.as_array();
    let output = ops::piecewise_linear(&input_arr, &xs.as_array(), &ys.as_array())?;
    Ok(output.into_pyarray(py))
}

#[pyfunction]
pub fn piecewise_linear_backward<'py>(
    py: Python<'py>,
    grad_output: PyReadonlyArray2<f64>,
    input: PyReadonlyArray2<f64>,
    xs: PyReadonlyArray1<f64>,
    ys: PyReadonlyArray1<f64>,
) -> PyResult<(&'py PyArray2<f64>, &'py PyArray1<f64>)> {
    let grad_output_arr = grad_output.as_array();
    let input_arr = input.as_array();
    let xs_arr = xs.as_array();
    let ys_arr = ys.as_array();

    let grad_input = ops::piecewise_linear_vjp(&grad_output_arr, &input_arr, &xs_arr, &ys_arr)?;
    let grad_ys =
        ops::piecewise_linear_grad_knots(&grad_output_arr, &input_arr, &xs_arr, &ys_arr)?;

    Ok((grad_input.into_pyarray(py), grad_ys.into_pyarray(py)))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(piecewise_linear, m)?)?;
    m.add_function(wrap_pyfunction!(piecewise_linear_backward, m)?)?;
    Ok(())
}
