use ndarray::{Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::error::Result;
use crate::ops;

/// Normalizes a nonnegative map into a log probability distribution.
/// Stateless; both directions are thin wrappers over the kernels.
#[pyclass]
pub struct LogDensity;

#[pymethods]
impl LogDensity {
    #[new]
    pub fn new() -> Self {
        Self
    }

    pub fn forward<'py>(
        &self,
        py: Python<'py>,
        input: PyReadonlyArray2<f64>,
    ) -> &'py PyArray2<f64> {
        self.forward_internal(&input.as_array()).into_pyarray(py)
    }

    pub fn backward<'py>(
        &self,
        py: Python<'py>,
        grad_output: PyReadonlyArray2<f64>,
        input: PyReadonlyArray2<f64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let grad = self.backward_internal(&grad_output.as_array(), &input.as_array())?;
        Ok(grad.into_pyarray(py))
    }
}

impl LogDensity {
    pub fn forward_internal(&self, input: &ArrayView2<f64>) -> Array2<f64> {
        ops::log_density(input)
    }

    pub fn backward_internal(
        &self,
        grad_output: &ArrayView2<f64>,
        input: &ArrayView2<f64>,
    ) -> Result<Array2<f64>> {
        ops::log_density_vjp(grad_output, input)
    }
}
