use ndarray::{Array2, ArrayView1, ArrayView2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::error::Result;
use crate::ops;

/// Mean log-likelihood of a set of fixations under a log density map.
/// Fixations are `(x, y)` integer index pairs into the map.
#[pyclass]
pub struct AverageLogLikelihood;

#[pymethods]
impl AverageLogLikelihood {
    #[new]
    pub fn new() -> Self {
        Self
    }

    pub fn forward(
        &self,
        log_density: PyReadonlyArray2<f64>,
        x_inds: PyReadonlyArray1<i64>,
        y_inds: PyReadonlyArray1<i64>,
    ) -> PyResult<f64> {
        Ok(self.forward_internal(
            &log_density.as_array(),
            &x_inds.as_array(),
            &y_inds.as_array(),
        )?)
    }

    /// Per-fixation log-likelihoods, before averaging.
    pub fn log_likelihoods<'py>(
        &self,
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

    pub fn backward<'py>(
        &self,
        py: Python<'py>,
        grad: f64,
        height: usize,
        width: usize,
        x_inds: PyReadonlyArray1<i64>,
        y_inds: PyReadonlyArray1<i64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let grad_map = self.backward_internal(
            grad,
            (height, width),
            &x_inds.as_array(),
            &y_inds.as_array(),
        )?;
        Ok(grad_map.into_pyarray(py))
    }
}

impl AverageLogLikelihood {
    pub fn forward_internal(
        &self,
        log_density: &ArrayView2<f64>,
        x_inds: &ArrayView1<i64>,
        y_inds: &ArrayView1<i64>,
    ) -> Result<f64> {
        ops::average_log_likelihood(log_density, x_inds, y_inds)
    }

    pub fn backward_internal(
        &self,
        grad: f64,
        shape: (usize, usize),
        x_inds: &ArrayView1<i64>,
        y_inds: &ArrayView1<i64>,
    ) -> Result<Array2<f64>> {
        ops::average_log_likelihood_vjp(grad, shape, x_inds, y_inds)
    }
}
