use ndarray::{Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::error::{Error, Result};
use crate::ops;

/// Trainable Gaussian blur. `sigma` is the learned parameter; a sigma of
/// zero or less turns the layer into a pass-through with a zero sigma
/// gradient.
#[pyclass]
pub struct Blur {
    sigma: f64,
    window_radius: usize,
}

#[pymethods]
impl Blur {
    #[new]
    #[pyo3(signature = (sigma = 20.0, window_radius = 60))]
    pub fn new(sigma: f64, window_radius: usize) -> Self {
        Self {
            sigma,
            window_radius,
        }
    }

    #[getter]
    pub fn get_sigma(&self) -> f64 {
        self.sigma
    }

    #[setter]
    pub fn set_sigma(&mut self, sigma: f64) {
        self.sigma = sigma;
    }

    #[getter]
    pub fn get_window_radius(&self) -> usize {
        self.window_radius
    }

    #[setter]
    pub fn set_window_radius(&mut self, window_radius: usize) {
        self.window_radius = window_radius;
    }

    pub fn forward<'py>(
        &self,
        py: Python<'py>,
        input: PyReadonlyArray2<f64>,
    ) -> PyResult<&'py PyArray2<f64>> {
        let output = self.forward_internal(&input.as_array())?;
        Ok(output.into_pyarray(py))
    }

    pub fn backward<'py>(
        &self,
        py: Python<'py>,
        grad_output: PyReadonlyArray2<f64>,
        input: PyReadonlyArray2<f64>,
    ) -> PyResult<(&'py PyArray2<f64>, f64)> {
        let (grad_input, grad_sigma) =
            self.backward_internal(&grad_output.as_array(), &input.as_array())?;
        Ok((grad_input.into_pyarray(py), grad_sigma))
    }
}

impl Blur {
    pub fn forward_internal(&self, input: &ArrayView2<f64>) -> Result<Array2<f64>> {
        if self.sigma > 0.0 {
            ops::gaussian_blur(input, self.sigma, self.window_radius)
        } else {
            Ok(input.to_owned())
        }
    }

    pub fn backward_internal(
        &self,
        grad_output: &ArrayView2<f64>,
        input: &ArrayView2<f64>,
    ) -> Result<(Array2<f64>, f64)> {
        if grad_output.dim() != input.dim() {
            return Err(Error::ShapeMismatch {
                expected: vec![input.nrows(), input.ncols()],
                got: vec![grad_output.nrows(), grad_output.ncols()],
            });
        }
        if self.sigma > 0.0 {
            let grad_input =
                ops::gaussian_blur_vjp(grad_output, self.sigma, self.window_radius)?;
            let grad_sigma = ops::gaussian_blur_grad_sigma(
                grad_output,
                input,
                self.sigma,
                self.window_radius,
            )?;
            Ok((grad_input, grad_sigma))
        } else {
            Ok((grad_output.to_owned(), 0.0))
        }
    }
}
