use ndarray::{Array1, Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::error::{Error, Result};
use crate::ops;

/// Multiplicative center bias. Each pixel is scaled by a piecewise-linear
/// function of its distance from the image center; `alpha` shapes the
/// distance metric and `ys` holds the trainable knot values. With fewer
/// than two knots there is no table to interpolate and the layer is a
/// pass-through.
#[pyclass]
pub struct CenterBias {
    ys: Array1<f64>,
    alpha: f64,
}

#[pymethods]
impl CenterBias {
    #[new]
    #[pyo3(signature = (ys = None, alpha = 1.0))]
    pub fn new(ys: Option<PyReadonlyArray1<f64>>, alpha: f64) -> Self {
        let ys = match ys {
            Some(ys) => ys.as_array().to_owned(),
            None => Array1::ones(12),
        };
        Self { ys, alpha }
    }

    #[getter]
    pub fn get_ys<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.ys.clone().into_pyarray(py)
    }

    #[setter]
    pub fn set_ys(&mut self, ys: PyReadonlyArray1<f64>) {
        self.ys = ys.as_array().to_owned();
    }

    #[getter]
    pub fn get_alpha(&self) -> f64 {
        self.alpha
    }

    #[setter]
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
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
    ) -> PyResult<(&'py PyArray2<f64>, &'py PyArray1<f64>, f64)> {
        let (grad_input, grad_ys, grad_alpha) =
            self.backward_internal(&grad_output.as_array(), &input.as_array())?;
        Ok((
            grad_input.into_pyarray(py),
            grad_ys.into_pyarray(py),
            grad_alpha,
        ))
    }
}

impl CenterBias {
    pub fn from_parts(ys: Array1<f64>, alpha: f64) -> Self {
        Self { ys, alpha }
    }

    fn active(&self) -> bool {
        self.ys.len() >= 2
    }

    fn knot_positions(&self) -> Array1<f64> {
        Array1::linspace(0.0, 1.0, self.ys.len())
    }

    /// The per-pixel factors the input is multiplied by.
    pub fn factors(&self, height: usize, width: usize) -> Result<Array2<f64>> {
        let dists = ops::distance_grid(height, width, self.alpha);
        let xs = self.knot_positions();
        ops::piecewise_linear(&dists.view(), &xs.view(), &self.ys.view())
    }

    pub fn forward_internal(&self, input: &ArrayView2<f64>) -> Result<Array2<f64>> {
        if !self.active() {
            return Ok(input.to_owned());
        }
        let (height, width) = input.dim();
        let factors = self.factors(height, width)?;
        Ok(input * &factors)
    }

    pub fn backward_internal(
        &self,
        grad_output: &ArrayView2<f64>,
        input: &ArrayView2<f64>,
    ) -> Result<(Array2<f64>, Array1<f64>, f64)> {
        if grad_output.dim() != input.dim() {
            return Err(Error::ShapeMismatch {
                expected: vec![input.nrows(), input.ncols()],
                got: vec![grad_output.nrows(), grad_output.ncols()],
            });
        }
        if !self.active() {
            return Ok((
                grad_output.to_owned(),
                Array1::zeros(self.ys.len()),
                0.0,
            ));
        }
        let (height, width) = input.dim();
        let dists = ops::distance_grid(height, width, self.alpha);
        let xs = self.knot_positions();
        let factors = ops::piecewise_linear(&dists.view(), &xs.view(), &self.ys.view())?;

        let grad_input = grad_output * &factors;

        // The product rule routes the other branch through the factors.
        let grad_factors = grad_output * input;
        let grad_ys = ops::piecewise_linear_grad_knots(
            &grad_factors.view(),
            &dists.view(),
            &xs.view(),
            &self.ys.view(),
        )?;
        let grad_dists = ops::piecewise_linear_vjp(
            &grad_factors.view(),
            &dists.view(),
            &xs.view(),
            &self.ys.view(),
        )?;
        let grad_alpha =
            (&grad_dists * &ops::distance_grid_grad_alpha(height, width, self.alpha)).sum();

        Ok((grad_input, grad_ys, grad_alpha))
    }
}
