use ndarray::{Array1, Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use crate::error::{Error, Result};
use crate::ops;

/// Learned pointwise nonlinearity, a piecewise-linear table over `[0, 1]`.
/// The knot positions are fixed and evenly spaced; only the knot values
/// `ys` are trainable. The default table is the identity.
#[pyclass]
#[derive(Debug)]
pub struct Nonlinearity {
    xs: Array1<f64>,
    ys: Array1<f64>,
}

#[pymethods]
impl Nonlinearity {
    #[new]
    #[pyo3(signature = (ys = None))]
    pub fn new(ys: Option<PyReadonlyArray1<f64>>) -> PyResult<Self> {
        let ys = match ys {
            Some(ys) => ys.as_array().to_owned(),
            None => Array1::linspace(0.0, 1.0, 20),
        };
        Ok(Self::from_ys(ys)?)
    }

    #[getter]
    pub fn get_xs<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.xs.clone().into_pyarray(py)
    }

    #[getter]
    pub fn get_ys<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.ys.clone().into_pyarray(py)
    }

    #[setter]
    pub fn set_ys(&mut self, ys: PyReadonlyArray1<f64>) -> PyResult<()> {
        let ys = ys.as_array().to_owned();
        *self = Self::from_ys(ys)?;
        Ok(())
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
    ) -> PyResult<(&'py PyArray2<f64>, &'py PyArray1<f64>)> {
        let (grad_input, grad_ys) =
            self.backward_internal(&grad_output.as_array(), &input.as_array())?;
        Ok((grad_input.into_pyarray(py), grad_ys.into_pyarray(py)))
    }
}

impl Nonlinearity {
    /// Builds the layer from knot values, spacing the knot positions evenly
    /// over `[0, 1]`.
    pub fn from_ys(ys: Array1<f64>) -> Result<Self> {
        if ys.len() < 2 {
            return Err(Error::KnotsTooShort { len: ys.len() });
        }
        let xs = Array1::linspace(0.0, 1.0, ys.len());
        Ok(Self { xs, ys })
    }

    pub fn forward_internal(&self, input: &ArrayView2<f64>) -> Result<Array2<f64>> {
        ops::piecewise_linear(input, &self.xs.view(), &self.ys.view())
    }

    pub fn backward_internal(
        &self,
        grad_output: &ArrayView2<f64>,
        input: &ArrayView2<f64>,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        let grad_input =
            ops::piecewise_linear_vjp(grad_output, input, &self.xs.view(), &self.ys.view())?;
        let grad_ys =
            ops::piecewise_linear_grad_knots(grad_output, input, &self.xs.view(), &self.ys.view())?;
        Ok((grad_input, grad_ys))
    }
}
