mod blur;
mod center_bias;
mod density;
mod nonlinearity;

use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::layers;

/// Foveate - differentiable saliency pipelines in Rust
#[pymodule]
pub fn _rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", "0.3.0")?;
    // Blur kernels
    blur::register(m)?;
    // Piecewise-linear nonlinearity
    nonlinearity::register(m)?;
    // Center bias grids
    center_bias::register(m)?;
    // Densities and likelihoods
    density::register(m)?;
    // Layer classes
    m.add_class::<layers::Blur>()?;
    m.add_class::<layers::Nonlinearity>()?;
    m.add_class::<layers::CenterBias>()?;
    m.add_class::<layers::LogDensity>()?;
    m.add_class::<layers::AverageLogLikelihood>()?;
    Ok(())
}
