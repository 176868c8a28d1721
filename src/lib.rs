//! Differentiable building blocks for fixation-based saliency models:
//! Gaussian blur, a learned pointwise nonlinearity, a radial center bias,
//! log-density normalization and fixation log-likelihoods, each with exact
//! analytic gradients.

mod bindings;
pub mod error;
pub mod layers;
pub mod ops;

pub use error::{Error, Result};
