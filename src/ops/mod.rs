pub mod blur;
pub mod density;
pub mod interp;
pub mod kernel;
pub mod radial;

/// Shared guard against division by zero in gradient formulas.
pub const EPS: f64 = 1e-12;

pub use self::blur::{
    convolve_replicate, convolve_replicate_adjoint, gaussian_blur, gaussian_blur_grad_sigma,
    gaussian_blur_stack, gaussian_blur_vjp,
};
pub use self::density::{
    average_log_likelihood, average_log_likelihood_vjp, fixation_log_likelihoods,
    fixation_log_likelihoods_vjp, log_density, log_density_vjp, DENSITY_EPS,
};
pub use self::interp::{piecewise_linear, piecewise_linear_grad_knots, piecewise_linear_vjp};
pub use self::kernel::{gaussian_kernel, gaussian_kernel_grad_sigma, SIGMA_EPS};
pub use self::radial::{distance_grid, distance_grid_grad_alpha, CENTER_OFFSET};
