use pyo3::exceptions::PyValueError;
use pyo3::PyErr;
use thiserror::Error;

/// Result type alias using foveate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported for malformed operator inputs.
///
/// Every variant maps to a Python `ValueError` at the binding boundary, so a
/// bad argument raises instead of panicking inside the extension.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Gradient and value arrays must agree in shape
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Paired per-fixation vectors must have equal lengths
    #[error("length mismatch: {left} x-indices vs {right} y-indices")]
    LengthMismatch {
        /// Length of the x-index vector
        left: usize,
        /// Length of the y-index vector
        right: usize,
    },

    /// A piecewise-linear table needs at least two control points
    #[error("piecewise-linear table needs at least 2 control points, got {len}")]
    KnotsTooShort {
        /// Number of control points supplied
        len: usize,
    },

    /// Control-point abscissae must be strictly increasing
    #[error("piecewise-linear abscissae must be strictly increasing (violated at index {index})")]
    KnotsNotIncreasing {
        /// First index whose abscissa does not exceed its predecessor
        index: usize,
    },

    /// A fixation index fell outside the map
    #[error("fixation {index} at (x={x}, y={y}) is outside a {height}x{width} map")]
    FixationOutOfBounds {
        /// Position of the offending fixation in the index vectors
        index: usize,
        /// Column index of the fixation
        x: i64,
        /// Row index of the fixation
        y: i64,
        /// Map height
        height: usize,
        /// Map width
        width: usize,
    },

    /// The mean log-likelihood over zero fixations is undefined
    #[error("cannot average the log-likelihood of zero fixations")]
    EmptyFixations,

    /// Blur windows must cover at least one neighbor on each side
    #[error("blur window radius must be at least 1, got {radius}")]
    NonPositiveWindow {
        /// The rejected radius
        radius: usize,
    },
}

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = Error::FixationOutOfBounds {
            index: 3,
            x: 80,
            y: -1,
            height: 24,
            width: 32,
        };
        let msg = err.to_string();
        assert!(msg.contains("fixation 3"));
        assert!(msg.contains("24x32"));

        let err = Error::KnotsNotIncreasing { index: 5 };
        assert!(err.to_string().contains("index 5"));
    }
}
