//! Elementwise piecewise-linear interpolation between control points.
//!
//! The scalar function is the sum-of-clipped-ramps form
//! `y[0] + sum_i (y[i+1]-y[i])/(x[i+1]-x[i]) * (clip(v, x[i], x[i+1]) - x[i])`,
//! telescoped into a segment lookup: flat at `ys[0]` below the table, flat at
//! `ys[n-1]` above it, linear in between. Only the ordinates `ys` are treated
//! as learnable; the abscissae `xs` stay fixed.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

#[derive(Clone, Copy)]
enum Locate {
    Below,
    Inside { seg: usize, t: f64 },
    Above,
}

fn locate(v: f64, xs: &ArrayView1<f64>) -> Locate {
    let n = xs.len();
    if v < xs[0] {
        return Locate::Below;
    }
    if v >= xs[n - 1] {
        return Locate::Above;
    }
    let mut lo = 0usize;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= v {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let t = (v - xs[lo]) / (xs[lo + 1] - xs[lo]);
    Locate::Inside { seg: lo, t }
}

fn validate_knots(xs: &ArrayView1<f64>, ys: &ArrayView1<f64>) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(Error::ShapeMismatch {
            expected: vec![xs.len()],
            got: vec![ys.len()],
        });
    }
    if xs.len() < 2 {
        return Err(Error::KnotsTooShort { len: xs.len() });
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(Error::KnotsNotIncreasing { index: i });
        }
    }
    Ok(())
}

fn validate_pair(grad_output: &ArrayView2<f64>, values: &ArrayView2<f64>) -> Result<()> {
    if grad_output.dim() != values.dim() {
        return Err(Error::ShapeMismatch {
            expected: vec![values.nrows(), values.ncols()],
            got: vec![grad_output.nrows(), grad_output.ncols()],
        });
    }
    Ok(())
}

/// Applies the piecewise-linear function elementwise.
pub fn piecewise_linear(
    values: &ArrayView2<f64>,
    xs: &ArrayView1<f64>,
    ys: &ArrayView1<f64>,
) -> Result<Array2<f64>> {
    validate_knots(xs, ys)?;
    let n = ys.len();
    Ok(values.mapv(|v| match locate(v, xs) {
        Locate::Below => ys[0],
        Locate::Above => ys[n - 1],
        Locate::Inside { seg, t } => ys[seg] * (1.0 - t) + ys[seg + 1] * t,
    }))
}

/// Gradient with respect to the interpolated values: the active segment's
/// slope inside the table, zero where the clipped ramps saturate.
pub fn piecewise_linear_vjp(
    grad_output: &ArrayView2<f64>,
    values: &ArrayView2<f64>,
    xs: &ArrayView1<f64>,
    ys: &ArrayView1<f64>,
) -> Result<Array2<f64>> {
    validate_knots(xs, ys)?;
    validate_pair(grad_output, values)?;
    let mut grad = Array2::zeros(values.dim());
    Zip::from(&mut grad)
        .and(values)
        .and(grad_output)
        .for_each(|g, &v, &go| {
            *g = match locate(v, xs) {
                Locate::Inside { seg, .. } => {
                    go * (ys[seg + 1] - ys[seg]) / (xs[seg + 1] - xs[seg])
                }
                _ => 0.0,
            };
        });
    Ok(grad)
}

/// Gradient with respect to the ordinates `ys`, accumulated over every
/// element. An element at parameter `t` of segment `seg` splits its upstream
/// gradient `(1-t)` / `t` between the segment's endpoint knots; saturated
/// elements push their whole gradient onto the nearest endpoint.
pub fn piecewise_linear_grad_knots(
    grad_output: &ArrayView2<f64>,
    values: &ArrayView2<f64>,
    xs: &ArrayView1<f64>,
    ys: &ArrayView1<f64>,
) -> Result<Array1<f64>> {
    validate_knots(xs, ys)?;
    validate_pair(grad_output, values)?;
    let n = ys.len();
    let mut grad = Array1::zeros(n);
    Zip::from(values).and(grad_output).for_each(|&v, &go| {
        match locate(v, xs) {
            Locate::Below => grad[0] += go,
            Locate::Above => grad[n - 1] += go,
            Locate::Inside { seg, t } => {
                grad[seg] += go * (1.0 - t);
                grad[seg + 1] += go * t;
            }
        }
    });
    Ok(grad)
}
