//! Dense symmetric positive-definite solves for the IRLS normal equations.

/// Lower-triangular Cholesky factor `L` with `A = L * L^T`.
///
/// Returns `None` when `a` is not numerically positive definite.
pub(crate) fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = a[i][i] - sum;
                if !(diag > 1e-12 * a[i][i].abs().max(1.0)) {
                    return None;
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L * L^T * x = b` by forward then backward substitution.
pub(crate) fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = l.len();

    let mut y = vec![0.0f64; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i][j] * y[j]).sum();
        y[i] = (b[i] - sum) / l[i][i];
    }

    let mut x = vec![0.0f64; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[j][i] * x[j]).sum();
        x[i] = (y[i] - sum) / l[i][i];
    }
    x
}

/// Inverse of `L * L^T`, one unit-vector solve per column.
pub(crate) fn cholesky_inverse(l: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = l.len();
    let mut inv = vec![vec![0.0f64; n]; n];
    for col in 0..n {
        let mut e = vec![0.0f64; n];
        e[col] = 1.0;
        let x = cholesky_solve(l, &e);
        for (row, v) in x.into_iter().enumerate() {
            inv[row][col] = v;
        }
    }
    inv
}
