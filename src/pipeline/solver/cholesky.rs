//! Cholesky solve for the Newton system

use faer::prelude::SpSolver;
use faer::{Mat, Side};

/// Solve `A x = b` for symmetric positive definite `A` with faer's LLT.
///
/// Returns `None` when `A` is not positive definite at working precision or
/// the solution is not finite.
pub(super) fn cholesky_solve(a: &Mat<f64>, b: &[f64]) -> Option<Vec<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    let llt = a.as_ref().cholesky(Side::Lower).ok()?;
    let rhs = Mat::<f64>::from_fn(n, 1, |i, _| b[i]);
    let solution = llt.solve(rhs.as_ref());

    let x: Vec<f64> = (0..n).map(|i| solution[(i, 0)]).collect();
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_spd_system() {
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 4.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 2.0;
        a[(1, 1)] = 3.0;

        let x = cholesky_solve(&a, &[2.0, 1.0]).unwrap();
        // 4x + 2y = 2, 2x + 3y = 1 -> x = 0.5, y = 0
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
    }

    #[test]
    fn test_rejects_indefinite_matrix() {
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 2.0;
        a[(1, 1)] = 1.0;
        assert!(cholesky_solve(&a, &[1.0, 1.0]).is_none());
    }
}
