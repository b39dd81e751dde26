//! Correlated latent score generation via Cholesky factorization.
//!
//! Given a target correlation matrix M = L·Lᵗ, a row vector u of independent
//! standard normals becomes c = u·Lᵗ, whose covariance is M. Marginals stay
//! standard normal, and the sample correlations of N rows converge to M as N
//! grows. Finite-N deviations are sampling noise.

use super::SeedContext;
use crate::config::CorrelationTargets;
use crate::error::{Result, SynthError};
use crate::models::{Construct, LatentMatrix};
use nalgebra::{Matrix3, Vector3};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Validated 3×3 target correlation matrix with its Cholesky factor.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCorrelationMatrix {
    matrix: Matrix3<f64>,
    factor: Matrix3<f64>,
}

impl TargetCorrelationMatrix {
    /// Build from pairwise targets.
    pub fn from_targets(targets: &CorrelationTargets) -> Result<Self> {
        Self::from_rows(targets.to_rows())
    }

    /// Build from a full matrix in canonical construct order.
    ///
    /// Structural defects (non-finite entries, asymmetry, non-unit diagonal,
    /// entries outside [-1, 1]) are configuration errors. A matrix that passes
    /// those checks but cannot be factorized is a numerical error.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self> {
        for i in 0..3 {
            for j in 0..3 {
                let v = rows[i][j];
                if !v.is_finite() {
                    return Err(SynthError::config(format!(
                        "correlation matrix entry ({i}, {j}) is not finite"
                    )));
                }
                if !(-1.0..=1.0).contains(&v) {
                    return Err(SynthError::config(format!(
                        "correlation matrix entry ({i}, {j}) = {v} outside [-1, 1]"
                    )));
                }
                if (v - rows[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(SynthError::config(format!(
                        "correlation matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
            if (rows[i][i] - 1.0).abs() > SYMMETRY_TOLERANCE {
                return Err(SynthError::config(format!(
                    "correlation matrix diagonal entry {i} is {} (expected 1)",
                    rows[i][i]
                )));
            }
        }

        let matrix = Matrix3::from_fn(|i, j| rows[i][j]);
        let factor = match matrix.cholesky() {
            Some(chol) => chol.l(),
            None => {
                return Err(SynthError::numerical(format!(
                    "target correlation matrix is not positive definite \
                     (smallest eigenvalue {:.6})",
                    smallest_eigenvalue(&matrix)
                )))
            }
        };

        Ok(Self { matrix, factor })
    }

    /// Target correlation between two constructs.
    pub fn get(&self, a: Construct, b: Construct) -> f64 {
        self.matrix[(a.index(), b.index())]
    }

    /// The correlation matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Lower-triangular L with L·Lᵗ = M.
    pub fn factor(&self) -> &Matrix3<f64> {
        &self.factor
    }

    /// Smallest eigenvalue of the matrix.
    pub fn smallest_eigenvalue(&self) -> f64 {
        smallest_eigenvalue(&self.matrix)
    }
}

fn smallest_eigenvalue(m: &Matrix3<f64>) -> f64 {
    m.symmetric_eigenvalues().min()
}

/// Produces N correlated latent triples from a target correlation matrix.
#[derive(Debug, Clone)]
pub struct CorrelatedLatentGenerator {
    target: TargetCorrelationMatrix,
}

impl CorrelatedLatentGenerator {
    /// Create a generator for a validated target matrix.
    pub fn new(target: TargetCorrelationMatrix) -> Self {
        Self { target }
    }

    /// Validate targets and create a generator.
    pub fn from_targets(targets: &CorrelationTargets) -> Result<Self> {
        Ok(Self::new(TargetCorrelationMatrix::from_targets(targets)?))
    }

    /// Target matrix.
    pub fn target(&self) -> &TargetCorrelationMatrix {
        &self.target
    }

    /// Generate `n` rows. Draws three standard normals per row, row by row.
    pub fn generate(&self, n: usize, ctx: &mut SeedContext) -> Result<LatentMatrix> {
        if n == 0 {
            return Err(SynthError::config("sample size must be positive"));
        }
        let l = self.target.factor();
        let mut latent = LatentMatrix::zeros(n);
        for i in 0..n {
            let u = Vector3::new(
                ctx.standard_normal(),
                ctx.standard_normal(),
                ctx.standard_normal(),
            );
            // Row form u·Lᵗ equals (L·u)ᵗ.
            let c = l * u;
            latent.set_row(i, [c[0], c[1], c[2]]);
        }
        Ok(latent)
    }
}
