//! Latent score matrix: one standardized value per subject per construct.

use super::{Construct, PerConstruct};

/// N × 3 matrix of latent scores, stored column-wise by construct.
///
/// Produced by the correlated latent generator, shifted in place by the
/// effect injector and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatentMatrix {
    columns: PerConstruct<Vec<f64>>,
}

impl LatentMatrix {
    /// Create a zero-filled matrix for `n` subjects.
    pub fn zeros(n: usize) -> Self {
        Self {
            columns: PerConstruct::from_fn(|_| vec![0.0; n]),
        }
    }

    /// Create from per-construct columns.
    ///
    /// Returns `None` if the columns differ in length.
    pub fn from_columns(columns: PerConstruct<Vec<f64>>) -> Option<Self> {
        let n = columns.social_media.len();
        if columns.body_image.len() != n || columns.depression.len() != n {
            return None;
        }
        Some(Self { columns })
    }

    /// Number of subjects (rows).
    pub fn len(&self) -> usize {
        self.columns.social_media.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latent values of one construct.
    pub fn column(&self, construct: Construct) -> &[f64] {
        &self.columns[construct]
    }

    /// Mutable latent values of one construct.
    pub fn column_mut(&mut self, construct: Construct) -> &mut [f64] {
        &mut self.columns[construct]
    }

    /// Latent triple of one subject.
    pub fn row(&self, subject: usize) -> PerConstruct<f64> {
        self.columns.map(|_, col| col[subject])
    }

    /// Overwrite the latent triple of one subject.
    pub fn set_row(&mut self, subject: usize, values: [f64; Construct::COUNT]) {
        for c in Construct::ALL {
            self.columns[c][subject] = values[c.index()];
        }
    }

    /// Consume into per-construct columns.
    pub fn into_columns(self) -> PerConstruct<Vec<f64>> {
        self.columns
    }
}
