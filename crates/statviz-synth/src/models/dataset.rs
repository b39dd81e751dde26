//! The finished synthetic dataset.

use super::{Construct, PerConstruct, Subject};
use serde::Serialize;

/// N × k matrix of integer item responses for one construct (row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMatrix {
    construct: Construct,
    subjects: usize,
    items: usize,
    scale_max: u8,
    data: Vec<u8>,
}

impl ItemMatrix {
    /// Create a matrix filled with the scale minimum (1).
    pub fn new(construct: Construct, subjects: usize, items: usize, scale_max: u8) -> Self {
        Self {
            construct,
            subjects,
            items,
            scale_max,
            data: vec![1; subjects * items],
        }
    }

    /// Construct the matrix measures.
    pub fn construct(&self) -> Construct {
        self.construct
    }

    /// Number of subjects (rows).
    pub fn subjects(&self) -> usize {
        self.subjects
    }

    /// Number of items (columns).
    pub fn items(&self) -> usize {
        self.items
    }

    /// Highest admissible response.
    pub fn scale_max(&self) -> u8 {
        self.scale_max
    }

    /// Response of `subject` to `item`.
    pub fn get(&self, subject: usize, item: usize) -> u8 {
        self.data[subject * self.items + item]
    }

    /// Set the response of `subject` to `item`.
    pub fn set(&mut self, subject: usize, item: usize, value: u8) {
        debug_assert!(value >= 1 && value <= self.scale_max);
        self.data[subject * self.items + item] = value;
    }

    /// All responses of one subject.
    pub fn row(&self, subject: usize) -> &[u8] {
        let start = subject * self.items;
        &self.data[start..start + self.items]
    }

    /// Responses to one item across subjects.
    pub fn column(&self, item: usize) -> impl Iterator<Item = u8> + '_ {
        (0..self.subjects).map(move |s| self.get(s, item))
    }

    /// Every response, row-major.
    pub fn values(&self) -> &[u8] {
        &self.data
    }

    /// Simple average of each subject's item responses.
    pub fn row_means(&self) -> Vec<f64> {
        if self.items == 0 {
            return vec![0.0; self.subjects];
        }
        (0..self.subjects)
            .map(|s| {
                let sum: u32 = self.row(s).iter().map(|&v| v as u32).sum();
                sum as f64 / self.items as f64
            })
            .collect()
    }
}

/// Subjects, item responses and derived mean scores.
///
/// Mean scores are kept at full precision; [`Dataset::rows`] rounds them to
/// two decimals for tabular export.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    subjects: Vec<Subject>,
    items: PerConstruct<ItemMatrix>,
    mean_scores: PerConstruct<Vec<f64>>,
    gender_labels: Vec<String>,
    sector_labels: Vec<String>,
}

impl Dataset {
    /// Assemble a dataset and derive mean scores from the item matrices.
    pub fn new(
        subjects: Vec<Subject>,
        items: PerConstruct<ItemMatrix>,
        gender_labels: Vec<String>,
        sector_labels: Vec<String>,
    ) -> Self {
        let mean_scores = items.map(|_, m| m.row_means());
        Self {
            subjects,
            items,
            mean_scores,
            gender_labels,
            sector_labels,
        }
    }

    /// Number of subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether the dataset holds no subjects.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Subject records, in id order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Item matrix of one construct.
    pub fn items(&self, construct: Construct) -> &ItemMatrix {
        &self.items[construct]
    }

    /// Per-subject mean scores of one construct.
    pub fn mean_scores(&self, construct: Construct) -> &[f64] {
        &self.mean_scores[construct]
    }

    /// Configured gender labels.
    pub fn gender_labels(&self) -> &[String] {
        &self.gender_labels
    }

    /// Configured sector labels.
    pub fn sector_labels(&self) -> &[String] {
        &self.sector_labels
    }

    /// Ordered column names of the tabular form.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            "subject_id".to_string(),
            "gender".to_string(),
            "age".to_string(),
            "sector".to_string(),
        ];
        for c in Construct::ALL {
            headers.extend((0..self.items[c].items()).map(|i| c.item_column(i)));
        }
        headers.extend(Construct::ALL.iter().map(|c| c.mean_column()));
        headers
    }

    /// One row per subject, mean scores rounded to two decimals.
    pub fn rows(&self) -> Vec<DatasetRow> {
        self.subjects
            .iter()
            .enumerate()
            .map(|(i, s)| DatasetRow {
                subject_id: s.id,
                gender: label_or_index(&self.gender_labels, s.gender.index()),
                age: s.age,
                sector: label_or_index(&self.sector_labels, s.sector.index()),
                items: self.items.map(|_, m| m.row(i).to_vec()),
                means: self.mean_scores.map(|_, col| round_to(col[i], 2)),
            })
            .collect()
    }
}

/// One exported row. Field order matches [`Dataset::headers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    /// 1-based participant number.
    pub subject_id: u32,
    /// Gender label.
    pub gender: String,
    /// Age in years.
    pub age: u8,
    /// Sector label.
    pub sector: String,
    /// Raw item responses per construct.
    pub items: PerConstruct<Vec<u8>>,
    /// Mean scores rounded to two decimals.
    pub means: PerConstruct<f64>,
}

impl DatasetRow {
    /// Cells as strings, aligned with [`Dataset::headers`].
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.subject_id.to_string(),
            self.gender.clone(),
            self.age.to_string(),
            self.sector.clone(),
        ];
        for c in Construct::ALL {
            cells.extend(self.items[c].iter().map(|v| v.to_string()));
        }
        for c in Construct::ALL {
            cells.push(format!("{:.2}", self.means[c]));
        }
        cells
    }
}

fn label_or_index(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| index.to_string())
}

/// Round to a fixed number of decimal places, ties to even.
///
/// Eight-item means such as 19/8 = 2.375 are exact binary ties, so the tie
/// rule decides the exported value.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Sector};

    fn small_dataset() -> Dataset {
        let subjects = vec![
            Subject::new(1, Gender(0), 14, Sector(0)),
            Subject::new(2, Gender(1), 17, Sector(1)),
        ];
        let mut sm = ItemMatrix::new(Construct::SocialMedia, 2, 3, 5);
        sm.set(0, 0, 2);
        sm.set(0, 1, 3);
        sm.set(0, 2, 3);
        sm.set(1, 0, 5);
        let bi = ItemMatrix::new(Construct::BodyImage, 2, 2, 6);
        let dep = ItemMatrix::new(Construct::Depression, 2, 1, 4);

        Dataset::new(
            subjects,
            PerConstruct::new(sm, bi, dep),
            vec!["boy".into(), "girl".into()],
            vec!["state".into(), "religious".into()],
        )
    }

    #[test]
    fn test_mean_scores_are_item_averages() {
        let ds = small_dataset();
        let means = ds.mean_scores(Construct::SocialMedia);
        assert!((means[0] - 8.0 / 3.0).abs() < 1e-12);
        assert!((means[1] - 7.0 / 3.0).abs() < 1e-12);
        assert_eq!(ds.mean_scores(Construct::Depression), &[1.0, 1.0]);
    }

    #[test]
    fn test_rows_align_with_headers() {
        let ds = small_dataset();
        let headers = ds.headers();
        assert_eq!(headers.len(), 4 + 3 + 2 + 1 + 3);
        assert_eq!(headers[4], "social_media_1");
        assert_eq!(headers.last().map(String::as_str), Some("depression_mean"));

        let rows = ds.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].gender, "girl");
        assert_eq!(rows[0].means.social_media, 2.67);
        for row in &rows {
            assert_eq!(row.cells().len(), headers.len());
        }
    }

    #[test]
    fn test_item_matrix_column() {
        let ds = small_dataset();
        let col: Vec<u8> = ds.items(Construct::SocialMedia).column(0).collect();
        assert_eq!(col, vec![2, 5]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.666_666, 2), 2.67);
    }

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(2.125, 2), 2.12);
        assert_eq!(round_to(2.375, 2), 2.38);
        assert_eq!(round_to(2.625, 2), 2.62);
        assert_eq!(round_to(-2.125, 2), -2.12);
    }
}
