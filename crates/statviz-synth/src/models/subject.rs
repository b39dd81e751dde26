//! Synthetic study participants.

use serde::{Deserialize, Serialize};

/// Gender category, an index into the configured gender labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gender(pub u8);

impl Gender {
    /// Index into the configured label list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sector (school type) category, an index into the configured sector labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sector(pub u8);

impl Sector {
    /// Index into the configured label list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single participant. Created once per run and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// 1-based participant number.
    pub id: u32,
    /// Gender category.
    pub gender: Gender,
    /// Age in years.
    pub age: u8,
    /// Sector category.
    pub sector: Sector,
}

impl Subject {
    /// Create a new subject.
    pub fn new(id: u32, gender: Gender, age: u8, sector: Sector) -> Self {
        Self {
            id,
            gender,
            age,
            sector,
        }
    }
}

/// Indices of subjects belonging to each category, in subject order.
pub fn group_indices<F>(subjects: &[Subject], groups: usize, key: F) -> Vec<Vec<usize>>
where
    F: Fn(&Subject) -> usize,
{
    let mut out = vec![Vec::new(); groups];
    for (i, s) in subjects.iter().enumerate() {
        if let Some(bucket) = out.get_mut(key(s)) {
            bucket.push(i);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_indices() {
        let subjects = vec![
            Subject::new(1, Gender(0), 14, Sector(2)),
            Subject::new(2, Gender(1), 15, Sector(0)),
            Subject::new(3, Gender(1), 16, Sector(2)),
        ];

        let by_gender = group_indices(&subjects, 2, |s| s.gender.index());
        assert_eq!(by_gender, vec![vec![0], vec![1, 2]]);

        let by_sector = group_indices(&subjects, 3, |s| s.sector.index());
        assert_eq!(by_sector, vec![vec![1], vec![], vec![0, 2]]);
    }
}
