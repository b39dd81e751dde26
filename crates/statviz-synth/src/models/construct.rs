//! Latent constructs measured by the synthetic questionnaire.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A latent construct measured by a block of Likert items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construct {
    /// Intensity of social media use.
    SocialMedia,
    /// Body image (higher = more positive).
    BodyImage,
    /// Depressive symptoms.
    Depression,
}

impl Construct {
    /// All constructs in canonical column order.
    pub const ALL: [Construct; 3] = [
        Construct::SocialMedia,
        Construct::BodyImage,
        Construct::Depression,
    ];

    /// Number of constructs.
    pub const COUNT: usize = 3;

    /// Position in canonical order (row/column of the correlation matrix).
    pub const fn index(self) -> usize {
        match self {
            Construct::SocialMedia => 0,
            Construct::BodyImage => 1,
            Construct::Depression => 2,
        }
    }

    /// Machine name, used as the column prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Construct::SocialMedia => "social_media",
            Construct::BodyImage => "body_image",
            Construct::Depression => "depression",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Construct::SocialMedia => "Social Media",
            Construct::BodyImage => "Body Image",
            Construct::Depression => "Depression",
        }
    }

    /// Column name of an item, 0-based `item` rendered 1-based.
    pub fn item_column(self, item: usize) -> String {
        format!("{}_{}", self.name(), item + 1)
    }

    /// Column name of the derived mean score.
    pub fn mean_column(self) -> String {
        format!("{}_mean", self.name())
    }

    /// Unordered pairs of distinct constructs, in canonical order.
    pub fn pairs() -> [(Construct, Construct); 3] {
        [
            (Construct::SocialMedia, Construct::BodyImage),
            (Construct::SocialMedia, Construct::Depression),
            (Construct::BodyImage, Construct::Depression),
        ]
    }
}

impl std::fmt::Display for Construct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per construct, addressed by name rather than position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerConstruct<T> {
    /// Value for [`Construct::SocialMedia`].
    pub social_media: T,
    /// Value for [`Construct::BodyImage`].
    pub body_image: T,
    /// Value for [`Construct::Depression`].
    pub depression: T,
}

impl<T> PerConstruct<T> {
    /// Create from explicit values.
    pub fn new(social_media: T, body_image: T, depression: T) -> Self {
        Self {
            social_media,
            body_image,
            depression,
        }
    }

    /// Build by evaluating `f` once per construct, in canonical order.
    pub fn from_fn(mut f: impl FnMut(Construct) -> T) -> Self {
        let social_media = f(Construct::SocialMedia);
        let body_image = f(Construct::BodyImage);
        let depression = f(Construct::Depression);
        Self::new(social_media, body_image, depression)
    }

    /// Get the value for a construct.
    pub fn get(&self, construct: Construct) -> &T {
        match construct {
            Construct::SocialMedia => &self.social_media,
            Construct::BodyImage => &self.body_image,
            Construct::Depression => &self.depression,
        }
    }

    /// Get a mutable reference to the value for a construct.
    pub fn get_mut(&mut self, construct: Construct) -> &mut T {
        match construct {
            Construct::SocialMedia => &mut self.social_media,
            Construct::BodyImage => &mut self.body_image,
            Construct::Depression => &mut self.depression,
        }
    }

    /// Map every value, keeping the construct association.
    pub fn map<U>(&self, mut f: impl FnMut(Construct, &T) -> U) -> PerConstruct<U> {
        PerConstruct::from_fn(|c| f(c, self.get(c)))
    }

    /// Iterate `(construct, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Construct, &T)> {
        Construct::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl<T> Index<Construct> for PerConstruct<T> {
    type Output = T;

    fn index(&self, construct: Construct) -> &T {
        self.get(construct)
    }
}

impl<T> IndexMut<Construct> for PerConstruct<T> {
    fn index_mut(&mut self, construct: Construct) -> &mut T {
        self.get_mut(construct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_order() {
        for (i, c) in Construct::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Construct::SocialMedia.item_column(0), "social_media_1");
        assert_eq!(Construct::BodyImage.item_column(11), "body_image_12");
        assert_eq!(Construct::Depression.mean_column(), "depression_mean");
    }

    #[test]
    fn test_per_construct_access() {
        let mut values = PerConstruct::new(1, 2, 3);
        assert_eq!(values[Construct::BodyImage], 2);

        values[Construct::Depression] = 30;
        assert_eq!(values.depression, 30);

        let doubled = values.map(|_, v| v * 2);
        assert_eq!(doubled, PerConstruct::new(2, 4, 60));

        let names: Vec<&str> = values.iter().map(|(c, _)| c.name()).collect();
        assert_eq!(names, vec!["social_media", "body_image", "depression"]);
    }
}
