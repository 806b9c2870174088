//! In-progress feedback submission

use super::api::FeedbackPayload;
use crate::recorder::ArtifactLocator;
use serde::{Deserialize, Serialize};

/// A rating of 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarRating(u8);

impl StarRating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&stars).then_some(Self(stars))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub rating: Option<StarRating>,
    pub content: String,
    pub name: String,
    pub email: String,
    pub video_url: Option<ArtifactLocator>,
}

impl FeedbackDraft {
    /// Clicking star `k` sets the rating to exactly `k`
    pub fn select_star(&mut self, star: u8) -> bool {
        match StarRating::new(star) {
            Some(rating) => {
                self.rating = Some(rating);
                true
            }
            None => false,
        }
    }

    /// Whether star `k` is highlighted
    pub fn is_star_lit(&self, star: u8) -> bool {
        self.rating.is_some_and(|r| star <= r.get())
    }

    /// Unset ratings are sent as zero stars
    pub fn to_payload(&self, space_id: &str) -> FeedbackPayload {
        FeedbackPayload {
            no_of_stars: self.rating.map(StarRating::get).unwrap_or(0),
            content: self.content.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            testimonial_space_id: space_id.to_string(),
            video_url: self.video_url.clone(),
        }
    }

    /// Clear every field, returning the video locator that was held
    pub fn clear(&mut self) -> Option<ArtifactLocator> {
        std::mem::take(self).video_url
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_click_sets_exact_rating() {
        for prior in 0..=5u8 {
            for star in 1..=5u8 {
                let mut draft = FeedbackDraft::default();
                draft.select_star(prior);
                assert!(draft.select_star(star));
                assert_eq!(draft.rating.map(StarRating::get), Some(star));
            }
        }
    }

    #[test]
    fn test_out_of_range_star_is_ignored() {
        let mut draft = FeedbackDraft::default();
        assert!(!draft.select_star(0));
        assert!(!draft.select_star(6));
        assert!(draft.rating.is_none());

        draft.select_star(3);
        assert!(!draft.select_star(9));
        assert_eq!(draft.rating, StarRating::new(3));
    }

    #[test]
    fn test_star_highlight() {
        let mut draft = FeedbackDraft::default();
        assert!(!draft.is_star_lit(1));

        draft.select_star(3);
        assert!(draft.is_star_lit(1));
        assert!(draft.is_star_lit(3));
        assert!(!draft.is_star_lit(4));
    }

    #[test]
    fn test_payload_and_clear() {
        let mut draft = FeedbackDraft {
            content: "Loved it".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        };

        let payload = draft.to_payload("space-9");
        assert_eq!(payload.no_of_stars, 0);
        assert_eq!(payload.testimonial_space_id, "space-9");

        draft.select_star(5);
        assert_eq!(draft.to_payload("space-9").no_of_stars, 5);

        assert!(draft.clear().is_none());
        assert!(draft.is_empty());
    }
}
