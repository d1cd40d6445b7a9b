//! Curated destination suggestions convertible into trip drafts.
//!
//! # Invariants
//! - The table is static and never persisted.
//! - City and country are separate fields; nothing parses a combined label.

use crate::model::trip::TripDraft;
use crate::model::MS_PER_DAY;

/// Days between start and end of a draft built from a recommendation.
pub const DRAFT_LENGTH_DAYS: i64 = 3;

/// A static suggestion template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    /// Stable key, also the bundled image asset name.
    pub slug: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub description: &'static str,
}

const RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        slug: "shanghai",
        city: "Shanghai",
        country: "China",
        description: "Rich cultural heritage and urban life in China's most dynamic metropolis",
    },
    Recommendation {
        slug: "toronto",
        city: "Toronto",
        country: "Canada",
        description: "Discover featuring iconic landmarks in Toronto",
    },
    Recommendation {
        slug: "stockholm",
        city: "Stockholm",
        country: "Sweden",
        description: "Explore Stockholm's enchanting blend of historic charm and modern elegance",
    },
];

/// Returns all recommendations in display order.
pub fn recommendations() -> &'static [Recommendation] {
    RECOMMENDATIONS
}

/// Looks up a recommendation by slug.
pub fn find_recommendation(slug: &str) -> Option<&'static Recommendation> {
    RECOMMENDATIONS.iter().find(|item| item.slug == slug)
}

impl Recommendation {
    /// `"City, Country"` card title.
    pub fn title(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Image asset name shown behind the card.
    pub fn image_name(&self) -> &'static str {
        self.slug
    }

    /// Builds an editable draft starting at `now` and lasting three days.
    ///
    /// The end date saturates at `i64::MAX`.
    pub fn to_draft(&self, now: i64) -> TripDraft {
        TripDraft::new(
            self.country,
            self.city,
            "",
            now,
            now.saturating_add(DRAFT_LENGTH_DAYS * MS_PER_DAY),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{find_recommendation, recommendations, DRAFT_LENGTH_DAYS};
    use crate::model::MS_PER_DAY;

    #[test]
    fn every_recommendation_produces_a_valid_draft() {
        for item in recommendations() {
            let draft = item.to_draft(1_700_000_000_000);
            assert!(draft.fields_are_valid(), "{} should be valid", item.slug);
            assert_eq!(draft.city, item.city);
            assert_eq!(draft.country, item.country);
            assert_eq!(draft.date_to - draft.date_from, DRAFT_LENGTH_DAYS * MS_PER_DAY);
        }
    }

    #[test]
    fn draft_end_saturates_at_the_end_of_time() {
        let toronto = find_recommendation("toronto").unwrap();

        let draft = toronto.to_draft(i64::MAX - 1);
        assert_eq!(draft.date_from, i64::MAX - 1);
        assert_eq!(draft.date_to, i64::MAX);
        assert!(draft.fields_are_valid());

        let earliest = toronto.to_draft(i64::MIN);
        assert_eq!(earliest.date_to, i64::MIN + DRAFT_LENGTH_DAYS * MS_PER_DAY);
    }

    #[test]
    fn lookup_by_slug() {
        let toronto = find_recommendation("toronto").expect("toronto exists");
        assert_eq!(toronto.title(), "Toronto, Canada");
        assert_eq!(toronto.image_name(), "toronto");
        assert!(find_recommendation("atlantis").is_none());
    }
}
