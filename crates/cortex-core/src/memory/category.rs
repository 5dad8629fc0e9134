use serde::{Deserialize, Serialize};

/// Fixed category set a memory's fact is classified into. The Extraction
/// Stage drops any LLM output whose category doesn't parse into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Preference,
    Fact,
    Goal,
    Habit,
    Relationship,
    Professional,
    Location,
    Temporal,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Preference,
        Category::Fact,
        Category::Goal,
        Category::Habit,
        Category::Relationship,
        Category::Professional,
        Category::Location,
        Category::Temporal,
    ];

    /// Parse a category name case-insensitively, as returned by the LLM.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "preference" => Some(Category::Preference),
            "fact" => Some(Category::Fact),
            "goal" => Some(Category::Goal),
            "habit" => Some(Category::Habit),
            "relationship" => Some(Category::Relationship),
            "professional" => Some(Category::Professional),
            "location" => Some(Category::Location),
            "temporal" => Some(Category::Temporal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Preference => "preference",
            Category::Fact => "fact",
            Category::Goal => "goal",
            Category::Habit => "habit",
            Category::Relationship => "relationship",
            Category::Professional => "professional",
            Category::Location => "location",
            Category::Temporal => "temporal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_categories_case_insensitively() {
        assert_eq!(Category::parse("Location"), Some(Category::Location));
        assert_eq!(Category::parse("PREFERENCE"), Some(Category::Preference));
    }

    #[test]
    fn rejects_unknown_category() {
        assert_eq!(Category::parse("mood"), None);
    }

    #[test]
    fn round_trips_through_as_str() {
        for cat in Category::ALL {
            assert_eq!(Category::parse(cat.as_str()), Some(cat));
        }
    }
}
