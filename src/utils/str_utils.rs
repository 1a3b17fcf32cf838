use itertools::Itertools;

pub trait StringExtensions {
    /// Convert a title to the slug used in dictionary links.
    /// E.g. `"Flip Reset".slugify() == "flip-reset"`
    fn slugify(&self) -> String;

    fn contains_ignore_case(&self, needle_lowercase: &str) -> bool;
}

impl StringExtensions for str {
    fn slugify(&self) -> String {
        self.split_whitespace()
            .map(|s| s.to_lowercase())
            .join("-")
    }

    fn contains_ignore_case(&self, needle_lowercase: &str) -> bool {
        self.to_lowercase().contains(needle_lowercase)
    }
}

#[test]
fn test_slugify() {
    assert_eq!("Flip Reset".slugify(), "flip-reset");
    assert_eq!("  Half   Flip ".slugify(), "half-flip");
    assert_eq!("What a Save!".slugify(), "what-a-save!");
}

#[test]
fn test_contains_ignore_case() {
    assert!("Air Dribble".contains_ignore_case("dribble"));
    assert!(!"Air Dribble".contains_ignore_case("flip"));
}
