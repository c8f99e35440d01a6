//! Page title → path key mapping.
//!
//! Pure functions, no state. A path key is the file name a page's rendered
//! document lives under in every commit tree, so it must be stable for a
//! given title and safe as a git tree entry name.
//!
//! Distinct titles may map to the same key (`"Category:Foo Bar"` and
//! `"category foo-bar"` both become `category-foo-bar`). The replay engine
//! does not try to disambiguate: the later revision in stream order simply
//! overwrites the earlier entry.

/// Separator used in place of every run of characters outside `[a-z0-9]`.
pub const SEPARATOR: char = '-';

/// Key used for titles that contain no `[a-z0-9]` characters at all, since a
/// git tree cannot hold an entry with an empty name.
pub const FALLBACK_KEY: &str = "untitled";

/// Map a page title to its path key.
///
/// Lower-cases the title, replaces every run of characters outside
/// `[a-z0-9]` with a single [`SEPARATOR`], and strips leading and trailing
/// separators.
///
/// ```
/// use wikigit::slug::slugify;
///
/// assert_eq!(slugify("Welcome Page"), "welcome-page");
/// assert_eq!(slugify("Category:Foo Bar"), slugify("category foo-bar"));
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !key.is_empty() {
                key.push(SEPARATOR);
            }
            pending_separator = false;
            key.push(c);
        } else {
            pending_separator = true;
        }
    }

    if key.is_empty() {
        FALLBACK_KEY.to_owned()
    } else {
        key
    }
}

/// Human-facing title: underscores become spaces, surrounding whitespace is
/// trimmed. `"Main_Page "` → `"Main Page"`.
#[must_use]
pub fn display_title(title: &str) -> String {
    title.replace('_', " ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_titles() {
        assert_eq!(slugify("Welcome Page"), "welcome-page");
        assert_eq!(slugify("Main_Page"), "main-page");
        assert_eq!(slugify("UPPERCASE"), "uppercase");
    }

    #[test]
    fn runs_collapse_to_one_separator() {
        assert_eq!(slugify("C++ -- Programming"), "c-programming");
        assert_eq!(slugify("Hello    World"), "hello-world");
        assert_eq!(slugify("a/b\\c.d"), "a-b-c-d");
    }

    #[test]
    fn leading_and_trailing_separators_stripped() {
        assert_eq!(slugify("  Hello World  "), "hello-world");
        assert_eq!(slugify("-Leading"), "leading");
        assert_eq!(slugify("Trailing?!"), "trailing");
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(slugify("Release 2.0"), "release-2-0");
        assert_eq!(slugify("1984"), "1984");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(slugify("Café Menu"), "caf-menu");
        assert_eq!(slugify("naïve"), "na-ve");
    }

    #[test]
    fn titles_without_ascii_alphanumerics_use_fallback() {
        assert_eq!(slugify(""), FALLBACK_KEY);
        assert_eq!(slugify("!!!"), FALLBACK_KEY);
        assert_eq!(slugify("日本語"), FALLBACK_KEY);
    }

    #[test]
    fn namespace_title_collides_with_plain_spelling() {
        // Documented limitation: both titles share one tree entry.
        assert_eq!(slugify("Category:Foo Bar"), "category-foo-bar");
        assert_eq!(slugify("category foo-bar"), "category-foo-bar");
    }

    #[test]
    fn display_title_replaces_underscores_and_trims() {
        assert_eq!(display_title("Main_Page"), "Main Page");
        assert_eq!(display_title("  Welcome Page \n"), "Welcome Page");
        assert_eq!(display_title("_Lead_"), "Lead");
    }

    mod proptests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_slugify_is_pure(title in ".{0,40}") {
                prop_assert_eq!(slugify(&title), slugify(&title));
            }

            #[test]
            fn prop_slug_shape(title in ".{0,40}") {
                let key = slugify(&title);
                prop_assert!(!key.is_empty());
                prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR));
                prop_assert!(!key.starts_with(SEPARATOR));
                prop_assert!(!key.ends_with(SEPARATOR));
                prop_assert!(!key.contains("--"));
            }

            #[test]
            fn prop_slugify_is_idempotent(title in ".{0,40}") {
                let key = slugify(&title);
                prop_assert_eq!(slugify(&key), key);
            }
        }
    }
}
