//! Category path parsing
//!
//! Platform intent is expressed through catalog categories of the form
//! `<root>|<platform>[|<kind>[|...]]`. For assignments (albums, groups, ...)
//! the platform code lives in the category description, since characters such
//! as `@` cannot appear in a path segment.

use core_catalog::CategoryEntry;

/// Path separator used by the catalog.
pub const PATH_SEPARATOR: char = '|';

/// What a `<kind>` segment asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentKind {
    Albums,
    Groups,
    Other(String),
}

impl AssignmentKind {
    fn from_segment(segment: &str) -> Self {
        match segment.to_lowercase().as_str() {
            "albums" => AssignmentKind::Albums,
            "groups" => AssignmentKind::Groups,
            _ => AssignmentKind::Other(segment.to_string()),
        }
    }
}

/// Result of parsing one category entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryParse {
    /// `<root>|<platform>|<kind>...` with a code in the description
    Assignment {
        platform: String,
        kind: AssignmentKind,
        code: String,
    },
    /// `<root>|<platform>`
    Membership { platform: String },
    /// Not under the root category
    Foreign,
    /// Under the root but unusable
    Malformed { path: String, reason: &'static str },
}

/// Parse one category entry relative to `root`.
pub fn parse_category(root: &str, entry: &CategoryEntry) -> CategoryParse {
    let mut segments = entry.path.split(PATH_SEPARATOR).map(str::trim);

    if segments.next() != Some(root) {
        return CategoryParse::Foreign;
    }

    let platform = match segments.next() {
        Some(p) if !p.is_empty() => p.to_lowercase(),
        _ => {
            return CategoryParse::Malformed {
                path: entry.path.clone(),
                reason: "missing platform segment",
            }
        }
    };

    let kind = match segments.next() {
        None => return CategoryParse::Membership { platform },
        Some(k) if k.is_empty() => {
            return CategoryParse::Malformed {
                path: entry.path.clone(),
                reason: "empty kind segment",
            }
        }
        Some(k) => AssignmentKind::from_segment(k),
    };

    match entry.description.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => CategoryParse::Assignment {
            platform,
            kind,
            code: code.to_string(),
        },
        _ => CategoryParse::Malformed {
            path: entry.path.clone(),
            reason: "missing description with the platform code",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_assignment() {
        let entry = CategoryEntry::new("Socials|flickr|albums|Birds", Some("72157720000"));
        assert_eq!(
            parse_category("Socials", &entry),
            CategoryParse::Assignment {
                platform: "flickr".into(),
                kind: AssignmentKind::Albums,
                code: "72157720000".into(),
            }
        );
    }

    #[test]
    fn test_group_without_description_is_malformed() {
        let entry = CategoryEntry::new("Socials|flickr|groups", None);
        assert!(matches!(
            parse_category("Socials", &entry),
            CategoryParse::Malformed { .. }
        ));

        let blank = CategoryEntry::new("Socials|flickr|groups|Birds", Some("  "));
        assert!(matches!(
            parse_category("Socials", &blank),
            CategoryParse::Malformed { .. }
        ));
    }

    #[test]
    fn test_membership_and_foreign() {
        assert_eq!(
            parse_category("Socials", &CategoryEntry::new("Socials|Pixelfed", None)),
            CategoryParse::Membership {
                platform: "pixelfed".into()
            }
        );
        assert_eq!(
            parse_category("Socials", &CategoryEntry::new("Places|Scotland", Some("x"))),
            CategoryParse::Foreign
        );
        // Root must match a whole segment
        assert_eq!(
            parse_category("Socials", &CategoryEntry::new("SocialsOld|flickr", None)),
            CategoryParse::Foreign
        );
    }

    #[test]
    fn test_root_alone_is_malformed() {
        assert!(matches!(
            parse_category("Socials", &CategoryEntry::new("Socials", None)),
            CategoryParse::Malformed { .. }
        ));
    }

    #[test]
    fn test_other_kind_keeps_segment() {
        let entry = CategoryEntry::new("Socials|flickr|galleries|Best", Some("72157-g"));
        assert_eq!(
            parse_category("Socials", &entry),
            CategoryParse::Assignment {
                platform: "flickr".into(),
                kind: AssignmentKind::Other("galleries".into()),
                code: "72157-g".into(),
            }
        );
    }
}
