//! Display order of references in the versions dropdown.
//!
//! References named in the priority list come first, in the priority list's
//! order. Everything else follows sorted descending: names that parse as
//! semantic versions (newest first) before any other name (reverse lexical
//! order). A name that is not a valid version only affects its own sort key.

use indexmap::IndexSet;
use semver::Version;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Sort key of a single reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey<'a> {
    /// Rank 0: the name is a semantic version.
    Version(Version, &'a str),
    /// Rank 1: any other name, compared lexically.
    Name(&'a str),
}

impl<'a> SortKey<'a> {
    pub fn for_reference(name: &'a str) -> Self {
        match parse_version(name) {
            Some(version) => SortKey::Version(version, name),
            None => SortKey::Name(name),
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            SortKey::Version(..) => 0,
            SortKey::Name(_) => 1,
        }
    }

    /// Display-order comparison: lower rank first, each rank descending.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Version(a, name_a), SortKey::Version(b, name_b)) => {
                // "v1.0.0" and "1.0.0" are the same version, fall back to the name
                b.cmp(a).then_with(|| name_b.cmp(name_a))
            }
            (SortKey::Version(..), SortKey::Name(_)) => Ordering::Less,
            (SortKey::Name(_), SortKey::Version(..)) => Ordering::Greater,
            (SortKey::Name(a), SortKey::Name(b)) => b.cmp(a),
        }
    }
}

/// Parse a reference name as a semantic version, ignoring one leading `v`.
pub fn parse_version(name: &str) -> Option<Version> {
    let raw = name
        .strip_prefix('v')
        .or_else(|| name.strip_prefix('V'))
        .unwrap_or(name);
    Version::parse(raw).ok()
}

/// Duplicate-free references in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedReferences(Vec<String>);

impl OrderedReferences {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Order `candidates` for display, putting the entries of `priority` that
/// exist among the candidates first.
///
/// Priority entries with no matching candidate are skipped. Duplicates in
/// either input collapse to a single entry.
pub fn order_references<C, P>(candidates: &[C], priority: &[P]) -> OrderedReferences
where
    C: AsRef<str>,
    P: AsRef<str>,
{
    // Directory listings have no guaranteed order
    let candidates: BTreeSet<&str> = candidates.iter().map(AsRef::as_ref).collect();

    let prioritized: IndexSet<&str> = priority
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| candidates.contains(name))
        .collect();

    let mut remainder: Vec<SortKey<'_>> = candidates
        .iter()
        .filter(|name| !prioritized.contains(*name))
        .map(|name| SortKey::for_reference(*name))
        .collect();
    remainder.sort_by(SortKey::display_cmp);

    let ordered = prioritized
        .into_iter()
        .chain(remainder.iter().map(|key| match key {
            SortKey::Version(_, name) | SortKey::Name(name) => *name,
        }))
        .map(str::to_string)
        .collect();

    OrderedReferences(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_then_versions() {
        let ordered = order_references(
            &["v2.0.0", "v1.0.0", "v1.5.3", "main"],
            &["main", "v2.0.0"],
        );
        assert_eq!(ordered.as_slice(), ["main", "v2.0.0", "v1.5.3", "v1.0.0"]);
    }

    #[test]
    fn test_versions_precede_names() {
        let ordered = order_references(
            &["latest", "v0.1.0", "devel", "v0.10.0", "v0.2.0"],
            &[] as &[&str],
        );
        assert_eq!(
            ordered.as_slice(),
            ["v0.10.0", "v0.2.0", "v0.1.0", "latest", "devel"]
        );
    }

    #[test]
    fn test_invalid_version_does_not_abort_sort() {
        let ordered = order_references(
            &["v1.0.0", "v1.0", "v3.1.4", "v1.x.0", "v2.0.0-rc.1", "v2.0.0"],
            &["missing"],
        );
        assert_eq!(
            ordered.as_slice(),
            ["v3.1.4", "v2.0.0", "v2.0.0-rc.1", "v1.0.0", "v1.x.0", "v1.0"]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let ordered = order_references(&["main", "v1.0.0", "main", "v1.0.0"], &["main", "main"]);
        assert_eq!(ordered.as_slice(), ["main", "v1.0.0"]);
    }

    #[test]
    fn test_same_version_different_spelling() {
        let ordered = order_references(&["1.0.0", "v1.0.0", "V1.0.0"], &[] as &[&str]);
        assert_eq!(ordered.as_slice(), ["v1.0.0", "V1.0.0", "1.0.0"]);
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version("1.2.3"), Some(Version::new(1, 2, 3)));
        assert!(parse_version("main").is_none());
        assert!(parse_version("vv1.2.3").is_none());
        assert_eq!(SortKey::for_reference("main").rank(), 1);
        assert_eq!(SortKey::for_reference("v0.0.1").rank(), 0);
    }
}
