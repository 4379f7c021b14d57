use crate::models::ResourceExtension;

use super::candidates::{CandidatePatterns, build_candidate_patterns};
use super::paths::make_package_path;

/// Find the first listing entry that satisfies the candidate patterns.
///
/// The listing order decides the winner when several entries match; empty names are skipped.
pub fn find_matching_entry<'a, I>(listing: I, patterns: &CandidatePatterns) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    listing
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .find(|entry| patterns.matches(entry))
}

/// Resolve `base` (with an optional strict extension) against a folder listing.
///
/// Returns the package path of the first matching entry, or `None` when nothing matches.
pub fn locate_in_listing(
    listing: &[String],
    folder: &str,
    base: &str,
    extension: Option<&str>,
) -> Option<String> {
    let rule = match extension {
        Some(ext) => ResourceExtension::Exact(ext.to_string()),
        None => ResourceExtension::Bare,
    };
    let patterns = build_candidate_patterns(base, &rule).ok()?;

    find_matching_entry(listing.iter().map(String::as_str), &patterns)
        .map(|entry| make_package_path(folder, entry))
}

#[cfg(test)]
mod tests {
    use super::locate_in_listing;

    fn listing(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn finds_entry_with_extension() {
        let list = listing(&["f.qwer", "f.extension", "file1.ext1", "fileNew"]);
        assert_eq!(
            locate_in_listing(&list, "folder1", "file1", Some("ext1")).as_deref(),
            Some("folder1/file1.ext1")
        );
    }

    #[test]
    fn finds_entry_without_extension() {
        let list = listing(&["f.qwer", "f.extension", "file1.ext1", "fileNew"]);
        assert_eq!(
            locate_in_listing(&list, "folderFolder", "fileNew", None).as_deref(),
            Some("folderFolder/fileNew")
        );
    }

    #[test]
    fn rejects_different_extension() {
        let list = listing(&["f.qwer", "f.extension", "file1.ext1", "fileNew"]);
        assert_eq!(locate_in_listing(&list, "folder1", "file1", Some("ext2")), None);
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        let list = listing(&["f.qwer", "f.extension", "file", "fileNew.qwer"]);
        assert_eq!(locate_in_listing(&list, "folder1", "file2", None), None);
        assert_eq!(locate_in_listing(&[], "folder1", "file", None), None);
    }

    #[test]
    fn listing_order_decides_between_duplicates() {
        let list = listing(&["", "data_3.db", "data_7.db"]);
        assert_eq!(
            locate_in_listing(&list, "databases", "data", Some("db")).as_deref(),
            Some("databases/data_3.db")
        );
    }
}
