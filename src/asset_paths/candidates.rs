use regex::Regex;

use crate::models::ResourceExtension;

use super::version::parse_version;

/// The two name shapes a packaged entry may take for one resource.
#[derive(Debug, Clone)]
pub struct CandidatePatterns {
    /// Unversioned name, e.g. `data.db`.
    pub exact: Regex,
    /// Versioned name, e.g. `data_12.db`; the digits are captured as `ver`.
    pub versioned: Regex,
    extension: ResourceExtension,
}

/// Build the anchored patterns matching `base` under the given extension rule.
///
/// Matching is strict: a query with an extension never accepts an entry without one (or with a
/// different one), and a bare query never accepts an entry that carries an extension. Only
/// [`ResourceExtension::Discover`] accepts any extension and captures it.
pub fn build_candidate_patterns(
    base: &str,
    extension: &ResourceExtension,
) -> Result<CandidatePatterns, regex::Error> {
    let base = regex::escape(base);
    let suffix = match extension {
        ResourceExtension::Exact(ext) => format!(r"\.{}", regex::escape(ext)),
        ResourceExtension::Bare => String::new(),
        ResourceExtension::Discover => r"(?:\.(?P<ext>.+))?".to_string(),
    };

    Ok(CandidatePatterns {
        exact: Regex::new(&format!("^{base}{suffix}$"))?,
        versioned: Regex::new(&format!(r"^{base}_(?P<ver>\d+){suffix}$"))?,
        extension: extension.clone(),
    })
}

impl CandidatePatterns {
    /// Returns `true` when the entry has either the versioned or the unversioned shape.
    pub fn matches(&self, entry_name: &str) -> bool {
        self.versioned.is_match(entry_name) || self.exact.is_match(entry_name)
    }

    /// Version of a matching entry: the digits captured by the versioned shape, `0` when only
    /// the unversioned shape matches.
    pub fn version_of(&self, entry_name: &str) -> u64 {
        self.versioned
            .captures(entry_name)
            .and_then(|captures| captures.name("ver"))
            .map_or(0, |digits| parse_version(digits.as_str(), entry_name))
    }

    /// Extension of a matching entry, taken from the query or captured from the name.
    pub fn extension_of(&self, entry_name: &str) -> Option<String> {
        match &self.extension {
            ResourceExtension::Exact(ext) => Some(ext.clone()),
            ResourceExtension::Bare => None,
            ResourceExtension::Discover => self
                .versioned
                .captures(entry_name)
                .or_else(|| self.exact.captures(entry_name))
                .and_then(|captures| captures.name("ext"))
                .map(|ext| ext.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build_candidate_patterns;
    use crate::models::ResourceExtension;

    #[test]
    fn exact_extension_rejects_other_shapes() {
        let patterns =
            build_candidate_patterns("file1", &ResourceExtension::Exact("ext1".into())).unwrap();

        assert!(patterns.matches("file1.ext1"));
        assert!(patterns.matches("file1_3.ext1"));
        assert!(!patterns.matches("file1"));
        assert!(!patterns.matches("file1_3"));
        assert!(!patterns.matches("file1.ext2"));
        assert!(!patterns.matches("file10.ext1"));
    }

    #[test]
    fn bare_query_rejects_extensions() {
        let patterns = build_candidate_patterns("fileNew", &ResourceExtension::Bare).unwrap();

        assert!(patterns.matches("fileNew"));
        assert!(patterns.matches("fileNew_12"));
        assert!(!patterns.matches("fileNew.qwer"));
        assert!(!patterns.matches("fileNew_12.qwer"));
    }

    #[test]
    fn base_names_are_matched_literally() {
        let patterns =
            build_candidate_patterns("a.b", &ResourceExtension::Exact("db".into())).unwrap();

        assert!(patterns.matches("a.b_1.db"));
        assert!(!patterns.matches("axb_1.db"));
    }

    #[test]
    fn base_ending_in_digits_is_not_a_version() {
        let patterns =
            build_candidate_patterns("level_1", &ResourceExtension::Exact("json".into())).unwrap();

        assert!(patterns.matches("level_1.json"));
        assert_eq!(patterns.version_of("level_1.json"), 0);
        assert!(patterns.matches("level_1_1.json"));
        assert_eq!(patterns.version_of("level_1_1.json"), 1);
    }

    #[test]
    fn digits_inside_a_discovered_extension_are_not_a_version() {
        let patterns = build_candidate_patterns("data", &ResourceExtension::Discover).unwrap();

        assert!(patterns.matches("data.v_2"));
        assert_eq!(patterns.version_of("data.v_2"), 0);
        assert_eq!(patterns.extension_of("data.v_2").as_deref(), Some("v_2"));
        assert_eq!(patterns.version_of("data_5.v_2"), 5);
    }

    #[test]
    fn discover_captures_the_extension() {
        let patterns = build_candidate_patterns("data", &ResourceExtension::Discover).unwrap();

        assert!(patterns.matches("data_28.db"));
        assert_eq!(patterns.extension_of("data_28.db").as_deref(), Some("db"));
        assert_eq!(patterns.extension_of("data.sqlite").as_deref(), Some("sqlite"));
        assert_eq!(patterns.extension_of("data_3"), None);
        assert!(!patterns.matches("database_1.db"));
    }
}
