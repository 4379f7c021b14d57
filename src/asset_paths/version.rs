use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

fn version_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^.]*_(\d+)(?:\..*)?$").expect("invalid version regex"))
}

/// Extract the version number embedded in a packaged entry name.
///
/// The version is a run of digits following a `_` that ends the name or sits directly before the
/// first `.`; digits after the extension boundary never count. Names without such a token are
/// version `0`, as are tokens too large to represent.
///
/// This looks at the name alone. When the base name is known, prefer
/// [`CandidatePatterns::version_of`](super::CandidatePatterns::version_of), which does not
/// mistake a base such as `level_1` for a versioned entry.
pub fn extract_version(candidate_name: &str) -> u64 {
    version_token()
        .captures(candidate_name)
        .map_or(0, |captures| parse_version(&captures[1], candidate_name))
}

pub(super) fn parse_version(digits: &str, candidate_name: &str) -> u64 {
    match digits.parse::<u64>() {
        Ok(version) => version,
        Err(err) => {
            warn!(name = candidate_name, %err, "version token out of range, treating as 0");
            0
        }
    }
}
