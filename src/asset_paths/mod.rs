//! Name-level helpers for locating versioned assets inside a package.
//!
//! The pieces are split so that version parsing, candidate pattern construction and listing
//! filtering can be tested independently of any storage. None of them touch the filesystem.

mod candidates;
mod filters;
mod paths;
mod version;

pub use candidates::{CandidatePatterns, build_candidate_patterns};
pub use filters::{find_matching_entry, locate_in_listing};
pub use paths::{make_destination_path, make_package_path};
pub use version::extract_version;
