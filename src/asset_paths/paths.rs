use std::path::{Path, PathBuf};

/// Join a package folder and an entry name into a package path.
///
/// Package paths always use forward slashes, whatever separator the folder was written with.
pub fn make_package_path(folder: &str, entry_name: &str) -> String {
    let folder = folder.replace('\\', "/");
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        entry_name.to_string()
    } else {
        format!("{folder}/{entry_name}")
    }
}

/// Local path a resource is installed to: `folder/base[.extension]`.
pub fn make_destination_path(folder: &Path, base: &str, extension: Option<&str>) -> PathBuf {
    match extension {
        Some(ext) => folder.join(format!("{base}.{ext}")),
        None => folder.join(base),
    }
}
