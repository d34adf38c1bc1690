use std::path::{Path, PathBuf};

/// Output file name for an input path: `golden_records_<base>.csv`, where
/// `<base>` is the input's file name up to its first dot.
///
/// The name is bare (no directory), so it lands in the working directory.
pub fn output_filename(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = name.split('.').next().unwrap_or_default();
    PathBuf::from(format!("golden_records_{base}.csv"))
}
