use std::path::Path;

/// Helper function to check extensions in filenames
#[cfg(feature = "mascot")]
pub(crate) fn check_extension(filename: impl AsRef<Path>, extension: impl AsRef<Path>) -> bool {
    filename
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.as_ref()))
}

/// Get the lowercase extension of a file, looking past a trailing `.gz`
pub(crate) fn actual_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ex| {
            ex.eq_ignore_ascii_case("gz")
                .then_some(path)
                .and_then(|p| p.file_stem())
                .and_then(|p| Path::new(p).extension())
                .unwrap_or(ex)
        })
        .map(|ex| ex.to_string_lossy().to_lowercase())
}
