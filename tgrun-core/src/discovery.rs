//! Discovery of helper binaries bundled next to the running executable.
//!
//! Packaged builds ship ffmpeg alongside the binary instead of relying on the
//! system `PATH`. This module only locates such a directory; making it
//! visible to the child is done through [`crate::config::CoreConfig::extra_search_dirs`].

use std::path::{Path, PathBuf};

/// Finds the directory holding a bundled copy of `tool`.
///
/// For each base directory, in order, the candidates are `<base>/<tool>`,
/// `<base>/<tool>_bin` and `<base>` itself. The first candidate containing a
/// file named `<tool>` or `<tool>.exe` wins.
///
/// # Examples
///
/// ```rust,no_run
/// use tgrun_core::discovery::find_bundled_tool_dir;
/// use std::path::PathBuf;
///
/// let base = PathBuf::from("/opt/tgrun");
/// if let Some(dir) = find_bundled_tool_dir(&[base], "ffmpeg") {
///     println!("Bundled ffmpeg in {}", dir.display());
/// }
/// ```
pub fn find_bundled_tool_dir(base_dirs: &[PathBuf], tool: &str) -> Option<PathBuf> {
    base_dirs
        .iter()
        .flat_map(|base| {
            [
                base.join(tool),
                base.join(format!("{tool}_bin")),
                base.clone(),
            ]
        })
        .find(|candidate| contains_tool(candidate, tool))
}

fn contains_tool(dir: &Path, tool: &str) -> bool {
    [tool.to_string(), format!("{tool}.exe")]
        .iter()
        .any(|name| dir.join(name).is_file())
}

/// Base directories searched for bundled helpers: the directory of the
/// running executable.
pub fn default_bundle_dirs() -> Vec<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .into_iter()
        .collect()
}
