//! Recursive audio file discovery.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Audio container extensions accepted for analysis (case-insensitive).
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "m4a", "aac", "ogg"];

/// Recursively enumerate audio files under a root directory.
///
/// Skips macOS resource-fork directories (`__MACOSX`), dotfiles, and `._`
/// AppleDouble artifacts. Order is directory traversal order; callers must
/// not rely on it beyond set membership.
pub fn discover_audio_files(root: impl AsRef<Path>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_resource_fork_dir(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !is_hidden(p) && has_audio_extension(p))
        .collect()
}

fn is_resource_fork_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .map(|name| name == "__MACOSX")
            .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.') || name.starts_with("._"))
        .unwrap_or(true)
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
