use std::fs;
use std::io;
use std::path::Path;

/// Reads `path` and returns its first non-blank line, trimmed.
///
/// Sensor files usually hold a single number followed by a newline.
pub fn read_first_line(path: &Path) -> io::Result<String> {
    let contents = fs::read_to_string(path)?;
    let line = contents.trim().lines().next().unwrap_or("").trim();
    Ok(line.to_string())
}

/// Whether `metadata` (taken after following symlinks) describes a regular file
/// with any execute bit set.
#[cfg(unix)]
pub fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
pub fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
