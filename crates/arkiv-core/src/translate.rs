//! Translation between remote file ids and local paths.
//!
//! File ids on a pillar carry the naming scheme of whoever uploaded them.
//! A listing or download run can be restricted to one naming scheme by
//! requiring a remote prefix, which is swapped for a local prefix when
//! building the local path.

use std::fmt;

/// Signal that a file id falls outside the configured remote prefix and the
/// record should be skipped. Not a failure; callers log it and move on.
#[derive(Debug)]
pub struct SkipFile {
    pub file_id: String,
}

impl fmt::Display for SkipFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file id '{}' does not start with the expected remote prefix",
            self.file_id
        )
    }
}

impl std::error::Error for SkipFile {}

/// Map a remote file id to a local path string.
///
/// When `remote_prefix` is set it must be a literal prefix of `file_id`;
/// otherwise the record is signalled as skipped. The matched prefix is
/// replaced by `local_prefix` when that is set.
pub fn remote_to_local(
    file_id: &str,
    local_prefix: Option<&str>,
    remote_prefix: Option<&str>,
) -> Result<String, SkipFile> {
    let stripped = match remote_prefix {
        Some(prefix) => file_id.strip_prefix(prefix).ok_or_else(|| SkipFile {
            file_id: file_id.to_string(),
        })?,
        None => file_id,
    };
    Ok(match local_prefix {
        Some(prefix) => format!("{}{}", prefix, stripped),
        None => stripped.to_string(),
    })
}
