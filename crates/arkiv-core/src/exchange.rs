//! Byte-level exchange with the remote temporary store.

use std::io::{self, Write};
use url::Url;

/// Moves raw bytes to and from the remote store holding temporary copies.
///
/// Implemented by the protocol layer; this crate only consumes it.
pub trait FileExchange {
    /// Stream the remote file at `url` into `out`.
    fn get_file(&self, out: &mut dyn Write, url: &Url) -> io::Result<()>;

    /// Delete the remote temporary copy at `url`. Best effort; callers log
    /// failures and move on.
    fn delete_file(&self, url: &Url) -> io::Result<()>;
}
