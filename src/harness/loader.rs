//! Artifact loading: the caller gets the complete byte sequence or an error.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read a compiled artifact in full.
///
/// A read that yields fewer bytes than the file's declared size is an error;
/// partial artifacts never reach the registrar.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_artifact(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let declared = file.metadata()?.len();
    let mut bytes = Vec::with_capacity(declared as usize);
    file.read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < declared {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "truncated read of '{}': got {} of {} bytes",
                path.display(),
                bytes.len(),
                declared
            ),
        ));
    }
    Ok(bytes)
}
