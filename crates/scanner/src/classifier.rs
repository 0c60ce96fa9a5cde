use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes inspected when classifying a file
pub const SNIFF_LEN: usize = 8 * 1024;

/// Decide whether the file at `path` is binary.
///
/// Unreadable files count as binary so they never leak into a snapshot.
pub fn is_binary(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("Treating unopenable {} as binary: {e}", path.display());
            return true;
        }
    };

    // One byte past the window tells whether the file continues.
    let mut buf = Vec::with_capacity(SNIFF_LEN + 1);
    if let Err(e) = file.by_ref().take(SNIFF_LEN as u64 + 1).read_to_end(&mut buf) {
        log::debug!("Treating unreadable {} as binary: {e}", path.display());
        return true;
    }

    is_binary_prefix(&buf)
}

/// Classify an in-memory buffer using only its first [`SNIFF_LEN`] bytes.
pub fn is_binary_prefix(bytes: &[u8]) -> bool {
    let prefix = &bytes[..bytes.len().min(SNIFF_LEN)];
    if prefix.contains(&0) {
        return true;
    }

    match std::str::from_utf8(prefix) {
        Ok(_) => false,
        // A sequence cut by the sniff window is not evidence of binary content.
        Err(e) => !(e.error_len().is_none() && bytes.len() > prefix.len()),
    }
}
