use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use wmp_core::errors::WmpError;

/// Hex-encoded SHA-256 of a file's contents, read in chunks.
pub fn file_sha256(path: &Path) -> Result<String, WmpError> {
    let file = File::open(path).map_err(|err| WmpError::io("hash_open", path, err))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|err| WmpError::io("hash_read", path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
