use std::{io::Read, path::Path};

use flate2::read::GzDecoder;
use tokio::{fs, io};

/// The magic bytes that open every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read a file from the given path, transparently decompressing gzip content
pub async fn read_maybe_compressed(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    let bytes = fs::read(path).await?;

    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }

    let mut decoded = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;

    Ok(decoded)
}

/// Write bytes to the given path, creating parent directories as needed
pub async fn write_creating_dirs(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, bytes).await
}
