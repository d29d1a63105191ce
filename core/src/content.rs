//! Request body suppliers.
//!
//! A `ContentSource` knows its length before the call starts so the
//! transport can send an exact `Content-Length` instead of chunking. Files
//! are opened when attached and read lazily while the body is written.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::OpalError;

pub enum ContentSource {
    Bytes(Vec<u8>),
    File { path: PathBuf, file: File, len: u64 },
}

impl ContentSource {
    pub fn bytes(payload: impl Into<Vec<u8>>) -> Self {
        ContentSource::Bytes(payload.into())
    }

    /// Open `path` and record its current size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpalError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source: io::Error| OpalError::Io {
            path: path.clone(),
            source,
        };
        let file = File::open(&path).map_err(io_err)?;
        let metadata = file.metadata().map_err(io_err)?;
        if !metadata.is_file() {
            return Err(io_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        Ok(ContentSource::File {
            len: metadata.len(),
            path,
            file,
        })
    }

    /// Declared length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            ContentSource::Bytes(payload) => payload.len() as u64,
            ContentSource::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ContentSource::Bytes(payload) => match std::str::from_utf8(payload) {
                Ok(text) => text.to_string(),
                Err(_) => format!("<{} bytes of binary content>", payload.len()),
            },
            ContentSource::File { path, len, .. } => {
                format!("{} ({len} bytes)", path.display())
            }
        }
    }

    /// Reader over the body, capped at the declared length so the bytes
    /// written always match `Content-Length` even if the file grows.
    pub fn into_reader(self) -> Box<dyn Read + Send + Sync> {
        match self {
            ContentSource::Bytes(payload) => Box::new(Cursor::new(payload)),
            ContentSource::File { file, len, .. } => Box::new(file.take(len)),
        }
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Bytes(payload) => {
                f.debug_tuple("ContentSource::Bytes").field(&payload.len()).finish()
            }
            ContentSource::File { path, len, .. } => f
                .debug_struct("ContentSource::File")
                .field("path", path)
                .field("len", len)
                .finish(),
        }
    }
}
