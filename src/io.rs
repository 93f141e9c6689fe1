// io.rs

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::error::GeneCallError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// A file input that transparently decompresses gzip, detected by the
/// two magic bytes rather than the file extension.
pub struct InputStream {
    filepath: PathBuf,
}

impl InputStream {
    pub fn new(filepath: &Path) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    fn is_gzipped(file: &mut File) -> Result<bool, GeneCallError> {
        let mut header = [0u8; 2];
        // A file too short to hold the magic bytes is plain text.
        if file.read_exact(&mut header).is_err() {
            file.rewind()?;
            return Ok(false);
        }
        file.rewind()?;
        Ok(header == GZIP_MAGIC)
    }

    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, GeneCallError> {
        let mut file = File::open(&self.filepath)?;
        let gzipped = Self::is_gzipped(&mut file)?;
        debug!(path = %self.filepath.display(), gzipped, "opening input");
        let reader: Box<dyn Read> = if gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, reader))
    }
}

/// A buffered file output, gzip-compressed when the path ends in .gz.
pub struct OutputStream {
    filepath: PathBuf,
}

impl OutputStream {
    pub fn new(filepath: &Path) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    fn should_compress(&self) -> bool {
        self.filepath
            .extension()
            .map_or(false, |ext| ext == "gz")
    }

    pub fn writer(&self) -> Result<Box<dyn Write>, GeneCallError> {
        let file = File::create(&self.filepath)?;
        let writer: Box<dyn Write> = if self.should_compress() {
            Box::new(BufWriter::with_capacity(
                DEFAULT_BUFFER_SIZE,
                GzEncoder::new(file, Compression::default()),
            ))
        } else {
            Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file))
        };
        Ok(writer)
    }
}
