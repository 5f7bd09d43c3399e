//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] reads a file in fixed-size blocks and feeds each block into an
//! incremental BLAKE3 state, so memory use does not depend on file size.
//! Every file of a run must go through the same `Hasher` (same block size)
//! for digests to be comparable.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::HashError;

/// A 256-bit BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Default read block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Smallest block size accepted by [`Hasher::with_block_size`].
pub const MIN_BLOCK_SIZE: usize = 512;

/// Streaming file hasher.
///
/// Counts how many files it has been asked to hash, which lets callers
/// confirm that unique-size files never reach this stage.
#[derive(Debug)]
pub struct Hasher {
    block_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
    files_hashed: AtomicUsize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default block size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            shutdown_flag: None,
            files_hashed: AtomicUsize::new(0),
        }
    }

    /// Set the read block size. Values below [`MIN_BLOCK_SIZE`] are raised to it.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(MIN_BLOCK_SIZE);
        self
    }

    /// Set the shutdown flag checked between blocks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Block size used for every read.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of files this hasher has started hashing.
    #[must_use]
    pub fn files_hashed(&self) -> usize {
        self.files_hashed.load(Ordering::Relaxed)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or if
    /// shutdown is requested mid-file.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        self.files_hashed.fetch_add(1, Ordering::Relaxed);

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(path, file)
    }

    /// Hash everything readable from `reader`, block by block.
    fn hash_reader<R: Read>(&self, path: &Path, mut reader: R) -> Result<Digest, HashError> {
        let mut state = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }

            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..n]);
        }

        Ok(*state.finalize().as_bytes())
    }
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}
