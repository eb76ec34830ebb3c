use std::{
    fs::File,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::{debug, info};
use thiserror::Error;

const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum LockError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("{} is still locked by another gopackage run after {waited:?}", path.display())]
    Timeout { path: PathBuf, waited: Duration },
}

/// Exclusive advisory lock on a file, released when dropped.
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Polls for the lock until it is free or `timeout` has passed.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let file = File::create(path)?;
        let start = Instant::now();
        let mut waiting = false;
        while !file.try_lock_exclusive()? {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            if !waiting {
                info!("Waiting for another gopackage run to release {}", path.display());
                waiting = true;
            }
            std::thread::sleep(RETRY_INTERVAL.min(timeout - waited));
        }
        debug!("Acquired a lock on {}", path.display());
        Ok(Self { _file: file })
    }
}
