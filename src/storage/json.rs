//! JSON file result store
//!
//! Each collection lives in its own pretty-printed JSON array. A collection
//! file is rewritten after every mutation that changes it, through a temp file
//! and a rename, so a crash leaves either the previous or the new version.
//!
//! The in-memory collections and the files have separate locks. A mutation
//! holds the collection lock only long enough to update memory and copy the
//! collection out; serialization and disk I/O happen under the file's own
//! lock, so readers and other writers are not queued behind the disk. The
//! methods are still blocking, so async callers run them on the blocking pool.

use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Site, Snapshot};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collections {
    sites: Vec<Site>,
    site_urls: HashSet<String>,
    sites_version: u64,
    images: Vec<String>,
    image_set: HashSet<String>,
    images_version: u64,
}

/// One collection file and the version of the collection last written to it
#[derive(Debug)]
struct CollectionFile {
    path: PathBuf,
    written: Mutex<u64>,
}

impl CollectionFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            written: Mutex::new(0),
        }
    }

    /// Writes the copy produced by `take` unless a newer one is already on disk
    ///
    /// `take` runs while the file lock is held, so copies reach the disk in
    /// version order and a slow writer never overwrites a newer file.
    fn persist<T, F>(&self, take: F) -> StorageResult<()>
    where
        T: Serialize,
        F: FnOnce() -> StorageResult<(u64, Vec<T>)>,
    {
        let mut written = self.written.lock().map_err(|_| StorageError::LockPoisoned)?;
        let (version, items) = take()?;
        if version <= *written {
            return Ok(());
        }
        write_collection(&self.path, &items)?;
        *written = version;
        Ok(())
    }
}

/// Result store backed by two JSON files
#[derive(Debug)]
pub struct JsonStorage {
    sites_file: CollectionFile,
    images_file: CollectionFile,
    inner: Mutex<Collections>,
}

impl JsonStorage {
    /// Opens the store, loading any collections already on disk
    ///
    /// A missing file is an empty collection. A file that exists but cannot be
    /// parsed is an error, so a corrupt file is never silently overwritten.
    pub fn open(sites_path: impl Into<PathBuf>, images_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let sites_path = sites_path.into();
        let images_path = images_path.into();

        let sites: Vec<Site> = read_collection(&sites_path)?;
        let images: Vec<String> = read_collection(&images_path)?;

        let mut collections = Collections::default();
        for site in sites {
            if collections.site_urls.insert(site.url.clone()) {
                collections.sites.push(site);
            }
        }
        for image in images {
            if collections.image_set.insert(image.clone()) {
                collections.images.push(image);
            }
        }

        tracing::info!(
            "Loaded {} sites and {} images from previous runs",
            collections.sites.len(),
            collections.images.len()
        );

        Ok(Self {
            sites_file: CollectionFile::new(sites_path),
            images_file: CollectionFile::new(images_path),
            inner: Mutex::new(collections),
        })
    }

    /// Creates an empty store at the given paths, ignoring existing files
    ///
    /// Existing files are replaced on the first write.
    pub fn fresh(sites_path: impl Into<PathBuf>, images_path: impl Into<PathBuf>) -> Self {
        Self {
            sites_file: CollectionFile::new(sites_path.into()),
            images_file: CollectionFile::new(images_path.into()),
            inner: Mutex::new(Collections::default()),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Collections>> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl Storage for JsonStorage {
    fn record_site(&self, site: Site) -> StorageResult<bool> {
        {
            let mut inner = self.lock()?;
            if !inner.site_urls.insert(site.url.clone()) {
                return Ok(false);
            }
            inner.sites.push(site);
            inner.sites_version += 1;
        }

        self.sites_file.persist(|| {
            let inner = self.lock()?;
            Ok((inner.sites_version, inner.sites.clone()))
        })?;
        Ok(true)
    }

    fn record_images(&self, urls: &[String]) -> StorageResult<usize> {
        let mut added = 0;
        {
            let mut inner = self.lock()?;
            for url in urls {
                if inner.image_set.insert(url.clone()) {
                    inner.images.push(url.clone());
                    added += 1;
                }
            }
            if added == 0 {
                return Ok(0);
            }
            inner.images_version += 1;
        }

        self.images_file.persist(|| {
            let inner = self.lock()?;
            Ok((inner.images_version, inner.images.clone()))
        })?;
        Ok(added)
    }

    fn snapshot(&self) -> StorageResult<Snapshot> {
        let inner = self.lock()?;
        Ok(Snapshot {
            sites: inner.sites.clone(),
            images: inner.images.clone(),
        })
    }

    fn site_count(&self) -> StorageResult<usize> {
        Ok(self.lock()?.sites.len())
    }

    fn image_count(&self) -> StorageResult<usize> {
        Ok(self.lock()?.images.len())
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| StorageError::Serialization {
        path: path.display().to_string(),
        source,
    })
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };

    let json = serde_json::to_string_pretty(items).map_err(|source| StorageError::Serialization {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
