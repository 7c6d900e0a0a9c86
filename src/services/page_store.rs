use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};
use rand::RngCore;
use crate::errors::WikiError;
use crate::types::Page;

/// Extension every stored page file carries.
pub const PAGE_EXTENSION: &str = "txt";

/// Flat-file page storage: one `<title>.txt` per page.
#[derive(Clone)]
pub struct PageStore {
    base_dir: PathBuf,
}

impl PageStore {
    /// Create a new page store rooted at `base_dir`
    pub fn new(base_dir: PathBuf) -> Self {
        debug!("Creating PageStore with base directory: {:?}", base_dir);
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the pages directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), WikiError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            error!("Failed to create pages directory {:?}: {}", self.base_dir, e);
            WikiError::Io(e)
        })
    }

    /// Path of the file backing `title`.
    pub fn path_for(&self, title: &str) -> Result<PathBuf, WikiError> {
        // Callers validate titles; this only guards against a title escaping the directory.
        if title.is_empty() || title.starts_with('.') || title.contains(['/', '\\']) {
            warn!("Refusing unsafe page title: {:?}", title);
            return Err(WikiError::InvalidPath);
        }
        Ok(self.base_dir.join(format!("{}.{}", title, PAGE_EXTENSION)))
    }

    /// Load a page by title
    pub fn load(&self, title: &str) -> Result<Page, WikiError> {
        let full_path = self.path_for(title)?;
        debug!("Loading page '{}' from {:?}", title, full_path);

        let body = match fs::read(&full_path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Page '{}' does not exist", title);
                return Err(WikiError::NotFound);
            }
            Err(e) => {
                error!("Failed to read page {:?}: {}", full_path, e);
                return Err(WikiError::Io(e));
            }
        };

        info!("Loaded page '{}', {} bytes", title, body.len());
        Ok(Page { title: title.to_string(), body })
    }

    /// Write a page's body, replacing any previous content.
    ///
    /// The body goes to a hidden sibling file first and is renamed into place,
    /// so readers and racing writers only ever observe a complete body.
    pub fn save(&self, page: &Page) -> Result<(), WikiError> {
        let full_path = self.path_for(&page.title)?;
        let tmp_path = self.base_dir.join(format!(".{}.{:016x}.tmp", page.title, rand::rng().next_u64()));
        debug!("Saving page '{}' via {:?}", page.title, tmp_path);

        let written = fs::File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&page.body)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp_path, &full_path));

        if let Err(e) = written {
            error!("Failed to save page {:?}: {}", full_path, e);
            let _ = fs::remove_file(&tmp_path);
            return Err(WikiError::Io(e));
        }

        info!("Saved page '{}', {} bytes", page.title, page.body.len());
        Ok(())
    }

    /// Check if a page exists
    pub fn exists(&self, title: &str) -> bool {
        let exists = self.path_for(title).map(|p| p.is_file()).unwrap_or(false);
        debug!("Page exists check: '{}' -> {}", title, exists);
        exists
    }

    /// Titles of all stored pages, in directory enumeration order.
    pub fn raw_titles(&self) -> Result<Vec<String>, WikiError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| {
            error!("Failed to read pages directory {:?}: {}", self.base_dir, e);
            WikiError::Io(e)
        })?;

        let mut titles = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if let Some(title) = name.strip_suffix(".txt") {
                titles.push(title.to_string());
            }
        }
        debug!("Found {} page files in {:?}", titles.len(), self.base_dir);
        Ok(titles)
    }
}
