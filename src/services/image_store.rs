//! Product images on the local filesystem.
//!
//! Layout: `<root>/products/<sku>/<filename>`, published under
//! `<url_prefix>/products/<sku>/<filename>`.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use axum::body::Bytes;
use tempfile::TempDir;
use tokio::fs;

use crate::{config::UploadConfig, error::Result};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

const PRODUCTS_DIR: &str = "products";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Keeps only the final path component of a client supplied name.
fn sanitize_filename(filename: &str) -> Option<&str> {
    let name = filename.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

/// Files written by one [`ImageStore::save`] call.
///
/// Until [`finish`](SavedImages::finish) is called the batch can be rolled
/// back: new files are removed and any image it overwrote is put back.
#[derive(Debug, Default)]
pub struct SavedImages {
    names: Vec<String>,
    written: Vec<PathBuf>,
    /// (original location, backup location)
    replaced: Vec<(PathBuf, PathBuf)>,
    created_dir: Option<PathBuf>,
    backups: Option<TempDir>,
}

impl SavedImages {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn backup_path(&mut self, root: &Path) -> io::Result<PathBuf> {
        let backups = match self.backups.take() {
            Some(dir) => dir,
            None => tempfile::Builder::new()
                .prefix(".replaced-")
                .tempdir_in(root)?,
        };
        let path = backups.path().join(self.replaced.len().to_string());
        self.backups = Some(backups);
        Ok(path)
    }

    async fn undo(&mut self) -> io::Result<()> {
        let mut first_error = None;

        for path in self.written.drain(..).rev() {
            if let Err(e) = fs::remove_file(&path).await {
                if e.kind() != ErrorKind::NotFound {
                    first_error.get_or_insert(e);
                }
            }
        }

        for (original, backup) in self.replaced.drain(..).rev() {
            if let Err(e) = fs::rename(&backup, &original).await {
                first_error.get_or_insert(e);
            }
        }

        if let Some(dir) = self.created_dir.take() {
            if let Err(e) = fs::remove_dir(&dir).await {
                if e.kind() != ErrorKind::NotFound {
                    first_error.get_or_insert(e);
                }
            }
        }

        self.names.clear();
        first_error.map_or(Ok(()), Err)
    }

    /// Removes the new files and restores what they replaced.
    pub async fn rollback(mut self) -> Result<()> {
        self.undo().await?;
        Ok(())
    }

    /// Keeps the new files; overwritten images are discarded.
    pub fn finish(self) {}
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.root.clone(), config.url_prefix.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn product_dir(&self, sku: &str) -> PathBuf {
        self.root.join(PRODUCTS_DIR).join(sku)
    }

    /// Writes every allowed file under the product's directory. Files with
    /// other extensions are skipped. On error, whatever this call already
    /// wrote is undone before returning.
    pub async fn save(&self, sku: &str, files: &[UploadedFile]) -> Result<SavedImages> {
        let dir = self.product_dir(sku);
        let mut saved = SavedImages::default();

        for file in files {
            let name = match sanitize_filename(&file.filename) {
                Some(name) if allowed_file(name) => name,
                _ => {
                    tracing::debug!(sku, filename = %file.filename, "Skipping disallowed upload");
                    continue;
                }
            };

            if let Err(e) = self.write_one(&dir, name, &file.data, &mut saved).await {
                if let Err(undo) = saved.undo().await {
                    tracing::warn!(sku, error = %undo, "Failed to undo partial image upload");
                }
                return Err(e.into());
            }
        }

        if !saved.names.is_empty() {
            tracing::info!(sku, count = saved.names.len(), "Saved product images");
        }

        Ok(saved)
    }

    async fn write_one(
        &self,
        dir: &Path,
        name: &str,
        data: &Bytes,
        saved: &mut SavedImages,
    ) -> io::Result<()> {
        if saved.written.is_empty() && !fs::try_exists(dir).await? {
            fs::create_dir_all(dir).await?;
            saved.created_dir = Some(dir.to_path_buf());
        }

        let target = dir.join(name);
        if !saved.written.contains(&target) {
            match fs::symlink_metadata(&target).await {
                Ok(meta) if meta.is_file() => {
                    let backup = saved.backup_path(&self.root)?;
                    fs::rename(&target, &backup).await?;
                    saved.replaced.push((target.clone(), backup));
                }
                Ok(_) => {
                    return Err(io::Error::new(
                        ErrorKind::AlreadyExists,
                        format!("{} is not a regular file", target.display()),
                    ));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        fs::write(&target, data).await?;
        saved.written.push(target);
        saved.names.push(name.to_string());

        Ok(())
    }

    /// Public URLs of the product's images, sorted by name. A missing
    /// directory means no images.
    pub async fn list_urls(&self, sku: &str) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(self.product_dir(sku)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                format!(
                    "{}/{}/{}/{}",
                    self.url_prefix,
                    PRODUCTS_DIR,
                    urlencoding::encode(sku),
                    urlencoding::encode(&name)
                )
            })
            .collect())
    }

    pub async fn remove_all(&self, sku: &str) -> Result<()> {
        match fs::remove_dir_all(self.product_dir(sku)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Moves a product's images to a new SKU directory, merging into it if it
    /// already exists.
    pub async fn rename(&self, from_sku: &str, to_sku: &str) -> Result<()> {
        if from_sku == to_sku {
            return Ok(());
        }

        let from = self.product_dir(from_sku);
        if !fs::try_exists(&from).await? {
            return Ok(());
        }

        let to = self.product_dir(to_sku);
        if !fs::try_exists(&to).await? {
            fs::create_dir_all(self.root.join(PRODUCTS_DIR)).await?;
            fs::rename(&from, &to).await?;
            return Ok(());
        }

        let mut entries = fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            fs::rename(entry.path(), to.join(entry.file_name())).await?;
        }
        fs::remove_dir(&from).await?;

        Ok(())
    }
}
