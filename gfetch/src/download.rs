use crate::{bug, critical};
use anyhow::{Result, bail};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Default)]
struct DownloadGuard(bool);

impl DownloadGuard {
    fn release(&mut self) {
        self.0 = true;
    }
}

impl Drop for DownloadGuard {
    fn drop(&mut self) {
        if !self.0 {
            bug!("unfinished download dropped");
        }
    }
}

/// An image being written to the staging dir. It becomes visible in the
/// archive only through [`commit`](Self::commit), so a crash mid-write never
/// leaves a file that a later run would count as already downloaded.
#[derive(Debug)]
pub struct DownloadingFile {
    path: PathBuf,
    file: fs::File,
    size: usize,
    guard: DownloadGuard,
}

impl DownloadingFile {
    pub async fn new(path: PathBuf) -> Result<Self> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file,
            size: 0,
            guard: DownloadGuard::default(),
        })
    }

    pub async fn write(&mut self, b: &[u8]) -> io::Result<()> {
        self.file.write_all(b).await?;
        self.size += b.len();
        Ok(())
    }

    pub async fn commit(self, path: &Path, expected: Option<u64>) -> Result<u64> {
        match expected {
            Some(expected) if self.size as u64 != expected => {
                let size = self.size;
                self.rollback().await;
                bail!("expected {} bytes, written {}", expected, size);
            }
            Some(_) => {}
            None => debug!("{:?}: unknown size, written {}", self.path, self.size),
        }
        Ok(self.do_commit(path).await?)
    }

    async fn do_commit(mut self, path: &Path) -> io::Result<u64> {
        self.guard.release();
        drop(self.file);
        if let Err(e) = fs::rename(&self.path, path).await {
            critical!("{:?}: COMMIT FAILED: {}", self.path, e);
            Err(e)
        } else {
            debug!("{:?}: committed {} B", path, self.size);
            Ok(self.size as u64)
        }
    }

    pub async fn rollback(mut self) {
        self.guard.release();
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.path).await {
            critical!(
                "{:?}: ROLLBACK FAILED ({} bytes): {}",
                self.path,
                self.size,
                e
            );
        } else {
            info!("{:?}: rolled back {} bytes", self.path, self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_renames_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("staged");
        let dst = dir.path().join("img_000.jpg");

        let mut f = DownloadingFile::new(tmp.clone()).await.unwrap();
        f.write(b"hello ").await.unwrap();
        f.write(b"world").await.unwrap();
        let n = f.commit(&dst, Some(11)).await.unwrap();

        assert_eq!(n, 11);
        assert!(!tmp.exists());
        assert_eq!(std::fs::read(&dst).unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn short_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("staged");
        let dst = dir.path().join("img_000.jpg");

        let mut f = DownloadingFile::new(tmp.clone()).await.unwrap();
        f.write(b"trunc").await.unwrap();
        assert!(f.commit(&dst, Some(100)).await.is_err());

        assert!(!tmp.exists());
        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn rollback_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("staged");

        let mut f = DownloadingFile::new(tmp.clone()).await.unwrap();
        f.write(b"partial").await.unwrap();
        f.rollback().await;
        assert!(!tmp.exists());
    }
}
