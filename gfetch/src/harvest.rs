use crate::config::Config;
use crate::download::DownloadingFile;
use anyhow::Result;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::time::sleep;
use unsplash::download::DownloadClient;
use unsplash::{Client, Photo};

pub struct Harvester {
    conf: Config,
    api: Client,
    images: DownloadClient,
}

impl Harvester {
    pub fn new(conf: Config) -> Result<Self> {
        let api = match conf.api_host.as_deref() {
            Some(host) => Client::with_host(conf.access_key.as_str(), Some(host))?,
            None => Client::new(conf.access_key.as_str()),
        };
        Ok(Self {
            conf,
            api,
            images: DownloadClient::new(),
        })
    }

    fn archive_path(&self, seq: usize) -> PathBuf {
        self.conf.archive_dir.join(format!("img_{seq:03}.jpg"))
    }

    /// File existence is the only durability marker, so the global counter
    /// resumes from whatever the archive already holds.
    async fn resume_count(&self) -> Result<usize> {
        let mut n = 0;
        let mut files = fs::read_dir(&self.conf.archive_dir).await?;
        while files.next_entry().await?.is_some() {
            n += 1;
        }
        Ok(n)
    }

    /// One page-1 search for `query`. Blocks through rate limiting, retrying
    /// the same request after the configured wait; any other failure yields
    /// an empty page and the run moves on.
    async fn fetch_images(&self, query: &str) -> Vec<Photo> {
        loop {
            match self
                .api
                .search_photos(query, 1, self.conf.images_per_query)
                .await
            {
                Ok(page) => return page.results,
                Err(unsplash::Error::RateLimited) => {
                    warn!(
                        "rate limit exceeded, waiting {:?}",
                        self.conf.rate_limit_wait
                    );
                    sleep(self.conf.rate_limit_wait).await;
                }
                Err(e) => {
                    error!("{query}: search failed: {e:?}");
                    return Vec::new();
                }
            }
        }
    }

    async fn stream_to(mut resp: unsplash::reqwest::Response, file: &mut DownloadingFile) -> Result<()> {
        while let Some(b) = resp.chunk().await? {
            file.write(&b).await?;
        }
        Ok(())
    }

    /// Streams one image into the archive. An existing destination is the
    /// idempotence checkpoint and is never re-fetched or overwritten.
    async fn download(&self, url: &str, path: &Path) -> Result<()> {
        if fs::metadata(path).await.is_ok() {
            info!("{path:?} already exists, skipping");
            return Ok(());
        }
        let mut tmp = DownloadingFile::new(self.conf.tmp_dir.join(path.file_name().unwrap())).await?;
        let resp = match self.images.download(url).await {
            Ok(r) => r,
            Err(e) => {
                tmp.rollback().await;
                return Err(e.into());
            }
        };
        let size = resp.content_length();
        if let Err(e) = Self::stream_to(resp, &mut tmp).await {
            tmp.rollback().await;
            return Err(e);
        }
        tmp.commit(path, size).await?;
        Ok(())
    }

    /// Loops over the queries until `total_images` files exist. The counter
    /// only advances when a file is on disk, so a pass that adds nothing
    /// means the API has no more to give and the run stops short of the
    /// target rather than spinning forever.
    pub async fn run(&self) -> Result<usize> {
        fs::create_dir_all(&self.conf.archive_dir).await?;
        fs::create_dir_all(&self.conf.tmp_dir).await?;
        let mut counter = self.resume_count().await?;
        if counter > 0 {
            info!("resuming from {counter} downloaded images");
        }
        while counter < self.conf.total_images {
            let before = counter;
            'pass: for query in &self.conf.queries {
                info!("fetching for query: {query}");
                for img in self.fetch_images(query).await {
                    if counter >= self.conf.total_images {
                        break 'pass;
                    }
                    let path = self.archive_path(counter);
                    match self.download(&img.urls.regular, &path).await {
                        Ok(()) => counter += 1,
                        Err(e) => error!("{}: download failed: {e:?}", img.id),
                    }
                }
            }
            if counter >= self.conf.total_images {
                break;
            }
            if counter == before {
                warn!("no new images after a full pass, stopping at {counter}");
                break;
            }
            info!("downloaded {counter} images so far, waiting before next pass");
            sleep(self.conf.pass_delay).await;
        }
        info!("downloaded {counter} images");
        Ok(counter)
    }

    /// Copies a uniform random sample of the archive (without replacement)
    /// into the display dir under fresh sequential names. A smaller archive
    /// clamps the sample rather than failing.
    pub async fn curate(&self) -> Result<usize> {
        fs::create_dir_all(&self.conf.display_dir).await?;
        let mut names = Vec::new();
        let mut files = fs::read_dir(&self.conf.archive_dir).await?;
        while let Some(file) = files.next_entry().await? {
            names.push(file.file_name());
        }

        let take = self.conf.display_count.min(names.len());
        if take < self.conf.display_count {
            warn!(
                "archive holds {} files, sampling all of them instead of {}",
                names.len(),
                self.conf.display_count
            );
        }
        let selected = names.choose_multiple(&mut rand::thread_rng(), take);
        for (i, name) in selected.enumerate() {
            let src = self.conf.archive_dir.join(name);
            let dst = self.conf.display_dir.join(format!("display_{i:03}.jpg"));
            fs::copy(&src, &dst).await?;
        }
        info!("copied {take} images to display folder");
        Ok(take)
    }
}
