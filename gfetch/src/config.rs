use anyhow::Result;
use serde::Deserialize;
use serde_json::from_str;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Debug)]
struct ConfigFile {
    access_key: String,
    queries: Option<Vec<String>>,
    total_images: Option<usize>,
    images_per_query: Option<u32>,
    display_count: Option<usize>,
    home: Option<PathBuf>,
    archive_dir: Option<PathBuf>,
    display_dir: Option<PathBuf>,
    rate_limit_wait_secs: Option<u64>,
    pass_delay_secs: Option<u64>,
    api_host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_key: String,
    pub queries: Vec<String>,
    pub total_images: usize,
    pub images_per_query: u32,
    pub display_count: usize,
    pub archive_dir: PathBuf,
    pub display_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub rate_limit_wait: Duration,
    pub pass_delay: Duration,
    pub api_host: Option<String>,
}

fn default_queries() -> Vec<String> {
    ["nature", "technology", "architecture", "space", "abstract"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn ensure_dir(dir: &Path) {
    match fs::metadata(dir) {
        Ok(meta) => {
            if !meta.is_dir() {
                panic!("{} is not a directory", dir.display());
            }
        }
        Err(_) => {
            fs::create_dir_all(dir).unwrap();
        }
    };
}

fn ensure_empty_dir(dir: PathBuf) -> PathBuf {
    if let Ok(meta) = fs::metadata(&dir) {
        if !meta.is_dir() {
            panic!("{} is not a directory", dir.display());
        }
        fs::remove_dir_all(&dir).unwrap();
    };
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn read_config() -> Result<Config> {
    let config = fs::read_to_string("config.json")?;
    let config: ConfigFile = from_str(&config)?;

    let home = &config.home;
    let at = |f: &str| match home {
        Some(home) => home.join(f),
        _ => f.into(),
    };

    let archive_dir = config.archive_dir.unwrap_or_else(|| at("archive"));
    let display_dir = config.display_dir.unwrap_or_else(|| at("display"));
    ensure_dir(&archive_dir);
    ensure_dir(&display_dir);

    Ok(Config {
        access_key: config.access_key,
        queries: config.queries.unwrap_or_else(default_queries),
        total_images: config.total_images.unwrap_or(500),
        images_per_query: config.images_per_query.unwrap_or(100),
        display_count: config.display_count.unwrap_or(300),
        archive_dir,
        display_dir,
        tmp_dir: ensure_empty_dir(at("tmp")),
        rate_limit_wait: Duration::from_secs(config.rate_limit_wait_secs.unwrap_or(3600)),
        pass_delay: Duration::from_secs(config.pass_delay_secs.unwrap_or(1)),
        api_host: config.api_host,
    })
}
