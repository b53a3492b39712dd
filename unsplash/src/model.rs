use serde::Deserialize;

/// Subset of the `search/photos` response the harvester consumes. The API
/// returns far more per photo; unknown keys are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct PhotoUrls {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Photo {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub description: Option<String>,
    pub urls: PhotoUrls,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchPage {
    pub total: u64,
    pub total_pages: u32,
    pub results: Vec<Photo>,
}
