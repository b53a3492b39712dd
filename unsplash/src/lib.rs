#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod download;
mod endpoint;
mod error;
pub mod model;

pub use client::Client;
pub use error::{Error, Result};
pub use model::{Photo, SearchPage};
pub use reqwest;
