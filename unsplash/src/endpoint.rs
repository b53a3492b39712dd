use reqwest::{Client, Method, RequestBuilder, Url};

struct Root {
    prefix: String,
}

type Result<T> = std::result::Result<T, url::ParseError>;
pub(crate) type SimpleEndpoint = (Method, Url);

impl Root {
    fn new<T: Into<String>>(prefix: T) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn req(&self, method: Method, path: &str) -> Result<SimpleEndpoint> {
        let url = format!("{}/{}", self.prefix, path);
        Ok((method, Url::parse(&url)?))
    }

    fn get(&self, path: &str) -> Result<SimpleEndpoint> {
        self.req(Method::GET, path)
    }
}

pub trait Endpoint {
    fn request(&self, client: &Client) -> RequestBuilder;
}

impl Endpoint for SimpleEndpoint {
    fn request(&self, client: &Client) -> RequestBuilder {
        client.request(self.0.clone(), self.1.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    pub search_photos: SimpleEndpoint,
}

impl ApiEndpoint {
    pub fn with_host(host: Option<&str>) -> Result<Self> {
        let host = host.unwrap_or("https://api.unsplash.com");
        let root = Root::new(host);
        Ok(Self {
            search_photos: root.get("search/photos")?,
        })
    }
}
