use crate::endpoint::{ApiEndpoint, Endpoint};
use crate::error::{Error, Result};
use crate::model::SearchPage;
use log::{debug, error, warn};
use reqwest::{Client as Http, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

async fn finalize<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let r = req.send().await?;
    let st = r.status();
    if st.is_success() {
        debug!("{} from {}", st, r.url());
        Ok(r.json().await?)
    } else if st == StatusCode::TOO_MANY_REQUESTS {
        warn!("{} from {}", st, r.url());
        Err(Error::RateLimited)
    } else {
        error!("{} from {}", st, r.url());
        Err(Error::Api(st.as_u16(), r.text().await?))
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: Http,
    api: ApiEndpoint,
    access_key: String,
}

impl Client {
    pub fn new<T: Into<String>>(access_key: T) -> Self {
        Self::with_host(access_key, None).unwrap()
    }

    pub fn with_host<T: Into<String>>(access_key: T, host: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: Http::new(),
            api: ApiEndpoint::with_host(host)?,
            access_key: access_key.into(),
        })
    }

    fn call(&self, endpoint: &impl Endpoint) -> RequestBuilder {
        endpoint
            .request(&self.http)
            .header("accept-version", "v1")
            .query(&[("client_id", self.access_key.as_str())])
    }

    pub async fn search_photos(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        finalize(self.call(&self.api.search_photos).query(&[
            ("query", query),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ]))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photo(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "width": 1024,
            "height": 768,
            "description": null,
            "urls": {
                "raw": format!("https://images.example/{id}?raw"),
                "full": format!("https://images.example/{id}?full"),
                "regular": format!("https://images.example/{id}"),
                "small": format!("https://images.example/{id}?small"),
                "thumb": format!("https://images.example/{id}?thumb"),
            }
        })
    }

    #[test]
    fn new_parses_default_endpoints() {
        let _ = Client::new("k");
    }

    #[tokio::test]
    async fn search_photos_sends_credential_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("client_id", "test-key"))
            .and(query_param("query", "nature"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 2,
                "total_pages": 1,
                "results": [photo("a"), photo("b")],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = Client::with_host("test-key", Some(&server.uri())).unwrap();
        let page = api.search_photos("nature", 1, 2).await.unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].urls.regular, "https://images.example/a");
    }

    #[tokio::test]
    async fn search_photos_maps_429() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate Limit Exceeded"))
            .mount(&server)
            .await;

        let api = Client::with_host("k", Some(&server.uri())).unwrap();
        let err = api.search_photos("space", 1, 10).await.unwrap_err();
        assert!(matches!(err, Error::RateLimited));
    }

    #[tokio::test]
    async fn search_photos_maps_other_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let api = Client::with_host("k", Some(&server.uri())).unwrap();
        match api.search_photos("space", 1, 10).await {
            Err(Error::Api(st, body)) => {
                assert_eq!(st, 503);
                assert_eq!(body, "down");
            }
            r => panic!("unexpected: {r:?}"),
        }
    }
}
