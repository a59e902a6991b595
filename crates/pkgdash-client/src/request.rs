//! Request pipeline for the pkgdash backend.
//!
//! One generic entry point, [`ApiClient::request`], places parameters by
//! method, resolves the backend address from the session configuration on
//! every call, and classifies the response by status code.

use crate::error::{ClientError, Result};
use crate::query::to_query_pairs;
use pkgdash_config::BackendConfig;
use pkgdash_core::ValidationError;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// HTTP method of a request descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Read-style methods carry their parameters in the query string.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    const fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Description of one backend call.
///
/// Built per call and dropped once the call resolves.
pub struct Request<'a, P: ?Sized = ()> {
    endpoint: &'a str,
    method: Method,
    params: Option<&'a P>,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
}

impl<P: ?Sized> fmt::Debug for Request<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("has_params", &self.params.is_some())
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .finish()
    }
}

impl<'a> Request<'a> {
    /// Create a parameterless request.
    #[must_use]
    pub const fn new(method: Method, endpoint: &'a str) -> Self {
        Self {
            endpoint,
            method,
            params: None,
            timeout: None,
            headers: Vec::new(),
        }
    }

    /// GET request.
    #[must_use]
    pub const fn get(endpoint: &'a str) -> Self {
        Self::new(Method::Get, endpoint)
    }

    /// POST request.
    #[must_use]
    pub const fn post(endpoint: &'a str) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// PUT request.
    #[must_use]
    pub const fn put(endpoint: &'a str) -> Self {
        Self::new(Method::Put, endpoint)
    }

    /// DELETE request.
    #[must_use]
    pub const fn delete(endpoint: &'a str) -> Self {
        Self::new(Method::Delete, endpoint)
    }
}

impl<'a, P: ?Sized> Request<'a, P> {
    /// Attach the parameter payload.
    #[must_use]
    pub fn params<Q: ?Sized>(self, params: &'a Q) -> Request<'a, Q> {
        Request {
            endpoint: self.endpoint,
            method: self.method,
            params: Some(params),
            timeout: self.timeout,
            headers: self.headers,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the client-wide total timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Endpoint path.
    #[must_use]
    pub const fn endpoint(&self) -> &str {
        self.endpoint
    }

    /// Method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }
}

/// Transport settings shared by every request of a client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Total request timeout.
    pub timeout: Duration,
    /// User agent header.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: format!("pkgdash/{}", crate::VERSION),
        }
    }
}

/// Classified response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// 2xx; the body is the payload.
    Success(&'a [u8]),
    /// 422 with the server's location and message.
    ValidationFailure {
        /// Stringified location.
        location: String,
        /// Message.
        message: String,
    },
    /// Any other status.
    TransportFailure {
        /// HTTP status code.
        status: u16,
        /// Body as text.
        body: String,
    },
}

impl<'a> Outcome<'a> {
    /// Classify a response by status code.
    #[must_use]
    pub fn classify(status: StatusCode, body: &'a [u8]) -> Self {
        if status.is_success() {
            return Self::Success(body);
        }
        if status == StatusCode::UNPROCESSABLE_ENTITY
            && let Some(err) = parse_validation(body)
        {
            return Self::ValidationFailure {
                location: err.loc.to_string(),
                message: err.msg,
            };
        }
        Self::TransportFailure {
            status: status.as_u16(),
            body: body_text(body),
        }
    }

    /// Decode a success into the declared payload type, or turn a failure
    /// into the matching error.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Success(body) => decode(body),
            Self::ValidationFailure { location, message } => {
                Err(ClientError::Validation { location, message })
            }
            Self::TransportFailure { status, body } => Err(ClientError::Status { status, body }),
        }
    }
}

/// 422 bodies come either bare or wrapped in FastAPI's `detail` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValidationBody {
    Bare(ValidationError),
    Detail { detail: Vec<ValidationError> },
}

fn parse_validation(body: &[u8]) -> Option<ValidationError> {
    match sonic_rs::from_slice::<ValidationBody>(body).ok()? {
        ValidationBody::Bare(err) => Some(err),
        ValidationBody::Detail { detail } => {
            if detail.len() > 1 {
                debug!(count = detail.len(), "reporting first of several validation errors");
            }
            detail.into_iter().next()
        }
    }
}

/// A JSON string body is unquoted, anything else is passed through as text.
fn body_text(body: &[u8]) -> String {
    sonic_rs::from_slice::<String>(body)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned())
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    sonic_rs::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Join an endpoint onto a base address, keeping any path prefix of the base.
pub fn endpoint_url(base: &str, endpoint: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        message: e.to_string(),
    })
}

/// HTTP client for the pkgdash backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    backend: BackendConfig,
    settings: Arc<ClientSettings>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("client", &"reqwest::Client")
            .field("backend", &self.backend)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ApiClient {
    /// Create a client with default transport settings.
    pub fn new(backend: BackendConfig) -> Result<Self> {
        Self::with_settings(backend, ClientSettings::default())
    }

    /// Create a client with explicit transport settings.
    pub fn with_settings(backend: BackendConfig, settings: ClientSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            backend,
            settings: Arc::new(settings),
        })
    }

    /// Session configuration consulted on every dispatch.
    #[must_use]
    pub const fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    /// Dispatch a request and decode the payload.
    ///
    /// Read-style methods put the parameters in the query string, write-style
    /// methods send them as a JSON body. No retries, no caching.
    pub async fn request<T, P>(&self, request: &Request<'_, P>) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let base = self.backend.base_url()?;
        let mut url = endpoint_url(&base, request.endpoint())?;

        let method = request.method();
        let mut builder = if method.is_read() {
            if let Some(params) = request.params {
                let pairs = to_query_pairs(params)?;
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
            self.client.request(method.as_reqwest(), url.clone())
        } else {
            let builder = self.client.request(method.as_reqwest(), url.clone());
            match request.params {
                Some(params) => builder.json(params),
                None => builder,
            }
        };

        builder = builder.headers(self.headers(&request.headers)?);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(
            method = %method,
            endpoint = request.endpoint(),
            url = %url,
            "sending request"
        );

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "request failed without response");
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = response.bytes().await?;
        trace!(url = %url, status = status.as_u16(), bytes = body.len(), "response received");

        let outcome = Outcome::classify(status, &body);
        if !matches!(outcome, Outcome::Success(_)) {
            debug!(url = %url, status = status.as_u16(), "request rejected by backend");
        }
        outcome.into_result()
    }

    /// GET with query parameters.
    pub async fn get<T, P>(&self, endpoint: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.request(&Request::get(endpoint).params(params)).await
    }

    /// POST with a JSON body.
    pub async fn post<T, P>(&self, endpoint: &str, body: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.request(&Request::post(endpoint).params(body)).await
    }

    fn headers(&self, extra: &[(String, String)]) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Ok(ua) = HeaderValue::from_str(&self.settings.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgdash_config::{BackendConfig, MemoryStore};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base: &str) -> ApiClient {
        let backend = BackendConfig::with_default(Arc::new(MemoryStore::new()), base);
        ApiClient::new(backend).unwrap()
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        name: String,
        count: u32,
    }

    #[test]
    fn method_placement() {
        assert!(Method::Get.is_read());
        assert!(Method::Delete.is_read());
        assert!(!Method::Post.is_read());
        assert!(!Method::Put.is_read());
    }

    #[test]
    fn params_keep_method_and_endpoint() {
        let params = [("url", "https://github.com/curl/curl")];
        let request = Request::put("/api/repo/info").params(&params);
        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.endpoint(), "/api/repo/info");
    }

    #[test]
    fn endpoint_url_keeps_base_prefix() {
        let url = endpoint_url("https://example.org/pkgdash/", "/api/pkg/list").unwrap();
        assert_eq!(url.as_str(), "https://example.org/pkgdash/api/pkg/list");

        let url = endpoint_url("http://localhost:8000", "api/pkg/list").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/pkg/list");

        assert!(matches!(
            endpoint_url("not a url", "/api"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn classify_statuses() {
        assert_eq!(
            Outcome::classify(StatusCode::OK, b"[]"),
            Outcome::Success(b"[]")
        );
        assert_eq!(
            Outcome::classify(
                StatusCode::UNPROCESSABLE_ENTITY,
                br#"{"loc":["query","page"],"msg":"invalid"}"#
            ),
            Outcome::ValidationFailure {
                location: "query,page".into(),
                message: "invalid".into()
            }
        );
        assert_eq!(
            Outcome::classify(StatusCode::INTERNAL_SERVER_ERROR, br#""internal error""#),
            Outcome::TransportFailure {
                status: 500,
                body: "internal error".into()
            }
        );
    }

    #[test]
    fn classify_fastapi_detail_list() {
        let body = br#"{"detail":[{"loc":["query","size"],"msg":"ensure this value is less than or equal to 100","type":"value_error"}]}"#;
        let err = Outcome::classify(StatusCode::UNPROCESSABLE_ENTITY, body)
            .into_result::<()>()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "query,size: ensure this value is less than or equal to 100"
        );
    }

    #[test]
    fn unparseable_422_falls_back_to_status() {
        let err = Outcome::classify(StatusCode::UNPROCESSABLE_ENTITY, b"nope")
            .into_result::<()>()
            .unwrap_err();
        assert_eq!(err.to_string(), "422: nope");
    }

    #[test]
    fn success_body_that_does_not_match_is_decode_error() {
        let err = Outcome::classify(StatusCode::OK, b"{}")
            .into_result::<Vec<String>>()
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn success_returns_decoded_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"name": "curl", "count": 3})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let item: Item = client.get("/api/items", &()).await.unwrap();
        assert_eq!(
            item,
            Item {
                name: "curl".into(),
                count: 3
            }
        );
    }

    #[tokio::test]
    async fn validation_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"loc": ["query", "page"], "msg": "invalid"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .get::<Item, _>("/api/pkg/list", &json!({"page": -1}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "query,page: invalid");
    }

    #[tokio::test]
    async fn server_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get::<Item, _>("/api/pkg/list", &()).await.unwrap_err();
        assert_eq!(err.to_string(), "500: internal error");
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn array_params_repeat_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pkg/search"))
            .and(query_param("q", "curl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let _: Vec<String> = client
            .get(
                "/api/pkg/search",
                &json!({"q": "curl", "distros": ["ubuntu", "fedora"]}),
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let distros: Vec<String> = requests[0]
            .url
            .query_pairs()
            .filter(|(k, _)| k == "distros")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(distros, vec!["ubuntu", "fedora"]);
    }

    #[tokio::test]
    async fn write_methods_send_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/things"))
            .and(body_json(json!({"name": "curl", "tags": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "curl", "count": 1})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let item: Item = client
            .post("/api/things", &json!({"name": "curl", "tags": ["a", "b"]}))
            .await
            .unwrap();
        assert_eq!(item.count, 1);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn delete_puts_params_in_query() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/things"))
            .and(query_param("id", "7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client
            .request::<(), _>(&Request::delete("/api/things").params(&json!({"id": 7})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn custom_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("x-trace", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["ok"])))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let out: Vec<String> = client
            .request(&Request::get("/api/pkg/distros").header("x-trace", "abc"))
            .await
            .unwrap();
        assert_eq!(out, vec!["ok"]);
    }

    #[tokio::test]
    async fn invalid_header_is_rejected_before_sending() {
        let client = client_for("http://127.0.0.1:1");
        let err = client
            .request::<(), ()>(&Request::get("/api").header("bad header", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn base_url_is_resolved_per_call() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        for (server, name) in [(&first, "first"), (&second, "second")] {
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([name])))
                .mount(server)
                .await;
        }

        let client = client_for(&first.uri());
        let out: Vec<String> = client.get("/api/pkg/distros", &()).await.unwrap();
        assert_eq!(out, vec!["first"]);

        client.backend().set_base_url(&second.uri()).unwrap();
        let out: Vec<String> = client.get("/api/pkg/distros", &()).await.unwrap();
        assert_eq!(out, vec!["second"]);
    }

    #[tokio::test]
    async fn no_response_is_transport_failure() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.get::<Item, _>("/api/pkg/list", &()).await.unwrap_err();
        assert!(matches!(err, ClientError::NoResponse(_)));
        assert!(err.to_string().starts_with("no response: "));
    }
}
