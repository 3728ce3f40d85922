//! etcd v2 keys API client.
//!
//! Talks plain HTTP to `<endpoint>/v2/keys/...` with a blocking client.
//! etcd error documents are mapped onto [`StoreError`] variants so callers
//! can tell "already exists" and "not found" apart from real failures.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::gateway::{Node, Store, normalize_key};

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const KEY_NOT_FOUND: u64 = 100;
const NOT_A_FILE: u64 = 102;
const NOT_A_DIRECTORY: u64 = 104;
const NODE_EXISTS: u64 = 105;

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "errorCode")]
    error_code: u64,
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// Blocking etcd v2 client.
///
/// # Examples
///
/// ```no_run
/// use etcd_schema_store::{EtcdClient, Store, ensure_directory};
///
/// let mut client = EtcdClient::new("http://127.0.0.1:4001").unwrap();
/// ensure_directory(&mut client, "/hosts/web1").unwrap();
/// client.set("/hosts/web1/ip", "10.0.0.5").unwrap();
/// println!("{:?}", client.get("/hosts").unwrap());
/// ```
pub struct EtcdClient {
    http: Client,
    endpoint: String,
}

impl EtcdClient {
    /// Creates a client for `endpoint` (e.g. `http://etcd:4001`).
    ///
    /// No request is made until the first operation.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, key: &str) -> String {
        format!("{}/v2/keys{}", self.endpoint, normalize_key(key))
    }

    fn send(&self, request: RequestBuilder, key: &str) -> Result<Node> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            let parsed: KeysResponse = serde_json::from_str(&body)?;
            return Ok(parsed.node);
        }

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => Err(map_error(error, key)),
            Err(_) => Err(StoreError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

fn map_error(error: ErrorResponse, key: &str) -> StoreError {
    let key = error.cause.unwrap_or_else(|| key.to_string());
    match error.error_code {
        KEY_NOT_FOUND => StoreError::NotFound(key),
        NOT_A_FILE => StoreError::NotAFile(key),
        NOT_A_DIRECTORY => StoreError::NotADirectory(key),
        NODE_EXISTS => StoreError::AlreadyExists(key),
        code => StoreError::Etcd {
            code,
            message: error.message,
            key,
        },
    }
}

impl Store for EtcdClient {
    fn create_directory(&mut self, path: &str) -> Result<()> {
        let path = normalize_key(path);
        if path == "/" {
            return Ok(());
        }
        debug!("PUT dir {path}");
        let request = self
            .http
            .put(self.url(&path))
            .query(&[("dir", "true"), ("prevExist", "false")]);
        match self.send(request, &path) {
            Ok(_) => Ok(()),
            // an existing value or directory both mean there is nothing to create
            Err(StoreError::NotAFile(key)) => Err(StoreError::AlreadyExists(key)),
            Err(err) => Err(err),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key);
        debug!("PUT {key}");
        let request = self.http.put(self.url(&key)).form(&[("value", value)]);
        self.send(request, &key).map(|_| ())
    }

    fn get(&self, key: &str) -> Result<Node> {
        let key = normalize_key(key);
        debug!("GET {key}");
        let request = self
            .http
            .get(self.url(&key))
            .query(&[("recursive", "true"), ("sorted", "true")]);
        self.send(request, &key)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        debug!("DELETE {key}");
        let request = self
            .http
            .delete(self.url(&key))
            .query(&[("recursive", "true")]);
        self.send(request, &key).map(|_| ())
    }
}
