//! Transport-independent request description

use std::path::Path;

use emo_domain::{EmoPlatformError, RequestInfo, Result};
use reqwest::Method;
use serde_json::Value;
use url::form_urlencoded;

/// File attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub field: &'static str,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Describe `bytes` read from `path`; the MIME type is guessed from the
    /// extension.
    pub fn new(field: &'static str, path: &Path, bytes: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map_or_else(|| field.to_string(), |name| name.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();
        Self { field, file_name, mime, bytes }
    }

    /// Multipart form for the async transport.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the MIME type is not a valid header value.
    pub fn to_async_form(&self) -> Result<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| EmoPlatformError::Config(format!("invalid mime type {}: {e}", self.mime)))?;
        Ok(reqwest::multipart::Form::new().part(self.field, part))
    }

    /// Multipart form for the blocking transport.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the MIME type is not a valid header value.
    pub fn to_blocking_form(&self) -> Result<reqwest::blocking::multipart::Form> {
        let part = reqwest::blocking::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| EmoPlatformError::Config(format!("invalid mime type {}: {e}", self.mime)))?;
        Ok(reqwest::blocking::multipart::Form::new().part(self.field, part))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(UploadFile),
}

/// One call against the platform API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Refresh the access token and retry once on 401.
    pub refresh_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn upload(mut self, file: UploadFile) -> Self {
        self.body = RequestBody::Multipart(file);
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub const fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    /// Absolute URL of this request against `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Request metadata attached to errors.
    pub fn describe(&self, url: &str, headers: &[(&'static str, String)]) -> RequestInfo {
        let mut info = RequestInfo::new(self.method.as_str(), url);
        for (name, value) in headers {
            info = info.with_header(*name, value.clone());
        }
        match &self.body {
            RequestBody::Json(_) => info.with_header("Content-Type", "application/json"),
            RequestBody::Multipart(_) => info.with_header("Content-Type", "multipart/form-data"),
            RequestBody::Empty => info,
        }
    }
}
