//! HTTP implementation of the gallery backend.
//!
//! Every operation is a JSON request against the configured server URL. Response
//! bodies are checked for application errors before decoding: a non-2xx status, or
//! a 2xx body with an `error` field, becomes [`GalleryError::Backend`].

use crate::domain::error::{GalleryError, Result};
use crate::domain::{Collection, ProcessingStatus, ReorderBatch};
use crate::storage::backend::Backend;
use crate::storage::models::{
    CollectionList, CollectionMembers, CollectionNameBody, DatasetList, ImagePage, ImagePathsBody,
    SearchRequest, SearchResults, UploadFile, UploadReceipt,
};
use futures_util::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Per-request timeout. Uploads of large images are the slowest call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gallery backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Creates a backend for the server at `base_url` (e.g. `http://localhost:5000`).
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Config`] if the URL cannot be parsed or cannot carry
    /// a path, and [`GalleryError::Transport`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| GalleryError::Config(format!("invalid server url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GalleryError::Config(format!(
                "server url {base_url:?} cannot carry a path"
            )));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        tracing::debug!(server = %base, "http backend created");

        Ok(Self { client, base })
    }

    /// Builds the URL for the given path segments below the server URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GalleryError::Config("server url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Sends a prepared request and decodes its JSON body.
fn fetch<T>(request: Result<RequestBuilder>) -> BoxFuture<'static, Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async move {
        let response = request?.send().await?;
        decode(response).await
    })
}

/// Sends a prepared request whose success body carries no data.
fn acknowledge(request: Result<RequestBuilder>) -> BoxFuture<'static, Result<()>> {
    Box::pin(async move {
        let response = request?.send().await?;
        decode::<JsonValue>(response).await.map(|_| ())
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    let value: JsonValue = if body.trim().is_empty() {
        JsonValue::Null
    } else {
        match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => JsonValue::Null,
        }
    };

    if let Some(message) = error_message(&value) {
        tracing::debug!(status = status.as_u16(), error = %message, "backend reported error");
        return Err(GalleryError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    if !status.is_success() {
        return Err(GalleryError::Backend {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// Extracts the `error` field of a response body. Non-string errors are rendered
/// as JSON text.
fn error_message(value: &JsonValue) -> Option<String> {
    value
        .get("error")
        .filter(|e| !e.is_null())
        .map(|e| e.as_str().map_or_else(|| e.to_string(), String::from))
}

impl Backend for HttpBackend {
    fn list_images(&self, dataset_id: &str, page: u32, per_page: u32) -> BoxFuture<'_, Result<ImagePage>> {
        tracing::debug!(dataset_id, page, per_page, "GET /images");
        let request = self.endpoint(&["images"]).map(|url| {
            self.client.get(url).query(&[
                ("dataset_id", dataset_id.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
        });
        fetch(request)
    }

    fn collection_members(&self, collection_id: &str) -> BoxFuture<'_, Result<CollectionMembers>> {
        tracing::debug!(collection_id, "GET /collections/{{id}}");
        let request = self
            .endpoint(&["collections", collection_id])
            .map(|url| self.client.get(url));
        fetch(request)
    }

    fn search(&self, request: &SearchRequest) -> BoxFuture<'_, Result<SearchResults>> {
        tracing::debug!(kind = ?request.kind, dataset_id = %request.dataset_id, "POST /search");
        let prepared = self
            .endpoint(&["search"])
            .map(|url| self.client.post(url).json(request));
        fetch(prepared)
    }

    fn list_collections(&self) -> BoxFuture<'_, Result<CollectionList>> {
        let request = self.endpoint(&["collections"]).map(|url| self.client.get(url));
        fetch(request)
    }

    fn create_collection(&self, name: &str) -> BoxFuture<'_, Result<Collection>> {
        let body = CollectionNameBody {
            name: name.to_string(),
        };
        let request = self
            .endpoint(&["collections"])
            .map(|url| self.client.post(url).json(&body));
        fetch(request)
    }

    fn rename_collection(&self, collection_id: &str, name: &str) -> BoxFuture<'_, Result<()>> {
        let body = CollectionNameBody {
            name: name.to_string(),
        };
        let request = self
            .endpoint(&["collections", collection_id])
            .map(|url| self.client.patch(url).json(&body));
        acknowledge(request)
    }

    fn delete_collection(&self, collection_id: &str) -> BoxFuture<'_, Result<()>> {
        let request = self
            .endpoint(&["collections", collection_id])
            .map(|url| self.client.delete(url));
        acknowledge(request)
    }

    fn add_to_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>> {
        tracing::debug!(collection_id, count = image_paths.len(), "POST /collections/{{id}}/images");
        let body = ImagePathsBody {
            image_paths: image_paths.to_vec(),
        };
        let request = self
            .endpoint(&["collections", collection_id, "images"])
            .map(|url| self.client.post(url).json(&body));
        acknowledge(request)
    }

    fn remove_from_collection(&self, collection_id: &str, image_paths: &[String]) -> BoxFuture<'_, Result<()>> {
        let body = ImagePathsBody {
            image_paths: image_paths.to_vec(),
        };
        let request = self
            .endpoint(&["collections", collection_id, "images"])
            .map(|url| self.client.delete(url).json(&body));
        acknowledge(request)
    }

    fn persist_order(&self, collection_id: &str, batch: &ReorderBatch) -> BoxFuture<'_, Result<()>> {
        tracing::debug!(collection_id, entries = batch.len(), "PATCH /collections/{{id}}/positions");
        let request = self
            .endpoint(&["collections", collection_id, "positions"])
            .map(|url| self.client.patch(url).json(batch));
        acknowledge(request)
    }

    fn upload(&self, dataset_id: &str, file: &UploadFile) -> BoxFuture<'_, Result<UploadReceipt>> {
        tracing::debug!(dataset_id, name = %file.name, bytes = file.bytes.len(), "POST /upload");
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(GalleryError::from);
        let form = part.map(|part| {
            reqwest::multipart::Form::new()
                .text("dataset_id", dataset_id.to_string())
                .part("file", part)
        });
        let request = form.and_then(|form| {
            self.endpoint(&["upload"])
                .map(|url| self.client.post(url).multipart(form))
        });
        fetch(request)
    }

    fn processing_status(&self, dataset_id: &str) -> BoxFuture<'_, Result<ProcessingStatus>> {
        let request = self.endpoint(&["processing-status"]).map(|url| {
            self.client
                .get(url)
                .query(&[("dataset_id", dataset_id.to_string())])
        });
        fetch(request)
    }

    fn list_datasets(&self) -> BoxFuture<'_, Result<DatasetList>> {
        let request = self.endpoint(&["datasets"]).map(|url| self.client.get(url));
        fetch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_joined_below_base_path() {
        let backend = HttpBackend::new("http://localhost:5000/api/").unwrap();
        let url = backend.endpoint(&["collections", "abc", "positions"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/collections/abc/positions");

        let backend = HttpBackend::new("http://localhost:5000").unwrap();
        let url = backend.endpoint(&["images"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/images");
    }

    #[test]
    fn invalid_server_url_is_a_config_error() {
        let err = HttpBackend::new("not a url").unwrap_err();
        assert!(matches!(err, GalleryError::Config(_)));
    }

    #[test]
    fn error_field_is_extracted_from_any_json_shape() {
        let body = serde_json::json!({"error": "Collection not found."});
        assert_eq!(error_message(&body).as_deref(), Some("Collection not found."));

        let body = serde_json::json!({"error": {"detail": "boom"}});
        assert_eq!(error_message(&body).as_deref(), Some(r#"{"detail":"boom"}"#));

        let body = serde_json::json!({"message": "ok", "error": null});
        assert!(error_message(&body).is_none());
    }

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn success_body_with_error_field_is_a_backend_error() {
        let err = decode::<JsonValue>(response(200, r#"{"error": "x"}"#)).await.unwrap_err();
        assert!(matches!(err, GalleryError::Backend { status: 200, ref message } if message == "x"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_backend_error() {
        let err = decode::<JsonValue>(response(502, "<html>bad gateway</html>")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Backend { status: 502, ref message } if message == "Bad Gateway"));

        let err = decode::<JsonValue>(response(404, r#"{"error": "Collection not found."}"#))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GalleryError::Backend { status: 404, ref message } if message == "Collection not found."
        ));

        let err = decode::<JsonValue>(response(500, "")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Backend { status: 500, .. }));
    }

    #[tokio::test]
    async fn success_body_is_decoded() {
        let members: CollectionMembers = decode(response(200, r#"{"images": []}"#)).await.unwrap();
        assert!(members.images.is_empty());

        let err = decode::<CollectionMembers>(response(200, "not json")).await.unwrap_err();
        assert!(matches!(err, GalleryError::Decode(_)));
    }
}
