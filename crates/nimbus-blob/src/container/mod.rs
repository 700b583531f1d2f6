//! Handle to a named blob container.
//!
//! [`BlobContainer`] is a thin, cloneable wrapper around the container's
//! `Arc<dyn ObjectStore>` session that offers the blob operations
//! downstream consumers need. Every operation is instrumented with
//! [`tracing`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{ObjectMeta, ObjectStore, PutMode, PutOptions, PutPayload};
use url::Url;

use crate::error::{Error, Result};

/// A downloaded blob.
#[derive(Debug)]
pub struct GetOutput {
    /// Raw bytes of the blob.
    pub data: Bytes,
    /// MIME content-type, if one was stored with the blob.
    pub content_type: Option<String>,
    /// Size, entity tag, last-modified time and location.
    pub meta: ObjectMeta,
}

/// Outcome of an upload into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutput {
    /// Key the blob was stored under.
    pub key: String,
    /// Entity tag of the stored blob, if the service returns one.
    pub e_tag: Option<String>,
    /// Version identifier, when blob versioning is enabled.
    pub version: Option<String>,
}

/// Reference to a named container in a storage account.
///
/// Handles returned by [`BlobServiceClient::resolve_container`](crate::BlobServiceClient::resolve_container)
/// refer to a container that existed at resolution time.
#[derive(Clone)]
pub struct BlobContainer {
    name: String,
    uri: Url,
    store: Arc<dyn ObjectStore>,
}

impl BlobContainer {
    pub(crate) fn new(name: impl Into<String>, uri: Url, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            name: name.into(),
            uri,
            store,
        }
    }

    /// Returns the container name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the container URI.
    #[inline]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Returns the underlying object store session.
    #[inline]
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// List blob metadata under `prefix` (all blobs when empty).
    #[tracing::instrument(name = "blob.list", skip(self), fields(container = %self.name))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let prefix = if prefix.is_empty() {
            None
        } else {
            Some(Path::from(prefix))
        };
        self.store
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(Error::from)
    }

    /// Retrieve the bytes, content-type and metadata stored at `key`.
    #[tracing::instrument(name = "blob.get", skip(self), fields(container = %self.name))]
    pub async fn get(&self, key: &str) -> Result<GetOutput> {
        let path = Path::from(key);
        let result = self.store.get(&path).await.map_err(blob_error)?;
        let meta = result.meta.clone();
        let content_type = result
            .attributes
            .get(&object_store::Attribute::ContentType)
            .map(|v| v.to_string());
        let data = result.bytes().await.map_err(blob_error)?;
        Ok(GetOutput {
            data,
            content_type,
            meta,
        })
    }

    /// Upload `data` to `key`, replacing any existing blob.
    #[tracing::instrument(name = "blob.put", skip(self, data), fields(container = %self.name, size = data.len()))]
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput> {
        let mut opts = PutOptions {
            mode: PutMode::Overwrite,
            ..Default::default()
        };
        if let Some(ct) = content_type {
            opts.attributes
                .insert(object_store::Attribute::ContentType, ct.to_string().into());
        }
        let result = self
            .store
            .put_opts(&Path::from(key), PutPayload::from(data), opts)
            .await?;
        Ok(PutOutput {
            key: key.to_owned(),
            e_tag: result.e_tag,
            version: result.version,
        })
    }

    /// Get blob metadata without downloading the body.
    #[tracing::instrument(name = "blob.head", skip(self), fields(container = %self.name))]
    pub async fn head(&self, key: &str) -> Result<ObjectMeta> {
        self.store.head(&Path::from(key)).await.map_err(blob_error)
    }

    /// Delete the blob at `key`.
    #[tracing::instrument(name = "blob.delete", skip(self), fields(container = %self.name))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&Path::from(key)).await.map_err(blob_error)
    }
}

impl fmt::Debug for BlobContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobContainer")
            .field("name", &self.name)
            .field("uri", &self.uri.as_str())
            .finish()
    }
}

/// Maps a blob-level not-found to [`Error::BlobNotFound`].
fn blob_error(err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { path, .. } => Error::BlobNotFound(path),
        other => Error::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;

    fn container() -> BlobContainer {
        let uri = Url::parse("http://127.0.0.1:10000/devstoreaccount1/test").unwrap();
        BlobContainer::new("test", uri, Arc::new(InMemory::new()))
    }

    #[tokio::test]
    async fn put_and_get() {
        let container = container();
        let data = Bytes::from("hello world");
        container
            .put("test.txt", data.clone(), Some("text/plain"))
            .await
            .unwrap();

        let result = container.get("test.txt").await.unwrap();
        assert_eq!(result.data, data);
        assert_eq!(result.content_type.as_deref(), Some("text/plain"));
        assert_eq!(result.meta.location, Path::from("test.txt"));
    }

    #[tokio::test]
    async fn put_returns_key_and_etag() {
        let container = container();
        let result = container.put("etag.bin", Bytes::from("x"), None).await.unwrap();
        assert_eq!(result.key, "etag.bin");
        assert!(result.e_tag.is_some());
    }

    #[tokio::test]
    async fn head_and_delete() {
        let container = container();
        container
            .put("head.bin", Bytes::from("data"), None)
            .await
            .unwrap();

        let meta = container.head("head.bin").await.unwrap();
        assert_eq!(meta.size, 4);

        container.delete("head.bin").await.unwrap();
        let err = container.head("head.bin").await.unwrap_err();
        assert!(matches!(err, Error::BlobNotFound(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn get_missing_blob() {
        let err = container().get("missing").await.unwrap_err();
        assert!(matches!(err, Error::BlobNotFound(ref path) if path == "missing"));
    }

    #[tokio::test]
    async fn list_by_prefix() {
        let container = container();
        for i in 0..3 {
            container
                .put(&format!("dir/file{i}.txt"), Bytes::from(format!("{i}")), None)
                .await
                .unwrap();
        }
        container
            .put("other.txt", Bytes::from("o"), None)
            .await
            .unwrap();

        assert_eq!(container.list("dir/").await.unwrap().len(), 3);
        assert_eq!(container.list("").await.unwrap().len(), 4);
    }

    #[test]
    fn debug_shows_name_and_uri() {
        let debug = format!("{:?}", container());
        assert!(debug.contains("\"test\""));
        assert!(debug.contains("devstoreaccount1/test"));
    }
}
