// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Object reference parsing
//!
//! Remote images are addressed as `scheme://bucket/path/to/object`. The
//! scheme names the storage backend; bucket and object path select the blob.

use url::Url;

use crate::storage::object_store::StorageError;

/// A parsed `scheme://bucket/object` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// URI scheme, e.g. `s3` or `minio`
    pub scheme: String,
    /// Bucket (the URI authority component)
    pub bucket: String,
    /// Object path within the bucket, without the leading slash
    pub path: String,
}

impl ObjectRef {
    /// Parses a reference string.
    ///
    /// Anything that is not a well-formed URI with a non-empty bucket and a
    /// non-empty object path is a [`StorageError::InvalidReference`]; the
    /// caller maps that to a client error, not a server one.
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let parsed = Url::parse(uri)
            .map_err(|e| StorageError::InvalidReference(format!("{}: {}", uri, e)))?;

        let bucket = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => {
                return Err(StorageError::InvalidReference(format!(
                    "missing bucket in '{}'",
                    uri
                )))
            }
        };

        let path = parsed.path().trim_start_matches('/').to_string();
        if path.is_empty() {
            return Err(StorageError::InvalidReference(format!(
                "missing object path in '{}'",
                uri
            )));
        }

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            bucket,
            path,
        })
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.path)
    }
}
