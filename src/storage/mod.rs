// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Remote object storage access
//!
//! Requests may reference an image by URI instead of uploading bytes. This
//! module parses those references and fetches the bytes from the configured
//! object-store portal. Fetching is abstracted behind [`ObjectStore`] so
//! tests run against an in-memory backend.

pub mod object_ref;
pub mod object_store;

pub use object_ref::ObjectRef;
pub use object_store::{HttpObjectStore, MockObjectStore, ObjectStore, StorageError};
