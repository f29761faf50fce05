#![doc = "photo-relay-core: pipeline library for photo-relay."]

//! Moves a photo album from a photo-sharing API to a cloud disk through a
//! local staging directory.
//!
//! The crate holds the data model, the service traits, the source client and
//! the fetch/upload/synchronise pipelines. It never reads credentials from the
//! environment; callers construct clients and hand them in.

pub mod config;
pub mod contract;
pub mod download;
pub mod error;
pub mod photos;
pub mod staging;
pub mod synchronise;
pub mod uploader;
