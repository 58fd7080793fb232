//! HTTP request handlers.

pub(crate) mod manifest;
