//! Record decoders.
//!
//! Readers hand a decoder the raw bytes of exactly one record, delimiter excluded.
//! The reader never looks at the decoded value.

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Turns the bytes of one delimited record into a value.
pub trait RecordDecoder: Send + Sync {
    type Output: Send + 'static;

    /// # Errors
    ///
    /// Returns an error if `bytes` is not a valid encoding of `Output`.
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Self::Output>;
}

/// Decodes records as UTF-8 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Decoder;

impl RecordDecoder for Utf8Decoder {
    type Output = String;

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<String> {
        let s = std::str::from_utf8(bytes).context("record is not valid UTF-8")?;
        Ok(s.to_owned())
    }
}

/// Passes record bytes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDecoder;

impl RecordDecoder for BytesDecoder {
    type Output = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Parses each record as one JSON document (JSON Lines).
pub struct JsonDecoder<T>(PhantomData<fn() -> T>);

impl<T> JsonDecoder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordDecoder for JsonDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<T> {
        serde_json::from_slice(bytes).context("parse JSON record")
    }
}
