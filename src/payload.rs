//! Storage for embedded binary objects.
//!
//! The reader registers every picture it decodes with a [`PayloadProvider`]
//! and references it from the generated markup by URI. The writer resolves
//! image URIs found in markup back to bytes through the same contract.

use crate::common::{Error, Result};
use crate::rtf::picture::ImageType;

/// An embedded binary object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Format of the data
    pub image_type: ImageType,
    /// Raw bytes
    pub data: Vec<u8>,
}

/// Collaborator that owns embedded binary objects.
pub trait PayloadProvider {
    /// Store a payload and return the URI markup should use to refer to it.
    fn store(&mut self, image_type: ImageType, data: Vec<u8>) -> Result<String>;

    /// Look up a previously stored payload.
    fn fetch(&self, uri: &str) -> Option<&Payload>;
}

/// In-memory payload store.
///
/// URIs have the form `./Image{n}.{ext}` with `n` counting from 1.
///
/// # Examples
///
/// ```
/// use flowrtf::payload::{MemoryPayloadStore, PayloadProvider};
/// use flowrtf::rtf::ImageType;
///
/// let mut store = MemoryPayloadStore::new();
/// let uri = store.store(ImageType::Png, vec![0x89, b'P', b'N', b'G']).unwrap();
/// assert_eq!(uri, "./Image1.png");
/// assert_eq!(store.fetch(&uri).unwrap().data.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPayloadStore {
    entries: Vec<(String, Payload)>,
}

impl MemoryPayloadStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payload under a caller-chosen URI, replacing any previous one.
    pub fn insert(&mut self, uri: impl Into<String>, payload: Payload) {
        let uri = uri.into();
        match self.entries.iter_mut().find(|(u, _)| *u == uri) {
            Some(entry) => entry.1 = payload,
            None => self.entries.push((uri, payload)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over stored payloads in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload)> {
        self.entries.iter().map(|(uri, payload)| (uri.as_str(), payload))
    }
}

impl PayloadProvider for MemoryPayloadStore {
    fn store(&mut self, image_type: ImageType, data: Vec<u8>) -> Result<String> {
        if data.is_empty() {
            return Err(Error::Unsupported("empty picture payload".into()));
        }
        let mut uri = String::with_capacity(16);
        uri.push_str("./Image");
        uri.push_str(itoa::Buffer::new().format(self.entries.len() + 1));
        uri.push('.');
        uri.push_str(image_type.extension());
        self.entries.push((uri.clone(), Payload { image_type, data }));
        Ok(uri)
    }

    fn fetch(&self, uri: &str) -> Option<&Payload> {
        self.entries
            .iter()
            .find(|(u, _)| u == uri)
            .map(|(_, payload)| payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_uris() {
        let mut store = MemoryPayloadStore::new();
        let first = store.store(ImageType::Png, vec![1]).unwrap();
        let second = store.store(ImageType::Jpeg, vec![2]).unwrap();
        assert_eq!(first, "./Image1.png");
        assert_eq!(second, "./Image2.jpg");
        assert_eq!(store.fetch(&second).unwrap().image_type, ImageType::Jpeg);
        assert!(store.fetch("./Image3.png").is_none());
    }

    #[test]
    fn test_empty_payload_rejected() {
        let mut store = MemoryPayloadStore::new();
        assert!(store.store(ImageType::Png, Vec::new()).is_err());
        assert!(store.is_empty());
    }
}
