//! Stored Values
//!
//! The store only needs a value to hand back its contents as bytes.

use bytes::Bytes;
use std::sync::Arc;

/// Anything that can expose its contents as a byte slice.
///
/// Values are shared behind an `Arc` once stored and are never mutated by
/// the store.
pub trait ByteValue: Send + Sync {
    fn as_bytes(&self) -> &[u8];
}

impl ByteValue for Bytes {
    fn as_bytes(&self) -> &[u8] {
        self.as_ref()
    }
}

impl ByteValue for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

impl ByteValue for String {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

impl ByteValue for &'static str {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

impl ByteValue for &'static [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl<T: ByteValue + ?Sized> ByteValue for Box<T> {
    fn as_bytes(&self) -> &[u8] {
        (**self).as_bytes()
    }
}

impl<T: ByteValue + ?Sized> ByteValue for Arc<T> {
    fn as_bytes(&self) -> &[u8] {
        (**self).as_bytes()
    }
}
