//! Typed Document IDs
//!
//! Documents are addressed by opaque string ids inside a collection.
//! [`DocumentId`] keeps ids of different collections from being mixed up.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic typed document id
///
/// Usage:
/// ```
/// use kernel::id::DocumentId;
///
/// struct UserMarker;
/// type UserId = DocumentId<UserMarker>;
///
/// let id = UserId::from_string("u-1");
/// assert_eq!(id.as_str(), "u-1");
/// ```
pub struct DocumentId<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentId<T> {
    /// Generate a fresh id (hyphen-less UUID v4)
    pub fn new() -> Self {
        Self::from_string(Uuid::new_v4().simple().to_string())
    }

    /// Wrap an id read from a store, a token or a path parameter
    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> Default for DocumentId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DocumentId<T> {
    fn clone(&self) -> Self {
        Self::from_string(self.value.clone())
    }
}

impl<T> PartialEq for DocumentId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for DocumentId<T> {}

impl<T> Hash for DocumentId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for DocumentId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.value)
    }
}

impl<T> fmt::Display for DocumentId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for DocumentId<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for DocumentId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for DocumentId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_generated_ids_are_unique() {
        let first = DocumentId::<A>::new();
        let second = DocumentId::<A>::new();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[test]
    fn test_markers_do_not_mix() {
        let a = DocumentId::<A>::from_string("same");
        let b = DocumentId::<B>::from_string("same");
        // Same text, different collections: only the raw strings compare.
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = DocumentId::<A>::from_string("role-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""role-1""#);
        let back: DocumentId<A> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
