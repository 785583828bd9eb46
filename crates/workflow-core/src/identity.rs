//! Stable identities for child workflows rendered within one render pass.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::hash::hash_one;

/// Identifies a child workflow instance among its siblings.
///
/// Two identities are equal when they name the same workflow type and the
/// same key. An empty key is the same as no key, so `Some("")` and `None`
/// collide.
#[derive(Clone)]
pub struct Identity {
    type_id: TypeId,
    type_name: &'static str,
    key: Option<String>,
}

impl Identity {
    pub fn of<C: 'static>(key: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            key: key.filter(|key| !key.is_empty()).map(str::to_owned),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_of<C: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// Compact hash of the type name and key, usable as a slot key by renderers.
    pub fn fingerprint(&self) -> u64 {
        hash_one(&(self.type_name, &self.key))
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.key == other.key
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("type", &self.type_name)
            .field("key", &self.key)
            .finish()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{key:?}]", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct First;
    struct Second;

    #[test]
    fn same_type_and_key_are_equal() {
        assert_eq!(Identity::of::<First>(Some("a")), Identity::of::<First>(Some("a")));
        assert_eq!(Identity::of::<First>(None), Identity::of::<First>(None));
    }

    #[test]
    fn key_or_type_distinguishes() {
        assert_ne!(Identity::of::<First>(Some("a")), Identity::of::<First>(Some("b")));
        assert_ne!(Identity::of::<First>(Some("a")), Identity::of::<First>(None));
        assert_ne!(Identity::of::<First>(None), Identity::of::<Second>(None));
    }

    #[test]
    fn empty_key_means_no_key() {
        let identity = Identity::of::<First>(Some(""));
        assert_eq!(identity.key(), None);
        assert_eq!(identity, Identity::of::<First>(None));
    }

    #[test]
    fn fingerprint_follows_equality() {
        let a = Identity::of::<First>(Some("a"));
        assert_eq!(a.fingerprint(), Identity::of::<First>(Some("a")).fingerprint());
        assert_ne!(a.fingerprint(), Identity::of::<First>(Some("b")).fingerprint());
    }

    #[test]
    fn display_includes_key() {
        let identity = Identity::of::<First>(Some("row-1"));
        let rendered = identity.to_string();
        assert!(rendered.ends_with("First[\"row-1\"]"), "{rendered}");
        assert!(identity.is_of::<First>());
        assert!(!identity.is_of::<Second>());
    }
}
