//! Dictionary keys and the matchers that compare them.
//!
//! Two key strategies share one dictionary. Identity keys compare by address
//! and are never owned by the dictionary; text keys are copied into owned
//! storage on insert and released on removal.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;

/// Address-only key. [`Identity::NULL`] is a valid key of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity(Option<NonZeroUsize>);

impl Identity {
    /// The null reference, distinct from every non-null identity.
    pub const NULL: Identity = Identity(None);

    /// Identity of the value behind `value`.
    ///
    /// Two calls agree only while the value stays where it is.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self::from_addr(value as *const T as *const () as usize)
    }

    /// Identity from a raw address; `0` is [`Identity::NULL`].
    pub const fn from_addr(addr: usize) -> Self {
        Identity(NonZeroUsize::new(addr))
    }

    /// Address, `0` for the null identity.
    pub fn addr(self) -> usize {
        self.0.map_or(0, NonZeroUsize::get)
    }

    /// Whether this is [`Identity::NULL`].
    pub fn is_null(self) -> bool {
        self.0.is_none()
    }
}

/// How a stored key decides whether a probe refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMatcher {
    /// Same address
    Identity,
    /// Same bytes
    Text,
}

impl KeyMatcher {
    /// Whether `probe` names `stored` under this matcher.
    ///
    /// Keys of different strategies never match each other.
    pub fn matches(self, stored: &DictKey, probe: KeyRef<'_>) -> bool {
        match (self, stored, probe) {
            (KeyMatcher::Identity, DictKey::Identity(a), KeyRef::Identity(b)) => *a == b,
            (KeyMatcher::Text, DictKey::Text(a), KeyRef::Text(b)) => &**a == b,
            _ => false,
        }
    }
}

/// Key as stored in a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    /// Caller-owned reference compared by address
    Identity(Identity),
    /// Text owned by the dictionary
    Text(Box<str>),
}

impl DictKey {
    /// Matcher this key is compared with.
    pub fn matcher(&self) -> KeyMatcher {
        match self {
            DictKey::Identity(_) => KeyMatcher::Identity,
            DictKey::Text(_) => KeyMatcher::Text,
        }
    }

    /// Borrowed form, usable as a lookup probe.
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            DictKey::Identity(id) => KeyRef::Identity(*id),
            DictKey::Text(text) => KeyRef::Text(&**text),
        }
    }

    /// The text, for text keys.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DictKey::Text(text) => Some(&**text),
            DictKey::Identity(_) => None,
        }
    }

    /// The identity, for identity keys.
    pub fn as_identity(&self) -> Option<Identity> {
        match self {
            DictKey::Identity(id) => Some(*id),
            DictKey::Text(_) => None,
        }
    }

    /// Bytes of key storage the dictionary owns.
    pub(crate) fn owned_bytes(&self) -> usize {
        match self {
            DictKey::Identity(_) => 0,
            DictKey::Text(text) => text.len(),
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Identity(id) if id.is_null() => f.write_str("#null"),
            DictKey::Identity(id) => write!(f, "#{:#x}", id.addr()),
            DictKey::Text(text) => f.write_str(text),
        }
    }
}

/// Borrowed key used to probe a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    /// Probe by address
    Identity(Identity),
    /// Probe by text
    Text(&'a str),
}

impl<'a> KeyRef<'a> {
    /// Owned copy of the key.
    pub fn to_owned_key(self) -> DictKey {
        match self {
            KeyRef::Identity(id) => DictKey::Identity(id),
            KeyRef::Text(text) => DictKey::Text(text.into()),
        }
    }

    pub(crate) fn hash_with<S: BuildHasher>(self, state: &S) -> u64 {
        match self {
            KeyRef::Identity(id) => hash_tagged(state, 0, id.addr()),
            KeyRef::Text(text) => hash_tagged(state, 1, text),
        }
    }
}

fn hash_tagged<S: BuildHasher, H: Hash>(state: &S, tag: u8, value: H) -> u64 {
    state.hash_one((tag, value))
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(text: &'a str) -> Self {
        KeyRef::Text(text)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    fn from(text: &'a String) -> Self {
        KeyRef::Text(text.as_str())
    }
}

impl From<Identity> for KeyRef<'_> {
    fn from(id: Identity) -> Self {
        KeyRef::Identity(id)
    }
}

impl<'a> From<&'a DictKey> for KeyRef<'a> {
    fn from(key: &'a DictKey) -> Self {
        key.as_key_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_identity_is_distinct() {
        let value = 5u32;
        let id = Identity::of(&value);
        assert!(Identity::NULL.is_null());
        assert!(!id.is_null());
        assert_ne!(id, Identity::NULL);
        assert_eq!(Identity::from_addr(0), Identity::NULL);
        assert_eq!(Identity::default(), Identity::NULL);
    }

    #[test]
    fn test_matchers_do_not_cross_strategies() {
        let text = DictKey::Text("cats".into());
        let id = DictKey::Identity(Identity::from_addr(0x10));

        assert!(text.matcher().matches(&text, KeyRef::from("cats")));
        assert!(!text.matcher().matches(&text, KeyRef::from("dogs")));
        assert!(!text.matcher().matches(&text, Identity::from_addr(0x10).into()));
        assert!(id.matcher().matches(&id, Identity::from_addr(0x10).into()));
        assert!(!id.matcher().matches(&id, KeyRef::from("cats")));
    }

    #[test]
    fn test_hash_is_tagged_by_strategy() {
        let state = ahash::RandomState::with_seeds(1, 2, 3, 4);
        let a = KeyRef::Text("x").hash_with(&state);
        let b = KeyRef::Text("x").hash_with(&state);
        assert_eq!(a, b);
        assert_ne!(
            KeyRef::Identity(Identity::NULL).hash_with(&state),
            KeyRef::Text("").hash_with(&state)
        );
    }

    #[test]
    fn test_owned_round_trip() {
        let owned = KeyRef::Text("birds").to_owned_key();
        assert_eq!(owned.as_text(), Some("birds"));
        assert_eq!(owned.owned_bytes(), 5);
        assert_eq!(owned.as_key_ref(), KeyRef::Text("birds"));
        assert_eq!(owned.to_string(), "birds");
        assert_eq!(DictKey::Identity(Identity::NULL).to_string(), "#null");
    }
}
