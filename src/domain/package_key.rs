//! Case-insensitive (package, version) identity used as a cache key

use super::PackageVersion;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A package identifier paired with a parsed version
///
/// Identifiers compare ignoring ASCII case; versions compare by value, so
/// `("Foo", 1.0)` and `("foo", 1.0.0)` are the same key.
#[derive(Debug, Clone)]
pub struct PackageKey {
    /// Package identifier as written
    pub id: String,
    /// Parsed version
    pub version: PackageVersion,
}

impl PackageKey {
    /// Create a new key
    pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

/// Case-insensitive identifier comparison shared across the crate
pub fn same_id(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl PartialEq for PackageKey {
    fn eq(&self, other: &Self) -> bool {
        same_id(&self.id, &other.id) && self.version == other.version
    }
}

impl Eq for PackageKey {}

impl Hash for PackageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.id.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        // Separator keeps ("ab", ...) and ("a", "b...") apart
        state.write_u8(0xff);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    fn key(id: &str, version: &str) -> PackageKey {
        PackageKey::new(id, PackageVersion::parse(version).unwrap())
    }

    fn hash_of(key: &PackageKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_same_package_and_version() {
        assert_eq!(key("Newtonsoft.Json", "13.0.1"), key("Newtonsoft.Json", "13.0.1"));
    }

    #[test]
    fn test_equal_different_case() {
        assert_eq!(key("Newtonsoft.Json", "13.0.1"), key("newtonsoft.json", "13.0.1"));
        assert_eq!(
            hash_of(&key("Newtonsoft.Json", "13.0.1")),
            hash_of(&key("newtonsoft.json", "13.0.1"))
        );
    }

    #[test]
    fn test_equal_different_representation() {
        assert_eq!(key("NUnit", "3.13"), key("NUnit", "3.13.0"));
        assert_eq!(hash_of(&key("NUnit", "3.13")), hash_of(&key("NUnit", "3.13.0")));
    }

    #[test]
    fn test_not_equal_different_version() {
        assert_ne!(key("Newtonsoft.Json", "13.0.1"), key("Newtonsoft.Json", "12.0.1"));
        assert_ne!(
            hash_of(&key("Newtonsoft.Json", "13.0.1")),
            hash_of(&key("Newtonsoft.Json", "12.0.1"))
        );
    }

    #[test]
    fn test_not_equal_different_package() {
        assert_ne!(key("Newtonsoft.Json", "13.0.1"), key("NUnit", "13.0.1"));
    }

    #[test]
    fn test_works_as_hash_map_key() {
        let mut map = HashMap::new();
        map.insert(key("Newtonsoft.Json", "13.0.1"), "first");

        assert!(map.contains_key(&key("newtonsoft.json", "13.0.1")));
        assert!(map.contains_key(&key("NEWTONSOFT.JSON", "13.0.1")));
        assert!(!map.contains_key(&key("Newtonsoft.Json", "12.0.1")));
    }

    #[test]
    fn test_same_id() {
        assert!(same_id("Foo.Bar", "foo.bar"));
        assert!(!same_id("Foo.Bar", "Foo.Baz"));
    }
}
