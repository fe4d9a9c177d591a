use std::collections::BTreeMap;
use tracing::debug;

/// Reserved name of the database handle; never used as an alias
pub const DATABASE_ALIAS: &str = "db";

/// Short names bound to collections or tables in the current database.
///
/// Aliases are matched case-sensitively; `-` and whitespace in a collection name become `_`
/// so that `order-items` is reachable as `order_items`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aliases {
    names: BTreeMap<String, String>,
}

impl Aliases {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a collection name into an alias
    #[must_use]
    pub fn normalize(name: &str) -> String {
        name.chars()
            .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
            .collect()
    }

    /// Replace all aliases with aliases for the given collection names
    pub fn refresh<I, S>(&mut self, collections: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.names.clear();
        for collection in collections {
            self.insert(collection.as_ref());
        }
        debug!("Aliases refreshed: {:?}", self.names.keys());
    }

    /// Add an alias for a collection; the first collection to claim an alias keeps it
    pub fn insert(&mut self, collection: &str) {
        let alias = Self::normalize(collection);
        if alias.is_empty() || alias == DATABASE_ALIAS {
            return;
        }
        self.names
            .entry(alias)
            .or_insert_with(|| collection.to_string());
    }

    /// Resolve an alias to its collection name
    #[must_use]
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.names.get(alias).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(alias, collection)` pairs in alias order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names
            .iter()
            .map(|(alias, collection)| (alias.as_str(), collection.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(Aliases::normalize("users"), "users");
        assert_eq!(Aliases::normalize("order-items"), "order_items");
        assert_eq!(Aliases::normalize("audit log\tv2"), "audit_log_v2");
        assert_eq!(Aliases::normalize("Users"), "Users");
    }

    #[test]
    fn test_refresh_and_resolve() {
        let mut aliases = Aliases::new();
        aliases.refresh(["users", "order-items", "Audit Log"]);

        assert_eq!(aliases.len(), 3);
        assert_eq!(aliases.resolve("users"), Some("users"));
        assert_eq!(aliases.resolve("order_items"), Some("order-items"));
        assert_eq!(aliases.resolve("Audit_Log"), Some("Audit Log"));
        assert_eq!(aliases.resolve("order-items"), None);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let mut aliases = Aliases::new();
        aliases.refresh(["Users"]);

        assert_eq!(aliases.resolve("Users"), Some("Users"));
        assert_eq!(aliases.resolve("users"), None);
    }

    #[test]
    fn test_reserved_and_collisions() {
        let mut aliases = Aliases::new();
        aliases.refresh(["db", "a-b", "a b"]);

        assert_eq!(aliases.resolve("db"), None);
        assert_eq!(aliases.resolve("a_b"), Some("a-b"));
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_refresh_replaces() {
        let mut aliases = Aliases::new();
        aliases.refresh(["users"]);
        aliases.refresh(["orders"]);

        assert_eq!(aliases.resolve("users"), None);
        assert_eq!(aliases.resolve("orders"), Some("orders"));
        let pairs: Vec<(&str, &str)> = aliases.iter().collect();
        assert_eq!(pairs, vec![("orders", "orders")]);

        aliases.clear();
        assert!(aliases.is_empty());
    }
}
