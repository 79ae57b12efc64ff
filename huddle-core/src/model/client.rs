use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one live transport connection.
///
/// Derived from the connecting origin, the connect timestamp and the number
/// of already registered connections. Unique among live connections with
/// negligible collision odds; not a cryptographic guarantee.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn derive(origin: &str, timestamp_ms: u64, registered: usize) -> Self {
        let seed = format!("{origin}-{timestamp_ms}-{registered}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()))
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(Uuid::parse_str(s).unwrap())
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(Uuid::parse_str(&s).unwrap())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
