use std::borrow::Borrow;
use std::fmt;

/// Address of the device at the far end of one link.
///
/// Only ever compared; never parsed or validated. In IPv4 deployments this is
/// the peer's dotted-quad string, e.g. `"192.168.200.2"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerAddress(String);

impl PeerAddress {
    /// Create an address from any string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for PeerAddress {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl AsRef<str> for PeerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PeerAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}
