//! Addresses produced by a deployment run.

use alloy::primitives::Address;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::deploy::types::{DeployError, DeployResult};

/// Contract name to deployed address, in deployment order.
///
/// Steps take the context by value and hand back an extended one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentContext {
    contracts: IndexMap<String, Address>,
}

impl DeploymentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an address. A name seen before keeps its position.
    pub fn with(mut self, name: impl Into<String>, address: Address) -> Self {
        self.contracts.insert(name.into(), address);
        self
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.contracts.get(name).copied()
    }

    /// Address of a contract a later step depends on.
    pub fn require(&self, name: &str) -> DeployResult<Address> {
        self.get(name)
            .ok_or_else(|| DeployError::MissingContract(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.contracts.iter().map(|(name, address)| (name.as_str(), *address))
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Serialized as `{ name: "0xChecksummedAddress" }`.
impl Serialize for DeploymentContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.contracts.len()))?;
        for (name, address) in &self.contracts {
            map.serialize_entry(name, &address.to_checksum(None))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_insertion_order_kept() {
        let context = DeploymentContext::new()
            .with("SecretRegistry", Address::repeat_byte(2))
            .with("EndpointRegistry", Address::repeat_byte(1))
            .with("SecretRegistry", Address::repeat_byte(3));

        let names: Vec<_> = context.names().collect();
        assert_eq!(names, vec!["SecretRegistry", "EndpointRegistry"]);
        assert_eq!(context.get("SecretRegistry"), Some(Address::repeat_byte(3)));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_require_missing() {
        let err = DeploymentContext::new().require("CustomToken").unwrap_err();
        assert!(matches!(err, DeployError::MissingContract(name) if name == "CustomToken"));
    }

    #[test]
    fn test_override_keeps_position() {
        let context = DeploymentContext::new()
            .with("A", Address::repeat_byte(1))
            .with("B", Address::repeat_byte(2))
            .with("A", Address::repeat_byte(9));

        assert_eq!(context.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(context.get("A"), Some(Address::repeat_byte(9)));
    }

    #[test]
    fn test_serializes_checksummed() {
        let context = DeploymentContext::new().with(
            "CustomToken",
            address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
        );
        let json = serde_json::to_string(&context).unwrap();
        assert_eq!(json, r#"{"CustomToken":"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"}"#);
    }
}
