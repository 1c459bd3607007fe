use std::fmt;

use serde::{Deserialize, Serialize};

/// Postal address of a store. Every field may be empty, either because
/// the lookup hasn't finished or because it never will.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.postal_code.is_empty()
            && self.city.is_empty()
            && self.country.is_empty()
    }
}

// Street, 10115 Berlin, Germany
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locality = [self.postal_code.as_str(), self.city.as_str()]
            .into_iter()
            .filter(|x| !x.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let parts = [self.street.as_str(), locality.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|x| !x.is_empty())
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let full = Address {
            street: "Unter den Linden".to_string(),
            postal_code: "10117".to_string(),
            city: "Berlin".to_string(),
            country: "Germany".to_string(),
        };
        assert_eq!(full.to_string(), "Unter den Linden, 10117 Berlin, Germany");

        let partial = Address {
            city: "Berlin".to_string(),
            ..Default::default()
        };
        assert_eq!(partial.to_string(), "Berlin");
        assert!(!partial.is_empty());

        assert_eq!(Address::default().to_string(), "");
        assert!(Address::default().is_empty());
    }
}
