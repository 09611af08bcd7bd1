use serde::{Deserialize, Serialize};

/// Postal address as returned by the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

impl Address {
    /// One-line summary in display order: city, street, suite, zipcode.
    pub fn summary(&self) -> String {
        [
            self.city.as_str(),
            self.street.as_str(),
            self.suite.as_str(),
            self.zipcode.as_str(),
        ]
        .join(", ")
    }
}

/// A single user record. `id` is unique within a user set.
///
/// Extra fields the endpoint sends (phone, website, company) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub address: Address,
}
