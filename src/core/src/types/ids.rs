//! Identifier newtypes
//!
//! Identifiers are opaque strings issued by the backing store. They are
//! wrapped so a `TeamId` can never be passed where a `UserId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier
            pub fn new<S: Into<String>>(id: S) -> Self {
                $name(id.into())
            }

            /// Get the identifier as a string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_id! {
    /// Unique identifier for an authenticated user
    UserId
}

string_id! {
    /// Unique identifier for a team
    TeamId
}

string_id! {
    /// Identifier of a single resource instance (page, asset, domain, ...)
    ResourceId
}

string_id! {
    /// Multi-tenancy tenant identifier
    TenantId
}
