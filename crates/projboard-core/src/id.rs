//! Identity types for projboard entities
//!
//! Every entity is keyed by an opaque UUIDv4 wrapped in its own newtype so a
//! ticket id can never be passed where a project id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short human-facing form, e.g. `tkt-1a2b3c4d`
            pub fn short(&self) -> String {
                let simple = self.0.simple().to_string();
                format!("{}-{}", $prefix, &simple[..8])
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| crate::Error::InvalidId(s.to_string()))
            }
        }
    };
}

entity_id!(
    /// Identity of a registered user
    UserId,
    "usr"
);
entity_id!(
    /// Identity of a project
    ProjectId,
    "prj"
);
entity_id!(
    /// Identity of a milestone
    MilestoneId,
    "mst"
);
entity_id!(
    /// Identity of a ticket
    TicketId,
    "tkt"
);
entity_id!(
    /// Identity of a bug report
    BugReportId,
    "bug"
);
