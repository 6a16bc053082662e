//! Opaque identifiers.
//!
//! All ids are UUIDs on the wire and in storage. Only equality carries
//! meaning; ownership checks compare ids and nothing else.
//!
//! Conversation and FAQ ids are UUIDv7 (timestamp-sortable) so that
//! insertion order survives a sort by id. User ids are v7 as well when
//! generated app-side; rows inserted by Postgres fall back to v4.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new timestamp-sortable id.
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

opaque_id!(
    /// Identifies a user account.
    UserId
);
opaque_id!(
    /// Identifies a conversation.
    ConversationId
);
opaque_id!(
    /// Identifies an FAQ entry.
    FaqId
);
