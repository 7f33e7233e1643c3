//! # Event Schema
//!
//! State-change notifications emitted by the registry. The engine queues
//! them as plain values; the service drains the queue after each call and
//! hands the events to an [`crate::ports::outbound::EventPublisher`].
//!
//! | Event | Emitted by |
//! |-------|-----------|
//! | `Registered` | `register` (exactly once per success) |
//! | `DataModified` | `modify_data` |
//! | `Renewed` | `renew` |
//! | `Transferred` | `transfer`, `transfer_token`, `on_ownership_changed` |
//! | `Withdrawn` | service `withdraw`, after the payout settles |

use crate::domain::value_objects::{Address, Amount, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Registry state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A name was registered (or a lapsed one superseded).
    Registered {
        owner: Address,
        name: String,
        id: TokenId,
    },
    /// The owner replaced the record's data.
    DataModified { name: String, owner: Address },
    /// A lease was extended.
    Renewed {
        name: String,
        payer: Address,
        lease_ends_at: Timestamp,
        paid: Amount,
    },
    /// Ownership moved.
    Transferred {
        name: String,
        id: TokenId,
        from: Address,
        to: Address,
    },
    /// The treasury paid out to its controller.
    Withdrawn { controller: Address, amount: Amount },
}

impl RegistryEvent {
    /// Topic this event is published under.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Registered { .. } => topics::REGISTERED,
            Self::DataModified { .. } => topics::DATA_MODIFIED,
            Self::Renewed { .. } => topics::RENEWED,
            Self::Transferred { .. } => topics::TRANSFERRED,
            Self::Withdrawn { .. } => topics::WITHDRAWN,
        }
    }

    /// Name the event refers to, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Registered { name, .. }
            | Self::DataModified { name, .. }
            | Self::Renewed { name, .. }
            | Self::Transferred { name, .. } => Some(name),
            Self::Withdrawn { .. } => None,
        }
    }
}

// =============================================================================
// EVENT TOPICS
// =============================================================================

/// Event topics for the name registry.
pub mod topics {
    pub const REGISTERED: &str = "qns.registry.registered";
    pub const DATA_MODIFIED: &str = "qns.registry.data_modified";
    pub const RENEWED: &str = "qns.registry.renewed";
    pub const TRANSFERRED: &str = "qns.registry.transferred";
    pub const WITHDRAWN: &str = "qns.registry.withdrawn";
}
