//! Helpdesk payloads as read from upstream, and the aggregated view served to callers.

use serde::{Deserialize, Serialize};

pub type TicketId = u64;
pub type ContactId = u64;

/// `GET /api/v2/tickets/{id}`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Ticket {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description_text: Option<String>,
    pub requester_id: ContactId,
    pub status: u32,
    pub priority: u32,
}

/// One element of `GET /api/v2/tickets/{id}/conversations`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Conversation {
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub user_id: ContactId,
    pub created_at: String,
}

/// `GET /api/v2/contacts/{id}`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregatedTicket {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub requester: String,
    pub status: u32,
    pub priority: u32,
    pub conversations: Vec<AggregatedConversation>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregatedConversation {
    pub body: Option<String>,
    pub private: bool,
    pub from: String,
    pub created_at: String,
}
