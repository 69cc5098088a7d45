use crate::errors::AggregationError;
use crate::names::{NameCache, resolve_name, resolve_names};
use crate::types::{AggregatedConversation, AggregatedTicket, ContactId, TicketId};
use crate::upstream::UpstreamClient;

/// Assembles a ticket, its conversation thread and the names of everyone involved.
#[derive(Clone)]
pub struct Aggregator {
    client: UpstreamClient,
}

impl Aggregator {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Builds the aggregated view of `ticket_id`.
    ///
    /// The ticket and its conversations are fetched concurrently, then every distinct
    /// contact is looked up once. Any upstream failure fails the whole aggregation.
    pub async fn aggregate(
        &self,
        ticket_id: TicketId,
    ) -> Result<AggregatedTicket, AggregationError> {
        let client = &self.client;

        let (ticket, conversations) = tokio::try_join!(
            async { client.ticket(ticket_id).await.map_err(AggregationError::Ticket) },
            async {
                client
                    .conversations(ticket_id)
                    .await
                    .map_err(AggregationError::Conversations)
            },
        )?;

        let mut names = NameCache::new();
        let author_ids = conversations.iter().map(|c| c.user_id);
        resolve_names(
            client,
            &mut names,
            std::iter::once(ticket.requester_id).chain(author_ids),
        )
        .await?;

        let requester = Self::name(client, &mut names, ticket.requester_id).await?;

        let mut merged = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            merged.push(AggregatedConversation {
                from: Self::name(client, &mut names, conversation.user_id).await?,
                body: conversation.body_text,
                private: conversation.private,
                created_at: conversation.created_at,
            });
        }

        Ok(AggregatedTicket {
            subject: ticket.subject,
            description: ticket.description_text,
            requester,
            status: ticket.status,
            priority: ticket.priority,
            conversations: merged,
        })
    }

    /// Reads a name filled in by `resolve_names`. Prefetched reads are not cache hits.
    async fn name(
        client: &UpstreamClient,
        names: &mut NameCache,
        id: ContactId,
    ) -> Result<String, AggregationError> {
        if let Some(name) = names.get(&id) {
            return Ok(name.clone());
        }
        resolve_name(client, names, id)
            .await
            .map_err(|source| AggregationError::Contact { id, source })
    }
}
