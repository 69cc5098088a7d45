use crate::errors::{AggregationError, UpstreamError};
use crate::metrics_defs::{NAME_CACHE_HIT, NAME_CACHE_MISS};
use crate::types::ContactId;
use crate::upstream::UpstreamClient;
use indexmap::IndexSet;
use shared::counter;
use std::collections::HashMap;
use tokio::task::JoinSet;

/// Contact names resolved during one aggregation. Never shared between requests.
pub type NameCache = HashMap<ContactId, String>;

/// Returns the display name for `id`, fetching the contact only on a cache miss.
pub async fn resolve_name(
    client: &UpstreamClient,
    cache: &mut NameCache,
    id: ContactId,
) -> Result<String, UpstreamError> {
    if let Some(name) = cache.get(&id) {
        counter!(NAME_CACHE_HIT).increment(1);
        return Ok(name.clone());
    }

    counter!(NAME_CACHE_MISS).increment(1);
    let name = client.contact(id).await?.name;
    cache.insert(id, name.clone());
    Ok(name)
}

/// Fills `cache` with a name for every id in `ids`.
///
/// Each distinct id missing from the cache is fetched exactly once, all of them
/// concurrently. The first failure aborts the lookups still in flight and is returned.
pub async fn resolve_names(
    client: &UpstreamClient,
    cache: &mut NameCache,
    ids: impl IntoIterator<Item = ContactId>,
) -> Result<(), AggregationError> {
    let missing: IndexSet<ContactId> = ids
        .into_iter()
        .filter(|id| !cache.contains_key(id))
        .collect();

    let mut join_set = JoinSet::new();
    for id in missing {
        counter!(NAME_CACHE_MISS).increment(1);
        let client = client.clone();
        join_set.spawn(async move { (id, client.contact(id).await) });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined? {
            (id, Ok(contact)) => {
                cache.insert(id, contact.name);
            }
            (id, Err(source)) => {
                join_set.abort_all();
                return Err(AggregationError::Contact { id, source });
            }
        }
    }

    Ok(())
}
