//! Upstream data sources
//!
//! The manager talks to the outside world through the [`SchemaFetcher`]
//! seam: four async operations covering the overview endpoint, the
//! paginated item catalog, the paintkit definitions, and the items_game
//! blob. [`SteamFetcher`] is the production implementation; tests inject
//! their own.

mod steam;

pub use steam::SteamFetcher;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::schema::{ItemsPage, SchemaOverview};

/// The four upstream data sources a refresh draws from.
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Fetches the schema overview (qualities, attributes, particle
    /// effects, and assorted metadata).
    async fn fetch_overview(&self, api_key: &str) -> Result<SchemaOverview>;

    /// Fetches one page of item definitions starting at `start`. The
    /// returned page carries the next cursor while more pages remain.
    async fn fetch_items_page(&self, api_key: &str, start: u32) -> Result<ItemsPage>;

    /// Fetches the paintkit id -> name mapping.
    async fn fetch_paintkits(&self) -> Result<BTreeMap<u32, String>>;

    /// Fetches the items_game blob, passed through into the snapshot
    /// uninterpreted.
    async fn fetch_items_game(&self) -> Result<Value>;
}
