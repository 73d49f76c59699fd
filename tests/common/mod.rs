#![allow(dead_code)]

//! Shared test fixtures: an injectable fetcher and a small but complete
//! schema dataset.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tf2_schema::{
    ItemsPage, Result, SchemaError, SchemaEvent, SchemaFetcher, SchemaItem, SchemaOverview,
    SchemaSnapshot,
};
use tokio::sync::broadcast;

/// Observable, mutable mock state shared between a test and the fetcher it
/// injected into the manager.
#[derive(Default)]
pub struct MockState {
    pub overview_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl MockState {
    pub fn overview_calls(&self) -> usize {
        self.overview_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

/// Scripted fetcher: serves a fixed overview, item pages keyed by start
/// cursor, paintkits, and an items_game blob. Flipping `state.fail` makes
/// every fetch error until flipped back.
pub struct MockFetcher {
    pub overview: SchemaOverview,
    pub pages: Vec<(u32, ItemsPage)>,
    pub paintkits: BTreeMap<u32, String>,
    pub items_game: Value,
    pub state: Arc<MockState>,
}

impl MockFetcher {
    /// A fetcher serving the standard fixture dataset as one page.
    pub fn fixture() -> Self {
        Self::with_pages(vec![(
            0,
            ItemsPage {
                items: fixture_items(),
                next: None,
            },
        )])
    }

    pub fn with_pages(pages: Vec<(u32, ItemsPage)>) -> Self {
        Self {
            overview: fixture_overview(),
            pages,
            paintkits: [(102, "Stabbed to Hell".to_string())].into(),
            items_game: serde_json::json!({ "game_info": { "first_valid_item_slot": "0" } }),
            state: Arc::new(MockState::default()),
        }
    }

    fn check_fail(&self, url: &str) -> Result<()> {
        if self.state.fail.load(Ordering::SeqCst) {
            return Err(SchemaError::Status {
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaFetcher for MockFetcher {
    async fn fetch_overview(&self, _api_key: &str) -> Result<SchemaOverview> {
        self.state.overview_calls.fetch_add(1, Ordering::SeqCst);
        self.check_fail("mock://overview")?;
        Ok(self.overview.clone())
    }

    async fn fetch_items_page(&self, _api_key: &str, start: u32) -> Result<ItemsPage> {
        self.check_fail("mock://items")?;
        self.pages
            .iter()
            .find(|(cursor, _)| *cursor == start)
            .map(|(_, page)| page.clone())
            .ok_or(SchemaError::Status {
                url: format!("mock://items?start={start}"),
                status: 404,
            })
    }

    async fn fetch_paintkits(&self) -> Result<BTreeMap<u32, String>> {
        self.check_fail("mock://paintkits")?;
        Ok(self.paintkits.clone())
    }

    async fn fetch_items_game(&self) -> Result<Value> {
        self.check_fail("mock://items_game")?;
        Ok(self.items_game.clone())
    }
}

pub fn fixture_overview() -> SchemaOverview {
    serde_json::from_value(serde_json::json!({
        "status": 1,
        "items_game_url": "http://media.steampowered.com/apps/440/scripts/items/items_game.abc.txt",
        "qualities": { "Normal": 0, "rarity4": 5, "Unique": 6, "strange": 11 },
        "qualityNames": {
            "Normal": "Normal", "rarity4": "Unusual", "Unique": "Unique", "strange": "Strange"
        },
        "attributes": [
            { "defindex": 1, "name": "damage penalty", "attribute_class": "mult_dmg" }
        ],
        "attribute_controlled_attached_particles": [
            { "id": 13, "name": "Burning Flames", "system": "burningplayer_red" }
        ]
    }))
    .expect("fixture overview deserializes")
}

pub fn item(defindex: u32, item_name: &str, proper_name: bool) -> SchemaItem {
    serde_json::from_value(serde_json::json!({
        "defindex": defindex,
        "name": format!("TF_{}", item_name.to_uppercase().replace(' ', "_")),
        "item_name": item_name,
        "item_quality": 6,
        "proper_name": proper_name,
        "item_slot": "melee"
    }))
    .expect("fixture item deserializes")
}

pub fn fixture_items() -> Vec<SchemaItem> {
    vec![
        item(0, "Bat", true),
        item(199, "Shotgun", false),
        item(5021, "Mann Co. Supply Crate Key", false),
    ]
}

/// A seedable snapshot over the fixture dataset.
pub fn snapshot(time: chrono::DateTime<chrono::Utc>, version: Option<&str>) -> SchemaSnapshot {
    serde_json::from_value(serde_json::json!({
        "time": time.timestamp_millis(),
        "version": version,
        "raw": {
            "schema": {
                "qualities": { "Unique": 6 },
                "qualityNames": { "Unique": "Unique" },
                "items": [
                    { "defindex": 0, "name": "TF_WEAPON_BAT", "item_name": "Bat",
                      "item_quality": 6, "proper_name": true }
                ],
                "paintkits": {}
            },
            "items_game": {}
        }
    }))
    .expect("fixture snapshot deserializes")
}

/// Receives the next lifecycle event, failing the test after a (virtual or
/// wall-clock) timeout rather than hanging.
pub async fn next_event(
    events: &mut broadcast::Receiver<SchemaEvent>,
    timeout: Duration,
) -> SchemaEvent {
    tokio::time::timeout(timeout, events.recv())
        .await
        .expect("timed out waiting for a schema event")
        .expect("event channel closed or lagged")
}
