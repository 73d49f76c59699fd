//! In-memory cache of the TF2 item schema
//!
//! [`SchemaManager`] keeps one [`Schema`] snapshot fresh by fetching the
//! Steam Web API and the SteamDatabase game-tracking files on a fixed
//! schedule; [`Schema`] answers indexed lookups and synthesizes canonical
//! display names for concrete item instances.
//!
//! ```no_run
//! use tf2_schema::{ManagerOptions, NameAttributes, SchemaManager};
//!
//! # async fn run() -> Result<(), tf2_schema::SchemaError> {
//! let mut manager = SchemaManager::new(ManagerOptions {
//!     api_key: Some("my steam api key".to_string()),
//!     ..Default::default()
//! })?;
//! manager.init().await?;
//!
//! if let Some(schema) = manager.schema() {
//!     let attributes = NameAttributes {
//!         defindex: 199,
//!         quality: 11,
//!         australium: true,
//!         ..Default::default()
//!     };
//!     // "Strange Australium Shotgun"
//!     println!("{:?}", schema.display_name(&attributes, true));
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod manager;
pub mod schema;

pub use error::{Result, SchemaError};
pub use fetch::{SchemaFetcher, SteamFetcher};
pub use manager::{ManagerOptions, SchemaEvent, SchemaManager, DEFAULT_UPDATE_INTERVAL};
pub use schema::{
    ItemsPage, NameAttributes, ParticleEffect, RawSchema, Schema, SchemaAttribute, SchemaItem,
    SchemaOverview, SchemaSection, SchemaSnapshot,
};
