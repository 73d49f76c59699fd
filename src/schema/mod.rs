//! The in-memory schema snapshot and its read-only query operations
//!
//! A `Schema` is immutable once constructed; a refresh installs a whole new
//! snapshot rather than mutating this one. All keyed lookups are consistent
//! with a linear scan of the same collection: the binary search is purely
//! an optimization, with an exhaustive fallback because the dataset comes
//! from a third party and its sort order is a contract, not a guarantee.

mod name;
mod types;

pub use name::NameAttributes;
pub use types::{
    ItemsPage, ParticleEffect, RawSchema, SchemaAttribute, SchemaItem, SchemaOverview,
    SchemaSection, SchemaSnapshot,
};

use chrono::{DateTime, Utc};

/// One snapshot of the TF2 item schema.
#[derive(Debug, Clone)]
pub struct Schema {
    raw: RawSchema,
    time: DateTime<Utc>,
    version: Option<String>,
}

impl Schema {
    /// Wraps a freshly fetched dataset, stamped with the current time and
    /// this crate's version.
    pub fn new(raw: RawSchema) -> Self {
        Self {
            raw,
            time: Utc::now(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    /// Restores a schema from a previously serialized snapshot.
    pub fn from_snapshot(snapshot: SchemaSnapshot) -> Self {
        Self {
            raw: snapshot.raw,
            time: snapshot.time,
            version: snapshot.version,
        }
    }

    /// Serializable view of this schema, for external persistence.
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            time: self.time,
            version: self.version.clone(),
            raw: self.raw.clone(),
        }
    }

    pub fn raw(&self) -> &RawSchema {
        &self.raw
    }

    pub fn items(&self) -> &[SchemaItem] {
        &self.raw.schema.items
    }

    pub fn attributes(&self) -> &[SchemaAttribute] {
        &self.raw.schema.overview.attributes
    }

    pub fn particle_effects(&self) -> &[ParticleEffect] {
        &self.raw.schema.overview.particle_effects
    }

    /// When this snapshot was produced.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Version of the producer, if the snapshot carried one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Looks up an item definition by defindex.
    pub fn item_by_defindex(&self, defindex: u32) -> Option<&SchemaItem> {
        bounded_binary_search(self.items(), |item| item.defindex, defindex)
    }

    /// Looks up an item definition by display base name. First match wins;
    /// name collisions are not deduplicated at this layer.
    pub fn item_by_name(&self, item_name: &str) -> Option<&SchemaItem> {
        self.items().iter().find(|item| item.item_name == item_name)
    }

    /// Looks up an attribute definition by defindex.
    pub fn attribute_by_defindex(&self, defindex: u32) -> Option<&SchemaAttribute> {
        bounded_binary_search(self.attributes(), |attribute| attribute.defindex, defindex)
    }

    /// Resolves a quality id to its display name.
    pub fn quality_name_by_id(&self, id: u32) -> Option<&str> {
        let overview = &self.raw.schema.overview;
        overview
            .qualities
            .iter()
            .find(|(_, quality_id)| **quality_id == id)
            .and_then(|(token, _)| overview.quality_names.get(token))
            .map(String::as_str)
    }

    /// Resolves a quality display name to its id.
    pub fn quality_id_by_name(&self, name: &str) -> Option<u32> {
        let overview = &self.raw.schema.overview;
        overview
            .quality_names
            .iter()
            .find(|(_, quality_name)| quality_name.as_str() == name)
            .and_then(|(token, _)| overview.qualities.get(token))
            .copied()
    }

    /// Resolves a particle effect id to its name.
    pub fn effect_name_by_id(&self, id: u32) -> Option<&str> {
        bounded_binary_search(self.particle_effects(), |effect| effect.id, id)
            .map(|effect| effect.name.as_str())
    }

    /// Resolves a particle effect name to its id.
    pub fn effect_id_by_name(&self, name: &str) -> Option<u32> {
        self.particle_effects()
            .iter()
            .find(|effect| effect.name == name)
            .map(|effect| effect.id)
    }

    /// Resolves a paintkit id to its name.
    pub fn paintkit_name_by_id(&self, id: u32) -> Option<&str> {
        self.raw.schema.paintkits.get(&id).map(String::as_str)
    }

    /// Resolves a paintkit name to its id.
    pub fn paintkit_id_by_name(&self, name: &str) -> Option<u32> {
        self.raw
            .schema
            .paintkits
            .iter()
            .find(|(_, paintkit_name)| paintkit_name.as_str() == name)
            .map(|(id, _)| *id)
    }
}

/// Binary search over a collection that is sorted ascending by contract.
///
/// The comparison budget is `ceil(log2(n)) + 2`; if the key is not located
/// within it (the collection was unsorted, or the estimate was off), the
/// whole collection is scanned before concluding "not found".
fn bounded_binary_search<T>(records: &[T], key: impl Fn(&T) -> u32, target: u32) -> Option<&T> {
    if records.is_empty() {
        return None;
    }

    let mut low = 0_isize;
    let mut high = records.len() as isize - 1;
    let mut budget = (records.len() as f64).log2().ceil() as u32 + 2;

    while low <= high {
        if budget == 0 {
            break;
        }
        budget -= 1;

        let mid = ((low + high) / 2) as usize;
        match key(&records[mid]).cmp(&target) {
            std::cmp::Ordering::Less => low = mid as isize + 1,
            std::cmp::Ordering::Greater => high = mid as isize - 1,
            std::cmp::Ordering::Equal => return Some(&records[mid]),
        }
    }

    records.iter().find(|record| key(record) == target)
}
