//! Wire and snapshot data model for the TF2 item schema
//!
//! Typed fields carry only what the lookup logic reads; everything else the
//! Steam Web API returns passes through `#[serde(flatten)]` maps verbatim so
//! a snapshot can be serialized back without loss.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One item definition from `GetSchemaItems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaItem {
    pub defindex: u32,

    /// Internal name, e.g. `TF_WEAPON_BAT`.
    #[serde(default)]
    pub name: String,

    /// Display base name, e.g. `Bat`.
    #[serde(default)]
    pub item_name: String,

    /// Intrinsic quality id of the definition.
    #[serde(default)]
    pub item_quality: u32,

    /// Whether the display name takes a "The " prefix when unmodified.
    #[serde(default)]
    pub proper_name: bool,

    /// Everything else the endpoint returns (slots, images, capabilities,
    /// crafting classes, ...), uninterpreted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One attribute definition from the schema overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaAttribute {
    pub defindex: u32,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_format: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One unusual particle effect, from
/// `attribute_controlled_attached_particles` in the overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleEffect {
    pub id: u32,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The `GetSchemaOverview` result: quality maps, attributes, particle
/// effects, plus a passthrough of the rest (item sets, levels, kill-eater
/// score types, `items_game_url`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaOverview {
    /// Quality token -> id, e.g. `"Unique" -> 6`.
    #[serde(default)]
    pub qualities: HashMap<String, u32>,

    /// Quality token -> display name, e.g. `"Unique" -> "Unique"`.
    #[serde(default, rename = "qualityNames")]
    pub quality_names: HashMap<String, String>,

    #[serde(default)]
    pub attributes: Vec<SchemaAttribute>,

    #[serde(default, rename = "attribute_controlled_attached_particles")]
    pub particle_effects: Vec<ParticleEffect>,

    /// The Web API result status; dropped on re-serialization, matching the
    /// snapshot shape produced upstream.
    #[serde(default, skip_serializing)]
    pub status: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// The `schema` section of a raw snapshot: the overview merged with the
/// paginated item list and the paintkit definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(flatten)]
    pub overview: SchemaOverview,

    #[serde(default)]
    pub items: Vec<SchemaItem>,

    /// Paintkit id -> name. Ids are not contiguous. Serialized with string
    /// keys (the JSON object shape the other schema consumers expect).
    #[serde(default, with = "string_key_map")]
    pub paintkits: BTreeMap<u32, String>,
}

/// A complete raw dataset: the merged schema section plus the opaque
/// `items_game` blob, which is stored and re-serialized uninterpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    pub schema: SchemaSection,

    #[serde(default)]
    pub items_game: Value,
}

/// One page of `GetSchemaItems`. The caller follows `next` until it is
/// absent, concatenating `items` in page order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<SchemaItem>,

    #[serde(default)]
    pub next: Option<u32>,
}

/// Serializable view of a schema snapshot, for external callers that want
/// to persist and later re-seed a schema. Not used internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// When the snapshot was produced, as epoch milliseconds.
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,

    /// Version of the producer, checked against the running crate's major
    /// version when the snapshot is installed post-bootstrap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub raw: RawSchema,
}

/// Integer-keyed maps serialized as JSON objects with string keys.
///
/// Needed explicitly because `SchemaSection` contains a flattened field:
/// serde routes the whole struct through its buffering deserializer, which
/// does not apply serde_json's integer-map-key handling.
mod string_key_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<u32, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(id, name)| (id.to_string(), name)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u32, String>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(id, name)| {
                id.parse::<u32>()
                    .map(|id| (id, name))
                    .map_err(|_| D::Error::custom(format!("non-numeric paintkit id {id:?}")))
            })
            .collect()
    }
}
