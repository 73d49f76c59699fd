//! Steam Web API and SteamDatabase game-tracking backends
//!
//! The Web API endpoints wrap their payload in a `result` envelope whose
//! `status` field is dropped on the way in. The two game-tracking files are
//! Valve KeyValues text; `items_game.txt` is converted to a JSON-shaped
//! blob verbatim, while the protodef file is filtered down to the paintkit
//! tokens.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use keyvalues_parser::{Obj, Value as VdfValue, Vdf};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::{ItemsPage, SchemaOverview};

use super::SchemaFetcher;

const OVERVIEW_URL: &str =
    "https://api.steampowered.com/IEconItems_440/GetSchemaOverview/v0001/";
const ITEMS_URL: &str = "https://api.steampowered.com/IEconItems_440/GetSchemaItems/v0001/";
const PAINTKITS_URL: &str = "https://raw.githubusercontent.com/SteamDatabase/GameTracking-TF2/master/tf/resource/tf_proto_obj_defs_english.txt";
const ITEMS_GAME_URL: &str = "https://raw.githubusercontent.com/SteamDatabase/GameTracking-TF2/master/tf/scripts/items/items_game.txt";

const LANGUAGE: &str = "English";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Protodef tokens of this type describe paintkits.
const PAINTKIT_PROTODEF_TYPE: &str = "9";

/// Web API responses wrap the payload in a `result` object.
#[derive(Deserialize)]
struct WebApiEnvelope<T> {
    result: T,
}

/// Production fetcher backed by the Steam Web API and the SteamDatabase
/// GameTracking-TF2 repository.
pub struct SteamFetcher {
    client: reqwest::Client,
}

impl SteamFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tf2-schema/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SchemaError::Client)?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| SchemaError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SchemaError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SchemaError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_api<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let envelope: WebApiEnvelope<T> = self
            .get(url, query)
            .await?
            .json()
            .await
            .map_err(|source| SchemaError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(envelope.result)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.get(url, &[])
            .await?
            .text()
            .await
            .map_err(|source| SchemaError::Transport {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl SchemaFetcher for SteamFetcher {
    async fn fetch_overview(&self, api_key: &str) -> Result<SchemaOverview> {
        self.get_api(OVERVIEW_URL, &[("key", api_key), ("language", LANGUAGE)])
            .await
    }

    async fn fetch_items_page(&self, api_key: &str, start: u32) -> Result<ItemsPage> {
        let start = start.to_string();
        self.get_api(
            ITEMS_URL,
            &[("key", api_key), ("language", LANGUAGE), ("start", &start)],
        )
        .await
    }

    async fn fetch_paintkits(&self) -> Result<BTreeMap<u32, String>> {
        let text = self.get_text(PAINTKITS_URL).await?;
        parse_paintkits(&text, PAINTKITS_URL)
    }

    async fn fetch_items_game(&self) -> Result<Value> {
        let text = self.get_text(ITEMS_GAME_URL).await?;
        let vdf = Vdf::parse(&text).map_err(|source| SchemaError::Vdf {
            url: ITEMS_GAME_URL.to_string(),
            source,
        })?;

        Ok(vdf_to_json(&vdf.value))
    }
}

/// Extracts the paintkit id -> name mapping from the protodef language
/// tokens.
///
/// Paintkit tokens look like `"9_101_protodef ..." "Forest Fire"`: the part
/// of the key before the first space must split on `_` into exactly
/// (type, id, field), with the paintkit type tag. Placeholder entries whose
/// value starts with `"<id>:"` are skipped; duplicate ids collapse
/// last-wins.
fn parse_paintkits(text: &str, url: &str) -> Result<BTreeMap<u32, String>> {
    let vdf = Vdf::parse(text).map_err(|source| SchemaError::Vdf {
        url: url.to_string(),
        source,
    })?;

    let mut paintkits = BTreeMap::new();

    let Some(tokens) = lang_tokens(&vdf) else {
        debug!("protodef file has no lang.Tokens section");
        return Ok(paintkits);
    };

    for (key, values) in tokens.iter() {
        let Some(VdfValue::Str(name)) = values.first() else {
            continue;
        };

        let head = key.split(' ').next().unwrap_or_default();
        let parts: Vec<&str> = head.split('_').collect();
        if parts.len() != 3 || parts[0] != PAINTKIT_PROTODEF_TYPE {
            continue;
        }
        let Ok(id) = parts[1].parse::<u32>() else {
            continue;
        };
        if name.starts_with(&format!("{}:", parts[1])) {
            continue;
        }

        paintkits.insert(id, name.to_string());
    }

    Ok(paintkits)
}

fn lang_tokens<'a>(vdf: &'a Vdf<'a>) -> Option<&'a Obj<'a>> {
    let VdfValue::Obj(lang) = &vdf.value else {
        return None;
    };

    match lang.get("Tokens")?.first()? {
        VdfValue::Obj(tokens) => Some(tokens),
        VdfValue::Str(_) => None,
    }
}

/// Converts a parsed KeyValues tree into JSON. KeyValues allows repeated
/// keys; a key that occurs once maps to its value directly, repeats map to
/// an array, preserving order.
fn vdf_to_json(value: &VdfValue<'_>) -> Value {
    match value {
        VdfValue::Str(s) => Value::String(s.to_string()),
        VdfValue::Obj(obj) => {
            let mut map = serde_json::Map::new();
            for (key, values) in obj.iter() {
                let mut converted: Vec<Value> = values.iter().map(vdf_to_json).collect();
                let entry = if converted.len() == 1 {
                    converted.remove(0)
                } else {
                    Value::Array(converted)
                };
                map.insert(key.to_string(), entry);
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROTODEFS: &str = r#"
"lang"
{
    "Language"  "English"
    "Tokens"
    {
        "9_0_field (some note)"   "Red Rock Roscoe"
        "9_102_field"             "Stabbed to Hell"
        "9_103_field"             "103: unused placeholder"
        "8_5_field"               "Not a paintkit"
        "9_oops_field"            "Unparseable id"
        "9_0_other"               "Red Rock Roscoe Mk.II"
        "stray"                   "No underscores here"
    }
}
"#;

    #[test]
    fn paintkit_tokens_are_filtered_and_last_wins() {
        let paintkits = parse_paintkits(PROTODEFS, "test").unwrap();

        assert_eq!(paintkits.get(&102).map(String::as_str), Some("Stabbed to Hell"));
        // Placeholder "<id>:" values and non-paintkit types are skipped.
        assert!(!paintkits.contains_key(&103));
        assert!(!paintkits.contains_key(&5));
        // Duplicate ids collapse to the last token seen.
        assert_eq!(
            paintkits.get(&0).map(String::as_str),
            Some("Red Rock Roscoe Mk.II")
        );
        assert_eq!(paintkits.len(), 2);
    }

    #[test]
    fn missing_tokens_section_yields_an_empty_mapping() {
        let paintkits = parse_paintkits("\"lang\"\n{\n}\n", "test").unwrap();
        assert!(paintkits.is_empty());
    }

    #[test]
    fn unparseable_protodefs_are_a_vdf_error() {
        let err = parse_paintkits("not keyvalues at all", "test").unwrap_err();
        assert!(matches!(err, SchemaError::Vdf { .. }));
    }

    #[test]
    fn keyvalues_convert_to_json_with_repeats_as_arrays() {
        let vdf = Vdf::parse(
            r#"
"items_game"
{
    "game_info"
    {
        "first_valid_item_slot"  "0"
    }
    "prefab"    "one"
    "prefab"    "two"
}
"#,
        )
        .unwrap();

        let json = vdf_to_json(&vdf.value);
        assert_eq!(json["game_info"]["first_valid_item_slot"], "0");
        assert_eq!(json["prefab"], serde_json::json!(["one", "two"]));
    }
}
