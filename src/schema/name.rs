//! Display-name synthesis
//!
//! Builds the canonical human-readable name for one concrete item instance
//! from its base definition plus the instance modifiers. The token order is
//! load-bearing: other schema consumers parse these names back, so every
//! rule here (including the output-quality prepend) must stay byte-stable.

use serde::{Deserialize, Serialize};

use super::Schema;

const QUALITY_UNUSUAL: u32 = 5;
const QUALITY_UNIQUE: u32 = 6;
const QUALITY_DECORATED: u32 = 15;

const KILLSTREAK_TIERS: [&str; 3] = [
    "Killstreak",
    "Specialized Killstreak",
    "Professional Killstreak",
];

const WEAR_TIERS: [&str; 5] = [
    "Factory New",
    "Minimal Wear",
    "Field-Tested",
    "Well-Worn",
    "Battle Scarred",
];

/// The modifiers describing one concrete item instance.
///
/// `tradable` and `craftable` are tri-state: only an explicit `false`
/// contributes a token. Flags where only `true` matters are plain bools.
/// Every id is `Some` when the modifier is present; the caller contract
/// requires present ids to resolve against the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameAttributes {
    pub defindex: u32,
    pub quality: u32,

    /// Elevated secondary quality (e.g. Strange on an Unusual).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevated_quality: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craftable: Option<bool>,

    /// Killstreak tier, 1..=3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killstreak: Option<u32>,

    #[serde(default)]
    pub australium: bool,

    #[serde(default)]
    pub festivized: bool,

    /// Unusual particle effect id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paintkit: Option<u32>,

    /// Wear tier, 1..=5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear: Option<u32>,

    /// Recipe target item (e.g. the weapon a kit applies to).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,

    /// Recipe output item (e.g. what a fabricator produces).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crate_series: Option<u32>,
}

impl Schema {
    /// Synthesizes the display name for an item instance.
    ///
    /// Returns `None` when the base defindex does not resolve, or when a
    /// supplied modifier id cannot be resolved against this schema (the
    /// caller contract requires valid ids, so `None` there means the query
    /// and the snapshot disagree).
    ///
    /// `proper` controls the "The " prefix for otherwise-unmodified items
    /// whose definition carries the `proper_name` flag.
    pub fn display_name(&self, attributes: &NameAttributes, proper: bool) -> Option<String> {
        let item = self.item_by_defindex(attributes.defindex)?;

        let mut name = String::new();

        if attributes.tradable == Some(false) {
            name.push_str("Non-Tradable ");
        }

        if attributes.craftable == Some(false) {
            name.push_str("Non-Craftable ");
        }

        if let Some(elevated) = attributes.elevated_quality {
            name.push_str(self.quality_name_by_id(elevated)?);
            name.push(' ');
        }

        // Unique, Unusual, and Decorated Weapon normally suppress the
        // quality prefix. An Unusual without an effect still shows it, as
        // does any item whose intrinsic quality is Unusual.
        let suppressed = matches!(
            attributes.quality,
            QUALITY_UNIQUE | QUALITY_UNUSUAL | QUALITY_DECORATED
        );
        if !suppressed
            || (attributes.quality == QUALITY_UNUSUAL && attributes.effect.is_none())
            || item.item_quality == QUALITY_UNUSUAL
        {
            name.push_str(self.quality_name_by_id(attributes.quality)?);
            name.push(' ');
        }

        if attributes.festivized {
            name.push_str("Festivized ");
        }

        if let Some(effect) = attributes.effect {
            name.push_str(self.effect_name_by_id(effect)?);
            name.push(' ');
        }

        if let Some(tier) = attributes.killstreak {
            if tier > 0 {
                name.push_str(KILLSTREAK_TIERS.get(tier as usize - 1)?);
                name.push(' ');
            }
        }

        if let Some(target) = attributes.target {
            name.push_str(&self.item_by_defindex(target)?.item_name);
            name.push(' ');
        }

        // The output quality goes in front of everything accumulated so
        // far, not at the cursor.
        if let Some(output_quality) = attributes.output_quality {
            if output_quality != QUALITY_UNIQUE {
                name = format!("{} {}", self.quality_name_by_id(output_quality)?, name);
            }
        }

        if let Some(output) = attributes.output {
            name.push_str(&self.item_by_defindex(output)?.item_name);
            name.push(' ');
        }

        if attributes.australium {
            name.push_str("Australium ");
        }

        if let Some(paintkit) = attributes.paintkit {
            name.push_str(self.paintkit_name_by_id(paintkit)?);
            name.push(' ');
        }

        if proper && name.is_empty() && item.proper_name {
            name.push_str("The ");
        }

        name.push_str(&item.item_name);

        if let Some(wear) = attributes.wear {
            let label = wear
                .checked_sub(1)
                .and_then(|index| WEAR_TIERS.get(index as usize))?;
            name.push_str(&format!(" ({label})"));
        }

        if let Some(series) = attributes.crate_series {
            name.push_str(&format!(" #{series}"));
        }

        Some(name)
    }
}
