use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a tracked item.
///
/// Automation only ever moves `Tracking → Found`. `Cancelled` is set by the
/// user and is never left automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    #[default]
    Tracking,
    Found,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatTrak {
    Required,
    #[serde(rename = "none")]
    Excluded,
    #[default]
    Any,
}

/// Exterior presets, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WearPreset {
    Fn,
    Mw,
    Ft,
    Ww,
    Bs,
}

impl WearPreset {
    pub const ALL: [WearPreset; 5] = [
        WearPreset::Fn,
        WearPreset::Mw,
        WearPreset::Ft,
        WearPreset::Ww,
        WearPreset::Bs,
    ];

    /// Phrase as it appears in catalog names.
    pub fn phrase(&self) -> &'static str {
        match self {
            WearPreset::Fn => "Factory New",
            WearPreset::Mw => "Minimal Wear",
            WearPreset::Ft => "Field-Tested",
            WearPreset::Ww => "Well-Worn",
            WearPreset::Bs => "Battle-Scarred",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            WearPreset::Fn => "fn",
            WearPreset::Mw => "mw",
            WearPreset::Ft => "ft",
            WearPreset::Ww => "ww",
            WearPreset::Bs => "bs",
        }
    }
}

impl fmt::Display for WearPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

impl FromStr for WearPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WearPreset::ALL
            .into_iter()
            .find(|w| w.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown wear preset: {}", s))
    }
}

impl FromStr for StatTrak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(StatTrak::Required),
            "none" => Ok(StatTrak::Excluded),
            "any" => Ok(StatTrak::Any),
            _ => Err(format!("unknown stattrak requirement: {}", s)),
        }
    }
}

/// Wear requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum WearFilter {
    #[default]
    Any,
    /// A preset without a code accepts any wear.
    Preset(Option<WearPreset>),
    /// Float range. The catalog has no float values, so this accepts
    /// everything; the bounds are kept for storage round-trips.
    Custom {
        min_float: Option<f64>,
        max_float: Option<f64>,
    },
}

/// What the user wants, plus where it stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrackedItemRecord", into = "TrackedItemRecord")]
pub struct TrackedItem {
    pub id: String,
    pub weapon_name: String,
    pub skin_name: String,
    pub stattrak: StatTrak,
    pub wear: WearFilter,
    /// Display-currency bounds; zero means unset.
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub status: TrackStatus,
    pub date_added: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl TrackedItem {
    pub fn new(
        id: impl Into<String>,
        weapon_name: impl Into<String>,
        skin_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            weapon_name: weapon_name.into(),
            skin_name: skin_name.into(),
            stattrak: StatTrak::Any,
            wear: WearFilter::Any,
            min_price: None,
            max_price: None,
            status: TrackStatus::Tracking,
            date_added: Some(Utc::now()),
            notes: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != TrackStatus::Cancelled
    }

    /// Apply a reconciliation result. Only `Tracking` moves, and only when
    /// there is at least one match. Returns true if the status changed.
    pub fn observe_matches(&mut self, match_count: usize) -> bool {
        if self.status == TrackStatus::Tracking && match_count > 0 {
            self.status = TrackStatus::Found;
            return true;
        }
        false
    }
}

/// Flat on-disk shape. Field names follow the stored JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackedItemRecord {
    #[serde(alias = "skinId")]
    id: String,
    #[serde(default)]
    weapon_name: String,
    #[serde(default)]
    skin_name: String,
    #[serde(default)]
    stattrak: StatTrak,
    #[serde(default)]
    wear_type: WearKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preset_wear: Option<WearPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_float: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_float: Option<f64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    min_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    max_price: Option<Decimal>,
    #[serde(default)]
    status: TrackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WearKind {
    #[default]
    Any,
    Preset,
    Custom,
}

impl From<TrackedItemRecord> for TrackedItem {
    fn from(r: TrackedItemRecord) -> Self {
        let wear = match r.wear_type {
            WearKind::Any => WearFilter::Any,
            WearKind::Preset => WearFilter::Preset(r.preset_wear),
            WearKind::Custom => WearFilter::Custom {
                min_float: r.min_float,
                max_float: r.max_float,
            },
        };
        Self {
            id: r.id,
            weapon_name: r.weapon_name,
            skin_name: r.skin_name,
            stattrak: r.stattrak,
            wear,
            min_price: r.min_price,
            max_price: r.max_price,
            status: r.status,
            date_added: r.date_added,
            notes: r.notes,
        }
    }
}

impl From<TrackedItem> for TrackedItemRecord {
    fn from(item: TrackedItem) -> Self {
        let (wear_type, preset_wear, min_float, max_float) = match item.wear {
            WearFilter::Any => (WearKind::Any, None, None, None),
            WearFilter::Preset(p) => (WearKind::Preset, p, None, None),
            WearFilter::Custom {
                min_float,
                max_float,
            } => (WearKind::Custom, None, min_float, max_float),
        };
        Self {
            id: item.id,
            weapon_name: item.weapon_name,
            skin_name: item.skin_name,
            stattrak: item.stattrak,
            wear_type,
            preset_wear,
            min_float,
            max_float,
            min_price: item.min_price,
            max_price: item.max_price,
            status: item.status,
            date_added: item.date_added,
            notes: item.notes,
        }
    }
}

/// Totals per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub tracking: usize,
    pub found: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a TrackedItem>) -> Self {
        let mut counts = Self::default();
        for item in items {
            counts.total += 1;
            match item.status {
                TrackStatus::Tracking => counts.tracking += 1,
                TrackStatus::Found => counts.found += 1,
                TrackStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}
