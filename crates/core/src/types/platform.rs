//! Marketplace platforms an item can be listed on.
//!
//! The list is user-editable: entries can be renamed, recolored, toggled,
//! added, removed and reordered. Items reference platforms only by name, as a
//! comma-joined display string (see [`split_platforms`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from editing the platform list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("platform not found: {0}")]
    NotFound(String),

    #[error("invalid platform name: {0}")]
    InvalidName(String),

    #[error("invalid platform color '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("reorder must list every platform id exactly once")]
    NotAPermutation,
}

/// Icon shown next to a platform.
///
/// Unknown icon names resolve to [`PlatformIcon::Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum PlatformIcon {
    ShoppingBag,
    Package,
    Heart,
    Shirt,
    Tag,
    Users,
    Sparkles,
    MessageCircle,
    #[default]
    Store,
}

const ICONS: [(&str, PlatformIcon); 9] = [
    ("ShoppingBag", PlatformIcon::ShoppingBag),
    ("Package", PlatformIcon::Package),
    ("Heart", PlatformIcon::Heart),
    ("Shirt", PlatformIcon::Shirt),
    ("Tag", PlatformIcon::Tag),
    ("Users", PlatformIcon::Users),
    ("Sparkles", PlatformIcon::Sparkles),
    ("MessageCircle", PlatformIcon::MessageCircle),
    ("Store", PlatformIcon::Store),
];

impl PlatformIcon {
    /// Resolve an icon by name, falling back to `Store`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        ICONS
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(Self::Store, |(_, icon)| *icon)
    }

    /// Icon name as stored and sent to clients.
    #[must_use]
    pub fn name(self) -> &'static str {
        ICONS
            .iter()
            .find(|(_, icon)| *icon == self)
            .map_or("Store", |(n, _)| n)
    }
}

impl From<String> for PlatformIcon {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<PlatformIcon> for &'static str {
    fn from(icon: PlatformIcon) -> Self {
        icon.name()
    }
}

/// One marketplace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub icon: PlatformIcon,
    /// `#RRGGBB`.
    pub color: String,
    pub enabled: bool,
}

/// Partial update for a platform. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<PlatformIcon>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Request to add a platform. Absent fields take the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<PlatformIcon>,
    #[serde(default)]
    pub color: Option<String>,
}

pub const DEFAULT_PLATFORM_NAME: &str = "New Platform";
pub const DEFAULT_PLATFORM_COLOR: &str = "#6366F1";

/// Ordered platform list with validated edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformList(Vec<Platform>);

impl Default for PlatformList {
    fn default() -> Self {
        Self(default_platforms())
    }
}

impl PlatformList {
    #[must_use]
    pub const fn new(platforms: Vec<Platform>) -> Self {
        Self(platforms)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Platform] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Platform> {
        self.0.iter().find(|p| p.id == id)
    }

    /// Names of the enabled platforms, in list order.
    #[must_use]
    pub fn enabled_names(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Apply `changes` to the platform with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `InvalidName`/`InvalidColor` if
    /// the new values fail validation. The list is unchanged on error.
    pub fn update(&mut self, id: &str, changes: PlatformChanges) -> Result<&Platform, PlatformError> {
        if let Some(name) = &changes.name {
            validate_name(name)?;
        }
        if let Some(color) = &changes.color {
            validate_color(color)?;
        }

        let platform = self
            .0
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PlatformError::NotFound(id.to_string()))?;

        if let Some(name) = changes.name {
            platform.name = name;
        }
        if let Some(icon) = changes.icon {
            platform.icon = icon;
        }
        if let Some(color) = changes.color {
            platform.color = color;
        }
        if let Some(enabled) = changes.enabled {
            platform.enabled = enabled;
        }
        Ok(platform)
    }

    /// Append a new, enabled platform with id `custom_<now_millis>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName`/`InvalidColor` if the draft fails validation.
    pub fn add(&mut self, draft: PlatformDraft, now_millis: i64) -> Result<&Platform, PlatformError> {
        let name = draft
            .name
            .unwrap_or_else(|| DEFAULT_PLATFORM_NAME.to_string());
        let color = draft
            .color
            .unwrap_or_else(|| DEFAULT_PLATFORM_COLOR.to_string());
        validate_name(&name)?;
        validate_color(&color)?;

        // Two adds within the same millisecond would otherwise collide.
        let mut stamp = now_millis;
        while self.get(&format!("custom_{stamp}")).is_some() {
            stamp += 1;
        }

        self.0.push(Platform {
            id: format!("custom_{stamp}"),
            name,
            icon: draft.icon.unwrap_or_default(),
            color,
            enabled: true,
        });
        self.0
            .last()
            .ok_or_else(|| PlatformError::NotFound(format!("custom_{stamp}")))
    }

    /// Remove and return the platform with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn remove(&mut self, id: &str) -> Result<Platform, PlatformError> {
        let index = self
            .0
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PlatformError::NotFound(id.to_string()))?;
        Ok(self.0.remove(index))
    }

    /// Reorder the list to follow `ids`.
    ///
    /// # Errors
    ///
    /// Returns `NotAPermutation` unless `ids` names every current platform
    /// exactly once.
    pub fn reorder(&mut self, ids: &[String]) -> Result<(), PlatformError> {
        let mut positions = Vec::with_capacity(ids.len());
        for id in ids {
            let index = self
                .0
                .iter()
                .position(|p| &p.id == id)
                .ok_or(PlatformError::NotAPermutation)?;
            if positions.contains(&index) {
                return Err(PlatformError::NotAPermutation);
            }
            positions.push(index);
        }
        if positions.len() != self.0.len() {
            return Err(PlatformError::NotAPermutation);
        }

        let mut slots: Vec<Option<Platform>> = std::mem::take(&mut self.0).into_iter().map(Some).collect();
        self.0 = positions
            .into_iter()
            .filter_map(|index| slots.get_mut(index).and_then(Option::take))
            .collect();
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), PlatformError> {
    if name.trim().is_empty() || name.contains(',') {
        return Err(PlatformError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), PlatformError> {
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(PlatformError::InvalidColor(color.to_string()))
    }
}

/// The marketplaces every new installation starts with.
#[must_use]
pub fn default_platforms() -> Vec<Platform> {
    [
        ("ebay", "eBay", PlatformIcon::ShoppingBag, "#E53238"),
        ("amazon", "Amazon", PlatformIcon::Package, "#FF9900"),
        ("etsy", "Etsy", PlatformIcon::Heart, "#F56400"),
        ("poshmark", "Poshmark", PlatformIcon::Shirt, "#7F0353"),
        ("mercari", "Mercari", PlatformIcon::Tag, "#FF0211"),
        ("facebook", "Facebook", PlatformIcon::Users, "#1877F2"),
        ("depop", "Depop", PlatformIcon::Sparkles, "#FF2300"),
        ("offerup", "OfferUp", PlatformIcon::MessageCircle, "#00AB80"),
    ]
    .into_iter()
    .map(|(id, name, icon, color)| Platform {
        id: id.to_string(),
        name: name.to_string(),
        icon,
        color: color.to_string(),
        enabled: true,
    })
    .collect()
}

/// Split an item's platform string into names: split on `,`, trim, drop empties.
#[must_use]
pub fn split_platforms(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Join platform names into an item's platform string.
#[must_use]
pub fn join_platforms<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
