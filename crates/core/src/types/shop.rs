//! Shop (boutique) types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::geo::Coordinates;
use super::id::{Identified, ShopId};

/// Kind of shop as tagged by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShopType {
    Premium,
    #[default]
    Standard,
    /// Any tag this client does not know about.
    #[serde(untagged)]
    Other(String),
}

impl ShopType {
    /// Map the backend's free-form tag onto a known variant.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "premium" => Self::Premium,
            "" | "standard" => Self::Standard,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A shop near the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub logo_url: Option<String>,
    pub description: String,
    pub city: String,
    pub country: String,
    /// Latitude in decimal degrees, as sent by the backend.
    pub latitude: String,
    /// Longitude in decimal degrees, as sent by the backend.
    pub longitude: String,
    pub shop_type: ShopType,
    /// Distance from the user's position in kilometers. `NaN` when the shop's
    /// coordinates cannot be parsed. Not persisted: it depends on where the
    /// user is when the list is shown.
    #[serde(skip, default = "unknown_distance")]
    pub distance_km: f64,
    pub verified: Option<bool>,
}

const fn unknown_distance() -> f64 {
    f64::NAN
}

impl Shop {
    /// The shop's position, parsed from its string coordinates.
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::from_strings(&self.latitude, &self.longitude)
    }

    /// Recompute `distance_km` relative to `origin`.
    pub fn update_distance(&mut self, origin: &Coordinates) {
        self.distance_km = origin.distance_to(&self.coordinates());
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false)
    }
}

impl Identified for Shop {
    type Id = ShopId;

    fn id(&self) -> &ShopId {
        &self.id
    }
}

/// Sort shops nearest first. Shops with an unknown (`NaN`) distance go last.
pub fn sort_by_distance(shops: &mut [Shop]) {
    shops.sort_by(|a, b| match (a.distance_km.is_nan(), b.distance_km.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.distance_km.total_cmp(&b.distance_km),
    });
}

/// Filter shops by name or city, ignoring case. A blank query keeps all shops.
#[must_use]
pub fn filter_shops<'a>(shops: &'a [Shop], query: &str) -> Vec<&'a Shop> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return shops.iter().collect();
    }
    shops
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle) || s.city.to_lowercase().contains(&needle)
        })
        .collect()
}
