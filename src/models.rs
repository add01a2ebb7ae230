use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder stored whenever the expected markup is missing.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub status: String,
    #[serde(rename = "type")]
    pub listing_type: String,
    pub location: String,
    pub room_types: String,
    pub area: String,
    pub tags: String,
    pub price: String,
    pub price_unit: String,
    pub total_price: String,
    pub latest_open_date: String,
    pub house_types: Vec<UnitType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_fee: Option<String>,
}

impl Listing {
    /// A listing with every textual field set to the sentinel.
    pub fn unavailable() -> Self {
        Self {
            name: not_available(),
            status: not_available(),
            listing_type: not_available(),
            location: not_available(),
            room_types: not_available(),
            area: not_available(),
            tags: not_available(),
            price: not_available(),
            price_unit: not_available(),
            total_price: not_available(),
            latest_open_date: not_available(),
            house_types: Vec::new(),
            green_ratio: None,
            plot_ratio: None,
            property_fee: None,
        }
    }

    pub fn apply_details(&mut self, details: ListingDetails) {
        self.latest_open_date = details.latest_open_date;
        self.house_types = details.house_types;
        self.green_ratio = details.building.green_ratio;
        self.plot_ratio = details.building.plot_ratio;
        self.property_fee = details.building.property_fee;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    pub area: String,
    pub price: String,
    pub image_url: String,
    // Outer None: no download attempted. Some(None): download failed.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_image: Option<Option<String>>,
}

impl UnitType {
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty() && self.image_url != NOT_AVAILABLE
    }
}

// A key that is present (even as null) deserializes to Some, so null survives a round-trip.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Everything a detail page (and its optional secondary info page) contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetails {
    pub latest_open_date: String,
    pub house_types: Vec<UnitType>,
    pub building: BuildingInfo,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingInfo {
    pub green_ratio: Option<String>,
    pub plot_ratio: Option<String>,
    pub property_fee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub scrape_time: String,
    pub loupans: Vec<Listing>,
}
