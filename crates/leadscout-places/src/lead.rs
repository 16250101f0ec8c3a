use serde::{Deserialize, Serialize};

use crate::social::extract_social_links;
use crate::types::PlaceRecord;

/// Placeholder for any field the places API did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column order of a lead row, as appended to the sheet.
pub const COLUMNS: [&str; 14] = [
    "name",
    "address",
    "google_maps_url",
    "business_type",
    "rating",
    "phone_number",
    "website",
    "facebook",
    "instagram",
    "twitter",
    "linkedin",
    "tiktok",
    "opening_hours",
    "place_id",
];

/// A flattened, enriched business ready for the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessLead {
    pub name: String,
    pub address: String,
    #[serde(rename = "google_maps_url")]
    pub maps_url: String,
    /// The industry the user searched for, never the synonym that matched.
    pub business_type: String,
    pub rating: String,
    pub phone_number: String,
    pub website: String,
    pub facebook: String,
    pub instagram: String,
    pub twitter: String,
    pub linkedin: String,
    pub tiktok: String,
    pub opening_hours: String,
    pub place_id: String,
}

impl BusinessLead {
    #[must_use]
    pub fn from_place(place: PlaceRecord, industry: &str) -> Self {
        let social = place
            .website
            .as_deref()
            .map(extract_social_links)
            .unwrap_or_default();
        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_owned());

        let maps_url = place
            .url
            .unwrap_or_else(|| fallback_maps_url(&place.place_id));
        let opening_hours = place
            .opening_hours
            .map(|hours| hours.weekday_text.join(", "))
            .filter(|joined| !joined.is_empty());

        Self {
            name: or_na(place.name),
            address: or_na(place.formatted_address),
            maps_url,
            business_type: industry.to_owned(),
            rating: or_na(place.rating.map(|r| r.to_string())),
            phone_number: or_na(place.formatted_phone_number),
            website: or_na(place.website),
            facebook: or_na(social.facebook),
            instagram: or_na(social.instagram),
            twitter: or_na(social.twitter),
            linkedin: or_na(social.linkedin),
            tiktok: or_na(social.tiktok),
            opening_hours: or_na(opening_hours),
            place_id: place.place_id,
        }
    }

    /// Cell values in [`COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.maps_url.clone(),
            self.business_type.clone(),
            self.rating.clone(),
            self.phone_number.clone(),
            self.website.clone(),
            self.facebook.clone(),
            self.instagram.clone(),
            self.twitter.clone(),
            self.linkedin.clone(),
            self.tiktok.clone(),
            self.opening_hours.clone(),
            self.place_id.clone(),
        ]
    }
}

fn fallback_maps_url(place_id: &str) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{place_id}")
}
