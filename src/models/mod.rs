use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default. Combined with `#[serde(default)]` this also covers
/// fields that are missing entirely.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a whole-number field that the backend may send as an
/// integer, a float (`5500000.0`), a numeric string, or `null`. Floats are
/// truncated toward zero; anything unusable becomes the default.
fn lenient_integer<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + TryFrom<i64>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };
    Ok(number
        .and_then(|n| T::try_from(n).ok())
        .unwrap_or_default())
}

/// Deserialize a backend enum, mapping `null` and values this client does
/// not know to the enum's default variant.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + FromStr,
    T::Err: fmt::Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s.parse().unwrap_or_else(|err| {
            debug!("{}, using default", err);
            T::default()
        })),
        _ => Ok(T::default()),
    }
}

/// Error returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a backend enum together with its SCREAMING_SNAKE_CASE wire
/// names, a default variant, and `FromStr`/`Display` impls.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) default $default:ident {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Kind of property being listed
    PropertyType("property type") default Residential {
        Residential => "RESIDENTIAL",
        Commercial => "COMMERCIAL",
        NewDevelopment => "NEW_DEVELOPMENT",
        Agriculture => "AGRICULTURE",
    }
}

wire_enum! {
    /// How the property is offered
    ListingType("listing type") default Sale {
        Sale => "SALE",
        Resale => "RESALE",
        Rent => "RENT",
    }
}

wire_enum! {
    Furnishing("furnishing") default Unfurnished {
        FullyFurnished => "FULLY_FURNISHED",
        SemiFurnished => "SEMI_FURNISHED",
        Unfurnished => "UNFURNISHED",
    }
}

wire_enum! {
    /// Whether a listing (or agent account) is live
    Status("status") default Active {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
}

wire_enum! {
    /// Promotion tier of a listing
    ListingStatus("listing status") default Recent {
        Premium => "PREMIUM",
        Featured => "FEATURED",
        Recent => "RECENT",
    }
}

/// A persisted listing photo. Never mutated client-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: i64,
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alt_text: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub display_order: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_primary: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Listing owner as embedded in a property payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
}

/// Core property data model, as returned by the listing API.
///
/// Text and numeric fields the backend may omit or null out deserialize to
/// their empty value, so downstream code never sees a hole. Numbers sent as
/// floats are truncated and unknown enum values fall back to the default
/// variant, so one odd row never fails a whole listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub property_title: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub price: i64,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub property_type: PropertyType,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub listing_type: ListingType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub property_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pincode: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub bedrooms: i64,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub bathrooms: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub carpet_area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub built_up_area: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub floors: i64,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub total_floors: i64,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub property_age: i64,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub furnishing: Furnishing,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parking_available: bool,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub parking_spots: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub property_images: Vec<PropertyImage>,
    #[serde(default)]
    pub youtube_video_url: Option<String>,
    #[serde(default)]
    pub instagram_profile: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub listing_status: ListingStatus,
    #[serde(default)]
    pub agent: Option<AgentRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub view_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
}

/// Authenticated agent account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_properties: Option<i64>,
}

/// Per-agent listing counters shown on the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStats {
    pub total_properties: i64,
    pub active_properties: i64,
    pub premium_properties: i64,
    pub featured_properties: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_type: String,
    pub agent: Agent,
}

/// A buyer's inquiry about one listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub property_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub property_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub inquiry_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
