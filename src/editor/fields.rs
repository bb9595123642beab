//! Editable listing attributes and their normalization rules.
//!
//! A [`PropertyDraft`] is always fully populated: loading from a fetched
//! [`Property`] maps missing values to empties, and every [`FieldEdit`]
//! coerces its raw input to the field's type before it lands in the draft.

use crate::editor::amenities::AmenitySet;
use crate::models::{Furnishing, ListingStatus, ListingType, Property, PropertyType};
use crate::session::AgentSession;
use std::fmt;

/// Semantic type of a draft field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    Choice,
    DelimitedSet,
}

/// How a draft value is edited, coerced, and written to the form.
pub trait FieldValue: Sized {
    /// What a [`FieldEdit`] carries for this type
    type Input;

    const KIND: FieldKind;

    fn from_input(input: Self::Input) -> Self;

    fn parse_input(raw: &str) -> Self::Input;

    fn encode(&self) -> String;
}

impl FieldValue for String {
    type Input = String;
    const KIND: FieldKind = FieldKind::Text;

    fn from_input(input: String) -> Self {
        input
    }

    fn parse_input(raw: &str) -> String {
        raw.to_string()
    }

    fn encode(&self) -> String {
        self.clone()
    }
}

/// Integer edits keep the raw text; coercion happens when they are applied.
impl FieldValue for i64 {
    type Input = String;
    const KIND: FieldKind = FieldKind::Integer;

    fn from_input(input: String) -> Self {
        coerce_integer(&input)
    }

    fn parse_input(raw: &str) -> String {
        raw.to_string()
    }

    fn encode(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for bool {
    type Input = bool;
    const KIND: FieldKind = FieldKind::Boolean;

    fn from_input(input: bool) -> Self {
        input
    }

    fn parse_input(raw: &str) -> bool {
        coerce_bool(raw)
    }

    fn encode(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for AmenitySet {
    type Input = AmenitySet;
    const KIND: FieldKind = FieldKind::DelimitedSet;

    fn from_input(input: AmenitySet) -> Self {
        input
    }

    fn parse_input(raw: &str) -> AmenitySet {
        AmenitySet::decode(raw)
    }

    fn encode(&self) -> String {
        AmenitySet::encode(self)
    }
}

/// Choice fields fall back to their default variant on unknown input.
macro_rules! choice_values {
    ($($name:ident),+ $(,)?) => {
        $(
            impl FieldValue for $name {
                type Input = $name;
                const KIND: FieldKind = FieldKind::Choice;

                fn from_input(input: $name) -> Self {
                    input
                }

                fn parse_input(raw: &str) -> $name {
                    raw.parse().unwrap_or_default()
                }

                fn encode(&self) -> String {
                    self.as_str().to_string()
                }
            }
        )+
    };
}

choice_values!(PropertyType, ListingType, Furnishing, ListingStatus);

/// Declares the draft's fields once and derives `Field`, `FieldEdit`,
/// `PropertyDraft` and the per-field tables from that list. Read-only
/// fields get a `Field` variant and a draft slot but no `FieldEdit`.
macro_rules! draft_fields {
    (
        editable { $($variant:ident, $field:ident: $ty:ty => $wire:literal;)+ }
        read_only { $($ro_variant:ident, $ro_field:ident: $ro_ty:ty => $ro_wire:literal;)* }
    ) => {
        /// Every field of a draft, in the order the backend DTO declares them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Field {
            $($variant,)+
            $($ro_variant,)*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[$(Field::$variant,)+ $(Field::$ro_variant,)*];

            /// Form key used in the multipart payload
            pub fn wire_name(self) -> &'static str {
                match self {
                    $(Field::$variant => $wire,)+
                    $(Field::$ro_variant => $ro_wire,)*
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $(Field::$variant => <$ty as FieldValue>::KIND,)+
                    $(Field::$ro_variant => <$ro_ty as FieldValue>::KIND,)*
                }
            }
        }

        /// One user edit, tagged by the field it targets.
        #[derive(Debug, Clone, PartialEq)]
        pub enum FieldEdit {
            $($variant(<$ty as FieldValue>::Input),)+
        }

        impl FieldEdit {
            /// Build an edit from untyped form input. Returns `None` only for
            /// read-only fields.
            pub fn parse(field: Field, raw: &str) -> Option<FieldEdit> {
                match field {
                    $(Field::$variant => Some(FieldEdit::$variant(<$ty as FieldValue>::parse_input(raw))),)+
                    $(Field::$ro_variant => None,)*
                }
            }
        }

        /// In-memory, not-yet-submitted listing
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct PropertyDraft {
            $(pub $field: $ty,)+
            $(pub $ro_field: $ro_ty,)*
        }

        impl PropertyDraft {
            /// In-place form of [`PropertyDraft::set_field`].
            pub fn apply(&mut self, edit: FieldEdit) {
                match edit {
                    $(FieldEdit::$variant(v) => self.$field = <$ty as FieldValue>::from_input(v),)+
                }
            }

            /// Current value of a field in its string-encoded wire form
            pub fn value_of(&self, field: Field) -> String {
                match field {
                    $(Field::$variant => self.$field.encode(),)+
                    $(Field::$ro_variant => self.$ro_field.encode(),)*
                }
            }
        }
    };
}

draft_fields! {
    editable {
        PropertyTitle, property_title: String => "propertyTitle";
        Price, price: i64 => "price";
        PropertyType, property_type: PropertyType => "propertyType";
        ListingType, listing_type: ListingType => "listingType";
        PropertyDescription, property_description: String => "propertyDescription";
        FullAddress, full_address: String => "fullAddress";
        Locality, locality: String => "locality";
        City, city: String => "city";
        State, state: String => "state";
        Pincode, pincode: String => "pincode";
        Bedrooms, bedrooms: i64 => "bedrooms";
        Bathrooms, bathrooms: i64 => "bathrooms";
        Area, area: String => "area";
        CarpetArea, carpet_area: String => "carpetArea";
        BuiltUpArea, built_up_area: String => "builtUpArea";
        Floors, floors: i64 => "floors";
        TotalFloors, total_floors: i64 => "totalFloors";
        PropertyAge, property_age: i64 => "propertyAge";
        Furnishing, furnishing: Furnishing => "furnishing";
        Amenities, amenities: AmenitySet => "amenities";
        ParkingAvailable, parking_available: bool => "parkingAvailable";
        ParkingSpots, parking_spots: i64 => "parkingSpots";
        ContactName, contact_name: String => "contactName";
        ContactPhone, contact_phone: String => "contactPhone";
        ContactEmail, contact_email: String => "contactEmail";
        YoutubeVideoUrl, youtube_video_url: String => "youtubeVideoUrl";
        InstagramProfile, instagram_profile: String => "instagramProfile";
        ListingStatus, listing_status: ListingStatus => "listingStatus";
    }
    read_only {
        AgentId, agent_id: i64 => "agentId";
    }
}

impl Field {
    /// Fields that must be non-empty before a draft may be submitted.
    pub const REQUIRED: &'static [Field] = &[
        Field::PropertyTitle,
        Field::Price,
        Field::FullAddress,
        Field::Locality,
        Field::City,
        Field::State,
        Field::Pincode,
        Field::ContactName,
        Field::ContactPhone,
    ];

    /// Look a field up by its wire name (`"propertyTitle"`, `"price"`, ...)
    pub fn from_wire_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.wire_name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Parse user input for an integer field. Anything that is not a number
/// becomes `0`; fractional input is truncated toward zero.
pub fn coerce_integer(raw: &str) -> i64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

/// Interpret checkbox-style input
pub fn coerce_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "yes" | "1" | "checked"
    )
}

/// Tunables for [`PropertyDraft::validate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Treat a price of `0` (or below) as missing.
    pub require_positive_price: bool,
}

/// Required fields left empty
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", list_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

fn list_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.wire_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PropertyDraft {
    /// Blank draft for a new listing, pre-filled with the signed-in
    /// agent's id and contact details.
    pub fn for_agent(session: &AgentSession) -> Self {
        Self {
            agent_id: session.agent_id(),
            contact_name: session.contact_name().to_string(),
            contact_phone: session.contact_phone().to_string(),
            contact_email: session.contact_email().to_string(),
            ..Self::default()
        }
    }

    /// Editable copy of a fetched listing
    pub fn load_from(property: &Property) -> Self {
        Self {
            property_title: property.property_title.clone(),
            price: property.price,
            property_type: property.property_type,
            listing_type: property.listing_type,
            property_description: property.property_description.clone(),
            full_address: property.full_address.clone(),
            locality: property.locality.clone(),
            city: property.city.clone(),
            state: property.state.clone(),
            pincode: property.pincode.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            area: property.area.clone(),
            carpet_area: property.carpet_area.clone(),
            built_up_area: property.built_up_area.clone(),
            floors: property.floors,
            total_floors: property.total_floors,
            property_age: property.property_age,
            furnishing: property.furnishing,
            amenities: AmenitySet::decode(&property.amenities),
            parking_available: property.parking_available,
            parking_spots: property.parking_spots,
            contact_name: property.contact_name.clone(),
            contact_phone: property.contact_phone.clone(),
            contact_email: property.contact_email.clone().unwrap_or_default(),
            youtube_video_url: property.youtube_video_url.clone().unwrap_or_default(),
            instagram_profile: property.instagram_profile.clone().unwrap_or_default(),
            listing_status: property.listing_status,
            agent_id: property.agent.as_ref().map(|a| a.id).unwrap_or_default(),
        }
    }

    /// Apply one edit and return the updated draft.
    pub fn set_field(mut self, edit: FieldEdit) -> Self {
        self.apply(edit);
        self
    }

    fn is_missing(&self, field: Field, policy: ValidationPolicy) -> bool {
        match field {
            Field::Price => policy.require_positive_price && self.price <= 0,
            f if f.kind() == FieldKind::Text => self.value_of(f).trim().is_empty(),
            _ => false,
        }
    }

    /// Check the required fields with the default (permissive) policy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(ValidationPolicy::default())
    }

    pub fn validate_with(&self, policy: ValidationPolicy) -> Result<(), ValidationError> {
        let missing: Vec<Field> = Field::REQUIRED
            .iter()
            .copied()
            .filter(|f| self.is_missing(*f, policy))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// String-encoded key/value pairs for the multipart payload.
    ///
    /// Empty strings are left out. Numbers and booleans are always sent,
    /// including `0` and `false`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        Field::ALL
            .iter()
            .map(|f| (f.wire_name(), self.value_of(*f)))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, Status};

    fn complete_draft() -> PropertyDraft {
        PropertyDraft::default()
            .set_field(FieldEdit::PropertyTitle("Villa in Banjara Hills".into()))
            .set_field(FieldEdit::Price("5500000".into()))
            .set_field(FieldEdit::FullAddress("Road 12".into()))
            .set_field(FieldEdit::Locality("Banjara Hills".into()))
            .set_field(FieldEdit::City("Hyderabad".into()))
            .set_field(FieldEdit::State("Telangana".into()))
            .set_field(FieldEdit::Pincode("500034".into()))
            .set_field(FieldEdit::ContactName("Asha".into()))
            .set_field(FieldEdit::ContactPhone("9876543210".into()))
    }

    #[test]
    fn default_draft_uses_defined_enum_defaults() {
        let draft = PropertyDraft::default();
        assert_eq!(draft.property_type, PropertyType::Residential);
        assert_eq!(draft.listing_type, ListingType::Sale);
        assert_eq!(draft.furnishing, Furnishing::Unfurnished);
        assert_eq!(draft.listing_status, ListingStatus::Recent);
        assert_eq!(draft.price, 0);
        assert!(draft.amenities.is_empty());
    }

    #[test]
    fn for_agent_injects_session_contact_details() {
        let session = AgentSession::new(Agent {
            id: 42,
            username: "asha".into(),
            full_name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone_number: "9876543210".into(),
            status: Status::Active,
            created_at: None,
            updated_at: None,
            total_properties: None,
        });

        let draft = PropertyDraft::for_agent(&session);
        assert_eq!(draft.agent_id, 42);
        assert_eq!(draft.contact_name, "Asha Rao");
        assert_eq!(draft.contact_phone, "9876543210");
        assert_eq!(draft.contact_email, "asha@example.com");
        assert_eq!(draft.property_title, "");
    }

    #[test]
    fn non_numeric_price_coerces_to_zero() {
        let draft = PropertyDraft::default().set_field(FieldEdit::Price("abc".into()));
        assert_eq!(draft.price, 0);
    }

    #[test]
    fn coerce_integer_handles_fractions_and_blanks() {
        assert_eq!(coerce_integer(" 42 "), 42);
        assert_eq!(coerce_integer("12.9"), 12);
        assert_eq!(coerce_integer("-3"), -3);
        assert_eq!(coerce_integer(""), 0);
        assert_eq!(coerce_integer("NaN"), 0);
        assert_eq!(coerce_integer("inf"), 0);
    }

    #[test]
    fn checkbox_input_coerces_to_bool() {
        let draft = PropertyDraft::default()
            .set_field(FieldEdit::parse(Field::ParkingAvailable, "on").unwrap());
        assert!(draft.parking_available);
        assert!(!coerce_bool("off"));
    }

    #[test]
    fn parse_unknown_choice_falls_back_to_default() {
        let edit = FieldEdit::parse(Field::PropertyType, "CASTLE").unwrap();
        assert_eq!(edit, FieldEdit::PropertyType(PropertyType::Residential));

        let edit = FieldEdit::parse(Field::ListingType, "RENT").unwrap();
        assert_eq!(edit, FieldEdit::ListingType(ListingType::Rent));
    }

    #[test]
    fn agent_id_is_read_only() {
        assert_eq!(FieldEdit::parse(Field::AgentId, "7"), None);
    }

    #[test]
    fn load_from_maps_optional_fields_to_empty() {
        let property: Property = serde_json::from_str(
            r#"{"id": 3, "propertyTitle": "Loft", "amenities": "gym,lift",
                "youtubeVideoUrl": null, "agent": {"id": 9}}"#,
        )
        .unwrap();

        let draft = PropertyDraft::load_from(&property);
        assert_eq!(draft.property_title, "Loft");
        assert_eq!(draft.youtube_video_url, "");
        assert_eq!(draft.contact_email, "");
        assert_eq!(draft.agent_id, 9);
        assert_eq!(draft.amenities.encode(), "gym,lift");
    }

    #[test]
    fn load_from_without_agent_uses_zero() {
        let property: Property = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let draft = PropertyDraft::load_from(&property);
        assert_eq!(draft.agent_id, 0);
    }

    #[test]
    fn validate_reports_every_missing_field_in_order() {
        let err = PropertyDraft::default().validate().unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                Field::PropertyTitle,
                Field::FullAddress,
                Field::Locality,
                Field::City,
                Field::State,
                Field::Pincode,
                Field::ContactName,
                Field::ContactPhone,
            ]
        );
    }

    #[test]
    fn validate_treats_whitespace_as_missing() {
        let draft = complete_draft().set_field(FieldEdit::City("   ".into()));
        let err = draft.validate().unwrap_err();
        assert_eq!(err.missing, vec![Field::City]);
    }

    #[test]
    fn zero_price_passes_by_default_but_not_under_strict_policy() {
        let draft = complete_draft().set_field(FieldEdit::Price("abc".into()));
        assert_eq!(draft.price, 0);
        assert!(draft.validate().is_ok());

        let strict = ValidationPolicy {
            require_positive_price: true,
        };
        let err = draft.validate_with(strict).unwrap_err();
        assert_eq!(err.missing, vec![Field::Price]);
    }

    #[test]
    fn form_fields_skip_empty_strings_but_keep_zero_and_false() {
        let fields = complete_draft().form_fields();
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("price"), Some("5500000"));
        assert_eq!(get("bedrooms"), Some("0"));
        assert_eq!(get("parkingAvailable"), Some("false"));
        assert_eq!(get("propertyType"), Some("RESIDENTIAL"));
        assert_eq!(get("carpetArea"), None);
        assert_eq!(get("amenities"), None);
        assert_eq!(fields[0].0, "propertyTitle");
    }

    #[test]
    fn field_kinds_follow_draft_types() {
        assert_eq!(Field::Price.kind(), FieldKind::Integer);
        assert_eq!(Field::AgentId.kind(), FieldKind::Integer);
        assert_eq!(Field::ParkingAvailable.kind(), FieldKind::Boolean);
        assert_eq!(Field::Furnishing.kind(), FieldKind::Choice);
        assert_eq!(Field::Amenities.kind(), FieldKind::DelimitedSet);
        assert_eq!(Field::Pincode.kind(), FieldKind::Text);
    }

    #[test]
    fn wire_names_round_trip_through_lookup() {
        for field in Field::ALL {
            assert_eq!(Field::from_wire_name(field.wire_name()), Some(*field));
        }
        assert_eq!(Field::from_wire_name("nope"), None);
    }
}
