use std::fmt;

/// Amenity identifiers the listing form offers as checkboxes.
///
/// The backend may introduce identifiers outside this list; [`AmenitySet`]
/// keeps those rather than dropping them.
pub const AMENITY_VOCABULARY: &[&str] = &[
    "swimming_pool",
    "gym",
    "garden",
    "security",
    "lift",
    "parking",
    "power_backup",
    "water_supply",
    "wifi",
    "clubhouse",
    "playground",
    "jogging_track",
    "tennis_court",
    "basketball_court",
    "meditation_center",
];

/// Whether an identifier belongs to the form's fixed vocabulary
pub fn is_known_amenity(id: &str) -> bool {
    AMENITY_VOCABULARY.contains(&id)
}

/// Ordered, duplicate-free set of amenity identifiers.
///
/// The backend stores amenities as a single comma-joined string; this type
/// is the editable form of that string. Members keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmenitySet {
    members: Vec<String>,
}

impl AmenitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the backend's comma-delimited form. Segments are trimmed,
    /// empty segments dropped, and repeats collapsed to their first
    /// occurrence.
    pub fn decode(serialized: &str) -> Self {
        let mut set = Self::new();
        for segment in serialized.split(',') {
            set.insert(segment);
        }
        set
    }

    /// Join members with commas, in insertion order.
    pub fn encode(&self) -> String {
        self.members.join(",")
    }

    /// Add (`present = true`) or remove one identifier. Both directions are
    /// idempotent.
    pub fn toggle(&mut self, id: &str, present: bool) {
        if present {
            self.insert(id);
        } else {
            let id = id.trim();
            self.members.retain(|m| m != id);
        }
    }

    /// Returns `true` if the identifier was newly added.
    fn insert(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || self.contains(id) {
            return false;
        }
        self.members.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Members that are not part of [`AMENITY_VOCABULARY`]
    pub fn unknown(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|m| !is_known_amenity(m))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for AmenitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<S: AsRef<str>> FromIterator<S> for AmenitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id.as_ref());
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_trims_drops_empty_and_dedups() {
        let set = AmenitySet::decode(" gym,,lift , gym,  ,wifi,");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["gym", "lift", "wifi"]);
    }

    #[test]
    fn decode_empty_string_is_empty_set() {
        assert!(AmenitySet::decode("").is_empty());
        assert_eq!(AmenitySet::decode("").encode(), "");
    }

    #[test]
    fn encode_keeps_insertion_order() {
        let set: AmenitySet = ["wifi", "garden", "gym"].into_iter().collect();
        assert_eq!(set.encode(), "wifi,garden,gym");
    }

    #[test]
    fn round_trip_preserves_well_formed_sets() {
        let samples: Vec<AmenitySet> = vec![
            AmenitySet::new(),
            ["gym"].into_iter().collect(),
            ["lift", "parking", "helipad"].into_iter().collect(),
        ];
        for set in samples {
            assert_eq!(AmenitySet::decode(&set.encode()), set);
        }
    }

    #[test]
    fn toggle_is_idempotent_both_ways() {
        let mut set = AmenitySet::decode("gym");

        set.toggle("gym", true);
        assert_eq!(set.encode(), "gym");

        set.toggle("lift", false);
        assert_eq!(set.encode(), "gym");

        set.toggle("lift", true);
        set.toggle("gym", false);
        set.toggle("gym", false);
        assert_eq!(set.encode(), "lift");
    }

    #[test]
    fn toggle_ignores_blank_identifier() {
        let mut set = AmenitySet::new();
        set.toggle("  ", true);
        assert!(set.is_empty());
    }

    #[test]
    fn unknown_identifiers_are_preserved() {
        let set = AmenitySet::decode("gym,rooftop_bar");
        assert!(set.contains("rooftop_bar"));
        assert_eq!(set.unknown().collect::<Vec<_>>(), vec!["rooftop_bar"]);
        assert_eq!(set.encode(), "gym,rooftop_bar");
    }
}
