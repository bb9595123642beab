pub mod amenities;
pub mod fields;
pub mod ledger;
pub mod orchestrator;

pub use amenities::{AmenitySet, AMENITY_VOCABULARY};
pub use fields::{Field, FieldEdit, FieldKind, FieldValue, PropertyDraft, ValidationError, ValidationPolicy};
pub use ledger::{ImageDiff, ImageLedger, LedgerError, NewImage, PreviewRegistry, Removal};
pub use orchestrator::{EditError, EditorMode, ListingEditor, SubmitError, SubmitFailure, SubmitState};
