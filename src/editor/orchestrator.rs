//! Listing editor and its submission state machine.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded
//!             |              |
//!             +--> Failed <--+
//! ```
//!
//! `Failed` returns to `Idle` on the next edit. Submit requests and edits
//! are both rejected while `Submitting`, so the payload in flight always
//! matches the draft and ledger it was built from. After `Succeeded` the
//! editor is finished.

use crate::api::{ApiError, ApiScope, PropertyApi, SubmissionPayload, SubmitAck, SubmitTarget};
use crate::editor::amenities::AmenitySet;
use crate::editor::fields::{FieldEdit, PropertyDraft, ValidationError, ValidationPolicy};
use crate::editor::ledger::{ImageLedger, LedgerError, NewImage, PreviewRegistry, Removal};
use crate::models::Property;
use crate::session::AgentSession;
use tracing::{debug, info, warn};

/// What the editor is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(i64),
    AdminEdit(i64),
}

impl EditorMode {
    fn target(self) -> SubmitTarget {
        match self {
            EditorMode::Create => SubmitTarget::Create,
            EditorMode::Edit(id) => SubmitTarget::Update(id),
            EditorMode::AdminEdit(id) => SubmitTarget::AdminUpdate(id),
        }
    }
}

/// Why the last attempt failed, in user-facing form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    Validation(ValidationError),
    Transport { message: String, unauthorized: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded(SubmitAck),
    Failed(SubmitFailure),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to save listing: {0}")]
    Transport(#[from] ApiError),

    #[error("a submission is already in progress")]
    InFlight,

    #[error("listing was already saved")]
    Finished,

    #[error("submission result no longer applies to this editor")]
    Stale,
}

/// Why an edit was refused
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("listing is being saved; wait for the result before editing")]
    InFlight,

    #[error("listing was already saved")]
    Finished,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Identifies one submit attempt so its result can only be applied once
#[derive(Debug, PartialEq, Eq)]
pub struct SubmitTicket {
    attempt: u64,
}

/// An attempt that passed validation and is ready to send
#[derive(Debug)]
pub struct Submission {
    pub ticket: SubmitTicket,
    pub payload: SubmissionPayload,
}

/// In-memory editor for one listing: draft fields, amenities, and images.
///
/// Dropping the editor releases every staged preview.
#[derive(Debug)]
pub struct ListingEditor {
    mode: EditorMode,
    draft: PropertyDraft,
    ledger: ImageLedger,
    state: SubmitState,
    policy: ValidationPolicy,
    attempt: u64,
}

impl ListingEditor {
    /// Editor for a new listing owned by the signed-in agent
    pub fn create(session: &AgentSession, previews: PreviewRegistry) -> Self {
        Self::with_parts(
            EditorMode::Create,
            PropertyDraft::for_agent(session),
            ImageLedger::new(previews),
        )
    }

    /// Editor for an existing listing
    pub fn edit(property: &Property, previews: PreviewRegistry) -> Self {
        Self::load(EditorMode::Edit(property.id), property, previews)
    }

    /// Editor for any listing, saved through the admin endpoint
    pub fn admin_edit(property: &Property, previews: PreviewRegistry) -> Self {
        Self::load(EditorMode::AdminEdit(property.id), property, previews)
    }

    /// Fetch a listing and open it for editing.
    pub async fn open(
        api: &dyn PropertyApi,
        id: i64,
        scope: ApiScope,
        previews: PreviewRegistry,
    ) -> Result<Self, ApiError> {
        let property = api.get_property(id, scope).await?;
        info!("Loaded listing {} for editing", property.id);
        Ok(match scope {
            ApiScope::Agent(_) => Self::edit(&property, previews),
            ApiScope::Admin => Self::admin_edit(&property, previews),
        })
    }

    fn load(mode: EditorMode, property: &Property, previews: PreviewRegistry) -> Self {
        Self::with_parts(
            mode,
            PropertyDraft::load_from(property),
            ImageLedger::from_existing(property.property_images.clone(), previews),
        )
    }

    fn with_parts(mode: EditorMode, draft: PropertyDraft, ledger: ImageLedger) -> Self {
        Self {
            mode,
            draft,
            ledger,
            state: SubmitState::Idle,
            policy: ValidationPolicy::default(),
            attempt: 0,
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    pub fn ledger(&self) -> &ImageLedger {
        &self.ledger
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmitState::Submitting)
    }

    /// Refuse edits while a payload is in flight or after the listing was
    /// saved.
    fn ensure_editable(&self) -> Result<(), EditError> {
        match self.state {
            SubmitState::Validating | SubmitState::Submitting => {
                warn!("Edit rejected: submission {} is in flight", self.attempt);
                Err(EditError::InFlight)
            }
            SubmitState::Succeeded(_) => Err(EditError::Finished),
            SubmitState::Idle | SubmitState::Failed(_) => Ok(()),
        }
    }

    /// Any edit after a failed attempt puts the editor back to `Idle`.
    fn touch(&mut self) {
        if matches!(self.state, SubmitState::Failed(_)) {
            self.state = SubmitState::Idle;
        }
    }

    pub fn set_field(&mut self, edit: FieldEdit) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.draft.apply(edit);
        self.touch();
        Ok(())
    }

    pub fn toggle_amenity(&mut self, id: &str, present: bool) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.draft.amenities.toggle(id, present);
        self.touch();
        Ok(())
    }

    pub fn amenities(&self) -> &AmenitySet {
        &self.draft.amenities
    }

    pub fn stage_images<I>(&mut self, files: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = NewImage>,
    {
        self.ensure_editable()?;
        self.ledger.stage_new(files);
        self.touch();
        Ok(())
    }

    pub fn unstage_image(&mut self, index: usize) -> Result<NewImage, EditError> {
        self.ensure_editable()?;
        let file = self.ledger.unstage_new(index)?;
        self.touch();
        Ok(file)
    }

    pub fn remove_existing_image(&mut self, id: i64) -> Result<Removal, EditError> {
        self.ensure_editable()?;
        let removal = self.ledger.mark_removed(id)?;
        self.touch();
        Ok(removal)
    }

    /// Validate and assemble the payload, moving to `Submitting`.
    ///
    /// Fails without touching the network when the draft is incomplete, a
    /// submission is already in flight, or the listing was already saved.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        match self.state {
            SubmitState::Submitting | SubmitState::Validating => {
                warn!("Submit rejected: another submission is in flight");
                return Err(SubmitError::InFlight);
            }
            SubmitState::Succeeded(_) => return Err(SubmitError::Finished),
            SubmitState::Idle | SubmitState::Failed(_) => {}
        }

        self.state = SubmitState::Validating;
        if let Err(err) = self.draft.validate_with(self.policy) {
            info!("Validation failed: {}", err);
            self.state = SubmitState::Failed(SubmitFailure::Validation(err.clone()));
            return Err(err.into());
        }

        let diff = self.ledger.diff();
        let payload = SubmissionPayload {
            target: self.mode.target(),
            fields: self
                .draft
                .form_fields()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            new_files: diff.new_files,
            removed_ids: diff.removed_ids,
        };

        self.attempt += 1;
        self.state = SubmitState::Submitting;
        debug!("Submission {} assembled for {:?}", self.attempt, self.mode);

        Ok(Submission {
            ticket: SubmitTicket {
                attempt: self.attempt,
            },
            payload,
        })
    }

    /// Apply the API's answer to the attempt identified by `ticket`.
    ///
    /// On failure the draft and ledger are left exactly as they were so the
    /// user can retry.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<SubmitAck, ApiError>,
    ) -> Result<SubmitAck, SubmitError> {
        if !self.is_submitting() || ticket.attempt != self.attempt {
            warn!("Ignoring result of submission {}", ticket.attempt);
            return Err(SubmitError::Stale);
        }

        match outcome {
            Ok(ack) => {
                info!("Listing {} saved", ack.property_id);
                self.ledger.clear_staged();
                self.state = SubmitState::Succeeded(ack.clone());
                Ok(ack)
            }
            Err(err) => {
                warn!("Submission failed: {}", err);
                self.state = SubmitState::Failed(SubmitFailure::Transport {
                    message: err.user_message(),
                    unauthorized: err.is_unauthorized(),
                });
                Err(err.into())
            }
        }
    }

    /// Validate, send, and record the outcome.
    pub async fn submit(&mut self, api: &dyn PropertyApi) -> Result<SubmitAck, SubmitError> {
        let Submission { ticket, payload } = self.begin_submit()?;
        let outcome = api.submit(payload).await;
        self.finish_submit(ticket, outcome)
    }

    /// Abandon the edit. Staged previews are released with the ledger.
    pub fn cancel(self) {
        debug!(
            "Discarding editor for {:?} with {} staged images",
            self.mode,
            self.ledger.staged().len()
        );
    }
}
