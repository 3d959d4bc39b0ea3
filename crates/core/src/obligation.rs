//! Lending obligation tracking.
//!
//! An obligation is opened at most once per wallet run, by the first GR
//! deposit, and then threaded through every later lending call. Its ids are
//! pulled out of the opening transaction by a [`ResourceExtractor`]: events
//! are the primary source, created-object records the fallback.

use creek_chain::{struct_name, ObjectId, TransactionResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::PreconditionError;

/// A wallet's lending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    pub id: ObjectId,
    /// Capability required for borrow and withdraw
    pub key_id: Option<ObjectId>,
}

impl Obligation {
    pub fn new(id: impl Into<ObjectId>, key_id: Option<ObjectId>) -> Self {
        Self {
            id: id.into(),
            key_id,
        }
    }

    /// Key id, or a precondition failure when unknown.
    pub fn key(&self) -> Result<&str, PreconditionError> {
        self.key_id
            .as_deref()
            .ok_or_else(|| PreconditionError::MissingObligationKey(self.id.clone()))
    }
}

/// Pulls an identifier set out of an executed transaction.
pub trait ResourceExtractor {
    type Output;

    /// Primary strategy.
    fn from_events(&self, result: &TransactionResult) -> Option<Self::Output>;

    /// Fallback strategy.
    fn from_object_changes(&self, result: &TransactionResult) -> Option<Self::Output>;

    /// Primary first, fallback only when the primary yields nothing.
    fn extract(&self, result: &TransactionResult) -> Option<Self::Output> {
        self.from_events(result)
            .or_else(|| self.from_object_changes(result))
    }
}

/// Extracts `(obligation, key)` from an obligation-opening transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObligationExtractor;

const CREATED_EVENT: &str = "ObligationCreatedEvent";
const OBLIGATION_STRUCT: &str = "Obligation";
const KEY_STRUCT: &str = "ObligationKey";

fn json_id(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find_map(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ResourceExtractor for ObligationExtractor {
    type Output = Obligation;

    fn from_events(&self, result: &TransactionResult) -> Option<Obligation> {
        let event = result.find_event(CREATED_EVENT)?;
        let id = json_id(&event.parsed_json, &["obligation"])?;
        let key_id = json_id(&event.parsed_json, &["obligation_key", "obligationkey"]);
        Some(Obligation { id, key_id })
    }

    fn from_object_changes(&self, result: &TransactionResult) -> Option<Obligation> {
        let (id, key_id) = scan_created(result);
        Some(Obligation { id: id?, key_id })
    }

    /// Events first; a key missing from the event is filled from object
    /// changes when they carry one.
    fn extract(&self, result: &TransactionResult) -> Option<Obligation> {
        match self.from_events(result) {
            Some(mut obligation) => {
                if obligation.key_id.is_none() {
                    obligation.key_id = scan_created(result).1;
                }
                Some(obligation)
            }
            None => self.from_object_changes(result),
        }
    }
}

/// `(obligation, key)` ids among the created objects, each independently.
fn scan_created(result: &TransactionResult) -> (Option<ObjectId>, Option<ObjectId>) {
    let mut id = None;
    let mut key_id = None;
    for change in result.created_objects() {
        let (Some(object_type), Some(object_id)) = (&change.object_type, &change.object_id) else {
            continue;
        };
        match struct_name(object_type) {
            OBLIGATION_STRUCT => id = Some(object_id.clone()),
            KEY_STRUCT => key_id = Some(object_id.clone()),
            _ => {}
        }
    }
    (id, key_id)
}

/// Holds the obligation for one wallet run.
#[derive(Debug, Clone, Default)]
pub struct ObligationTracker {
    current: Option<Obligation>,
}

impl ObligationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run, reusing `existing` when one is already known.
    pub fn ensure(existing: Option<Obligation>) -> Self {
        Self { current: existing }
    }

    pub fn current(&self) -> Option<&Obligation> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Obligation for deposits and repayments.
    pub fn require(&self) -> Result<&Obligation, PreconditionError> {
        self.current.as_ref().ok_or(PreconditionError::MissingObligation)
    }

    /// Obligation and key for borrow and withdraw.
    pub fn require_with_key(&self) -> Result<(&Obligation, &str), PreconditionError> {
        let obligation = self.require()?;
        Ok((obligation, obligation.key()?))
    }

    /// Record the obligation opened by `result`.
    ///
    /// Never replaces an existing obligation. Returns whether one is now held.
    pub fn record_creation(&mut self, result: &TransactionResult) -> bool {
        if let Some(existing) = &self.current {
            warn!(obligation = %existing.id, "Obligation already held, ignoring creation");
            return true;
        }
        match ObligationExtractor.extract(result) {
            Some(obligation) => {
                info!(
                    obligation = %obligation.id,
                    key = obligation.key_id.as_deref().unwrap_or("unknown"),
                    "Obligation opened"
                );
                self.current = Some(obligation);
                true
            }
            None => {
                warn!(digest = %result.digest, "Obligation opened but ids not found in result");
                false
            }
        }
    }
}
