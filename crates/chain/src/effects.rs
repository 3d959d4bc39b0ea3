//! Execution results returned after submitting a transaction.
//!
//! Success is decided solely by the declared `effects.status.status` field.
//! Events and object changes are kept so callers can pull out identifiers of
//! objects the transaction created.

use serde::Deserialize;
use serde_json::Value;

use crate::client::ChainError;
use crate::transaction::ObjectId;

/// Declared execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure,
}

/// Event emitted by a Move call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEvent {
    /// Fully qualified event type
    pub event_type: String,
    /// Decoded event payload
    pub parsed_json: Value,
}

/// Kind of object change reported for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectChangeKind {
    Created,
    Mutated,
    Deleted,
    Transferred,
    Wrapped,
    Published,
    Other,
}

impl ObjectChangeKind {
    fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "mutated" => Self::Mutated,
            "deleted" => Self::Deleted,
            "transferred" => Self::Transferred,
            "wrapped" => Self::Wrapped,
            "published" => Self::Published,
            _ => Self::Other,
        }
    }
}

/// One entry of the object-change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectChange {
    pub kind: ObjectChangeKind,
    pub object_type: Option<String>,
    pub object_id: Option<ObjectId>,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    pub status: ExecutionStatus,
    /// Failure reason when `status` is `Failure`
    pub error: Option<String>,
    pub digest: String,
    pub events: Vec<TransactionEvent>,
    pub object_changes: Vec<ObjectChange>,
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Shortened digest for log lines.
    pub fn short_digest(&self) -> &str {
        let end = self
            .digest
            .char_indices()
            .nth(10)
            .map(|(i, _)| i)
            .unwrap_or(self.digest.len());
        &self.digest[..end]
    }

    /// First event whose struct name equals `name`.
    pub fn find_event(&self, name: &str) -> Option<&TransactionEvent> {
        self.events
            .iter()
            .find(|e| struct_name(&e.event_type) == name)
    }

    /// Objects created by this transaction.
    pub fn created_objects(&self) -> impl Iterator<Item = &ObjectChange> {
        self.object_changes
            .iter()
            .filter(|c| c.kind == ObjectChangeKind::Created)
    }

    /// Decode a `sui_executeTransactionBlock` result.
    pub fn from_rpc(value: Value) -> Result<Self, ChainError> {
        let raw: RawExecuteResponse =
            serde_json::from_value(value).map_err(|e| ChainError::Decode(e.to_string()))?;
        Ok(raw.into())
    }
}

/// Struct name of a Move type tag.
///
/// `0x2::coin::Coin<0x2::sui::SUI>` -> `Coin`
pub fn struct_name(type_tag: &str) -> &str {
    let base = type_tag.split('<').next().unwrap_or(type_tag);
    base.rsplit("::").next().unwrap_or(base)
}

#[derive(Deserialize)]
struct RawExecuteResponse {
    digest: String,
    effects: Option<RawEffects>,
    #[serde(default)]
    events: Option<Vec<RawEvent>>,
    #[serde(default, rename = "objectChanges")]
    object_changes: Option<Vec<RawObjectChange>>,
}

#[derive(Deserialize)]
struct RawEffects {
    status: RawStatus,
}

#[derive(Deserialize)]
struct RawStatus {
    status: String,
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, rename = "parsedJson")]
    parsed_json: Value,
}

#[derive(Deserialize)]
struct RawObjectChange {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "objectType")]
    object_type: Option<String>,
    #[serde(rename = "objectId")]
    object_id: Option<String>,
}

impl From<RawExecuteResponse> for TransactionResult {
    fn from(raw: RawExecuteResponse) -> Self {
        let (status, error) = match raw.effects {
            Some(effects) if effects.status.status == "success" => (ExecutionStatus::Success, None),
            Some(effects) => (
                ExecutionStatus::Failure,
                Some(
                    effects
                        .status
                        .error
                        .unwrap_or_else(|| effects.status.status.clone()),
                ),
            ),
            None => (
                ExecutionStatus::Failure,
                Some("response carried no effects".to_string()),
            ),
        };

        Self {
            status,
            error,
            digest: raw.digest,
            events: raw
                .events
                .unwrap_or_default()
                .into_iter()
                .map(|e| TransactionEvent {
                    event_type: e.event_type,
                    parsed_json: e.parsed_json,
                })
                .collect(),
            object_changes: raw
                .object_changes
                .unwrap_or_default()
                .into_iter()
                .map(|c| ObjectChange {
                    kind: ObjectChangeKind::parse(&c.kind),
                    object_type: c.object_type,
                    object_id: c.object_id,
                })
                .collect(),
        }
    }
}
