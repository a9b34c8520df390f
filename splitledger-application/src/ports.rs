use smol_str::SmolStr;
use splitledger_domain::{ExpenseRecord, Participant, ParticipantId};
use std::{collections::HashMap, hash::BuildHasher};

/// Read-only snapshot supplier owned by the storage collaborator.
///
/// The engine never mutates or caches what it is handed; a fresh snapshot per
/// recomputation keeps superseded results safe to discard.
pub trait SnapshotSource: Send + Sync {
    fn participants(&self) -> Vec<Participant>;
    fn expenses(&self) -> Vec<ExpenseRecord>;
}

/// Resolves participant ids to display names for presentation.
pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, id: ParticipantId) -> Option<&str>;
}

impl<S: BuildHasher + Send + Sync> MemberDirectory for HashMap<ParticipantId, SmolStr, S> {
    fn display_name(&self, id: ParticipantId) -> Option<&str> {
        self.get(&id).map(SmolStr::as_str)
    }
}
