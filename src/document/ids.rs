//! Per-document identifier sources.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Identifiers drawn once per document build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentIds {
    /// Instance id used in the namespace and serial number
    pub instance: Uuid,
    /// Creation time
    pub created: DateTime<Utc>,
}

/// Source of document identifiers.
///
/// Injected into the generator so tests can pin the only
/// non-deterministic parts of the output.
pub trait DocumentIdSource {
    fn draw(&self) -> DocumentIds;
}

/// Random v4 instance ids and the current time
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl DocumentIdSource for RandomIds {
    fn draw(&self) -> DocumentIds {
        DocumentIds {
            instance: Uuid::new_v4(),
            created: Utc::now().trunc_subsecs(0),
        }
    }
}

/// The same identifiers on every draw
#[derive(Debug, Clone, Copy)]
pub struct FixedIds(pub DocumentIds);

impl FixedIds {
    #[must_use]
    pub fn new(instance: Uuid, created: DateTime<Utc>) -> Self {
        Self(DocumentIds { instance, created })
    }
}

impl Default for FixedIds {
    fn default() -> Self {
        Self::new(Uuid::nil(), DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl DocumentIdSource for FixedIds {
    fn draw(&self) -> DocumentIds {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(RandomIds.draw().instance, RandomIds.draw().instance);
    }

    #[test]
    fn test_fixed_ids_repeat() {
        let ids = FixedIds::default();
        assert_eq!(ids.draw(), ids.draw());
        assert!(ids.draw().instance.is_nil());
    }
}
