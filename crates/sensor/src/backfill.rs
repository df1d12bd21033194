use alloy_primitives::B256;
use chain::types::SealedHeader;
use tracing::info;

/// What to do after a header has been observed on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillStep {
    /// Nothing to fetch.
    Skip,
    /// The header became this connection's floor.
    FloorSet,
    /// Fetch the parent unless storage already has it.
    FetchParent(B256),
}

/// Per-connection walk back from the newest headers toward the first header
/// the connection ever saw.
///
/// The first observed header is the floor: no header at or below its number
/// triggers a fetch, so the floor's own parent is never requested.
#[derive(Debug, Default)]
pub struct Backfill {
    floor: Option<SealedHeader>,
}

impl Backfill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn floor(&self) -> Option<&SealedHeader> {
        self.floor.as_ref()
    }

    /// Decide about `header`. `enabled` is false when storage does not want
    /// blocks, in which case not even the floor is recorded.
    pub fn observe(&mut self, header: &SealedHeader, enabled: bool) -> BackfillStep {
        if !enabled {
            return BackfillStep::Skip;
        }

        let floor = match &self.floor {
            Some(floor) => floor,
            None => {
                info!(hash = %header.hash, number = header.number(), "Setting oldest block");
                self.floor = Some(header.clone());
                return BackfillStep::FloorSet;
            }
        };

        if header.number() <= floor.number() {
            return BackfillStep::Skip;
        }
        BackfillStep::FetchParent(header.parent_hash())
    }
}
