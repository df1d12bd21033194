use std::collections::HashMap;

use alloy_primitives::B256;

/// In-flight block data requests of one connection.
///
/// BlockBodies responses carry no block hash, so the hash each request was
/// issued for is remembered under its request id until the body arrives.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    pending: HashMap<u64, B256>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next request id of this connection. The first id is 1 and ids are
    /// never reused.
    pub fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record that a body request with `request_id` is pending for `hash`.
    pub fn track(&mut self, request_id: u64, hash: B256) {
        self.pending.insert(request_id, hash);
    }

    /// Take the hash recorded for `request_id`. Unknown ids leave the
    /// pending set untouched.
    pub fn resolve(&mut self, request_id: u64) -> Option<B256> {
        self.pending.remove(&request_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
