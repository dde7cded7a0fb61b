use std::collections::VecDeque;

use emo_domain::constants::MAX_SAVED_REQUEST_IDS;

/// Remembers the most recent webhook request ids.
///
/// The platform retries deliveries it considers failed; a retried delivery
/// carries the same request id and must not run the callback twice.
#[derive(Debug, Clone)]
pub struct RequestIdLog {
    ids: VecDeque<String>,
    capacity: usize,
}

impl Default for RequestIdLog {
    fn default() -> Self {
        Self::with_capacity(MAX_SAVED_REQUEST_IDS)
    }
}

impl RequestIdLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { ids: VecDeque::with_capacity(capacity), capacity }
    }

    /// Record `request_id`. Returns `false` if it was already recorded.
    pub fn insert(&mut self, request_id: &str) -> bool {
        if self.ids.iter().any(|id| id == request_id) {
            return false;
        }
        if self.ids.len() == self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(request_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
