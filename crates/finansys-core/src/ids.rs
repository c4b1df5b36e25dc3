//! Collision-resistant string identifiers for new ledger entities.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::time::{Clock, SystemClock};

const RANDOM_SUFFIX_LEN: usize = 8;

/// Source of fresh entity identifiers.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Base-36 epoch milliseconds followed by a random hex suffix.
///
/// The time prefix keeps ids roughly ordered by creation; the random suffix
/// separates ids minted within the same millisecond.
pub struct TimeRandomIds {
    clock: Arc<dyn Clock>,
    last: Mutex<String>,
}

impl TimeRandomIds {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(String::new()),
        }
    }

    fn candidate(&self) -> String {
        let millis = self.clock.now().timestamp_millis().max(0) as u64;
        let random = Uuid::new_v4().simple().to_string();
        let mut id = to_base36(millis);
        id.push_str(&random[..RANDOM_SUFFIX_LEN]);
        id
    }
}

impl Default for TimeRandomIds {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl IdSource for TimeRandomIds {
    fn next_id(&self) -> String {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut id = self.candidate();
        while id == *last {
            id = self.candidate();
        }
        last.clone_from(&id);
        id
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
