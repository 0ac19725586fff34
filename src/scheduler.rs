/// Deferred work keyed by wake time. Each category holds at most one pending
/// entry; scheduling again replaces it.
#[derive(Clone, Debug)]
pub struct Scheduler<K, A> {
    entries: Vec<Scheduled<K, A>>,
    next_seq: u64,
}

#[derive(Clone, Debug)]
struct Scheduled<K, A> {
    category: K,
    wake_ms: u64,
    seq: u64,
    action: A,
}

impl<K, A> Default for Scheduler<K, A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: PartialEq + Copy, A> Scheduler<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a pending entry of the same category was replaced.
    pub fn schedule(&mut self, category: K, wake_ms: u64, action: A) -> bool {
        let replaced = self.cancel(category);
        self.entries.push(Scheduled {
            category,
            wake_ms,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
        replaced
    }

    pub fn cancel(&mut self, category: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.category != category);
        self.entries.len() != before
    }

    pub fn is_pending(&self, category: K) -> bool {
        self.entries.iter().any(|entry| entry.category == category)
    }

    pub fn wake_time(&self, category: K) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.wake_ms)
    }

    pub fn drain_due(&mut self, now_ms: u64) -> Vec<A> {
        let mut due = Vec::new();
        let mut idx = 0;
        while idx < self.entries.len() {
            if self.entries[idx].wake_ms <= now_ms {
                due.push(self.entries.swap_remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by_key(|entry| (entry.wake_ms, entry.seq));
        due.into_iter().map(|entry| entry.action).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
