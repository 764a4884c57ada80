use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Scheduled<J> {
    due: Duration,
    seq: u64,
    job: J,
}

impl<J> Ord for Scheduled<J> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: earliest due first, then scheduling order
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<J> PartialOrd for Scheduled<J> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<J> PartialEq for Scheduled<J> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<J> Eq for Scheduled<J> {}

/// Deferred jobs on a virtual clock. Nothing runs until the owner advances
/// time; jobs due at the same instant run in the order they were scheduled.
#[derive(Debug)]
pub struct Timeline<J> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Scheduled<J>>,
}

impl<J> Default for Timeline<J> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<J> Timeline<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, job: J) -> Duration {
        let due = self.now + delay;
        self.queue.push(Scheduled {
            due,
            seq: self.next_seq,
            job,
        });
        self.next_seq += 1;
        due
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|s| s.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pops the next job due at or before `until`, moving the clock to its due
    /// time. Returns `None` (and parks the clock at `until`) once nothing else
    /// is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<J> {
        match self.queue.peek() {
            Some(s) if s.due <= until => {
                let scheduled = self.queue.pop()?;
                self.now = self.now.max(scheduled.due);
                Some(scheduled.job)
            }
            _ => {
                self.now = self.now.max(until);
                None
            }
        }
    }
}
