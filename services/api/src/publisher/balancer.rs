use std::sync::Mutex;

/// Sends each record to the partition that has received the fewest bytes so far.
///
/// Ties go to the lowest partition index.
#[derive(Debug)]
pub struct LeastBytes {
    sent: Mutex<Vec<u64>>,
}

impl LeastBytes {
    /// Creates a balancer over `partitions` partitions. Callers guarantee at least one.
    pub fn new(partitions: usize) -> Self {
        Self {
            sent: Mutex::new(vec![0; partitions]),
        }
    }

    /// Picks the partition for a record of `len` bytes and charges it.
    pub fn pick(&self, len: usize) -> usize {
        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        let index = sent
            .iter()
            .enumerate()
            .min_by_key(|(_, bytes)| **bytes)
            .map(|(index, _)| index)
            .unwrap_or(0);
        if let Some(bytes) = sent.get_mut(index) {
            *bytes += len as u64;
        }
        index
    }
}
