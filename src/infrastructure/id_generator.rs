// Post ID Generator - Snowflake-like IDs for posts that arrive without one
// 64-bit layout: [timestamp:42][node_id:10][sequence:12], rendered as decimal strings

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, AppResult};

pub const MAX_NODE_ID: u16 = 1023;
const SEQUENCE_LIMIT: u64 = 4096;

/// Allows 1024 nodes and 4096 IDs per millisecond per node
#[derive(Debug)]
pub struct PostIdGenerator {
    node_id: u16,
    sequence: AtomicU64,
    last_timestamp: AtomicU64,
}

impl PostIdGenerator {
    pub fn new(node_id: u16) -> AppResult<Self> {
        if node_id > MAX_NODE_ID {
            return Err(AppError::IdGenerationError(format!(
                "node id {} exceeds {}",
                node_id, MAX_NODE_ID
            )));
        }

        Ok(Self {
            node_id,
            sequence: AtomicU64::new(0),
            last_timestamp: AtomicU64::new(0),
        })
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }

    /// Next raw 64-bit ID
    pub fn next_raw(&self) -> u64 {
        loop {
            let now = Self::now_millis();
            let last_ts = self.last_timestamp.load(Ordering::Relaxed);

            let sequence = if now == last_ts {
                // Same millisecond - increment sequence
                let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
                if seq >= SEQUENCE_LIMIT {
                    // Sequence overflow - spin until the next millisecond
                    std::hint::spin_loop();
                    continue;
                }
                seq
            } else {
                // New millisecond - reset sequence
                self.last_timestamp.store(now, Ordering::Relaxed);
                self.sequence.store(1, Ordering::Relaxed);
                0
            };

            return ((now & 0x3FF_FFFF_FFFF) << 22)
                | ((self.node_id as u64) << 12)
                | (sequence & 0xFFF);
        }
    }

    /// Next post ID as a string
    pub fn next_id(&self) -> String {
        self.next_raw().to_string()
    }

    pub fn extract_node_id(id: u64) -> u16 {
        ((id >> 12) & 0x3FF) as u16
    }

    pub fn extract_timestamp(id: u64) -> u64 {
        id >> 22
    }

    pub fn extract_sequence(id: u64) -> u16 {
        (id & 0xFFF) as u16
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }
}
