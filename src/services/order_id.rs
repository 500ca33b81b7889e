use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::payment::OrderId;

pub trait OrderIdGenerator: Send + Sync {
    fn next_order_id(&self) -> OrderId;
}

/// Last 12 digits of the millisecond clock, strictly increasing within the process.
#[derive(Debug, Default)]
pub struct TimestampOrderIds {
    last: AtomicU64,
}

impl TimestampOrderIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_at(&self, now_millis: u64) -> OrderId {
        let candidate = now_millis % OrderId::MODULUS;
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(Self::advance(last, candidate))
            })
            .unwrap_or_else(|last| last);
        OrderId::from_sequence(Self::advance(previous, candidate))
    }

    fn advance(last: u64, candidate: u64) -> u64 {
        if candidate > last {
            candidate
        } else {
            (last + 1) % OrderId::MODULUS
        }
    }
}

impl OrderIdGenerator for TimestampOrderIds {
    fn next_order_id(&self) -> OrderId {
        // Nunca retrocede, mesmo no mesmo milissegundo
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.issue_at(now)
    }
}

#[derive(Debug, Clone)]
pub struct FixedOrderId(pub OrderId);

impl OrderIdGenerator for FixedOrderId {
    fn next_order_id(&self) -> OrderId {
        self.0.clone()
    }
}
