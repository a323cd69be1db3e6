//! Order numbers and priority numbers.
//!
//! Both are only ever computed inside the order actor's create step, which
//! is what makes them unique: priorities from the session's high-water
//! mark, order numbers checked against the stored records.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use crate::actor_framework::Records;
use crate::domain::{Order, OrderType};

use super::OrderError;

/// Total length of a type-prefixed order number, prefix included.
pub const ORDER_NUMBER_LEN: usize = 8;

const MAX_DIGIT_DRAWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NumberingScheme {
    /// `D`/`T` + last six millisecond digits + one random digit.
    #[default]
    Timestamp,
    /// `ORD-YYYYMMDD-NNN`, `NNN` being the store id.
    DateSequential,
}

/// Highest priority number handed out since the last reset. Completing or
/// deleting an order never lowers it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrioritySession {
    highest_issued: u32,
}

impl PrioritySession {
    pub fn record(&mut self, priority: u32) {
        self.highest_issued = self.highest_issued.max(priority);
    }

    pub fn highest_issued(&self) -> u32 {
        self.highest_issued
    }
}

/// Next priority number for the session: one past the highest ever handed
/// out since the last reset. Never fills gaps.
pub fn next_priority_number(session: &PrioritySession) -> Result<u32, OrderError> {
    session
        .highest_issued
        .checked_add(1)
        .ok_or_else(|| OrderError::StoreError("Priority numbers exhausted".to_string()))
}

pub fn generate_order_number(order_type: OrderType, millis: i64, digit: u8) -> String {
    let mut number = format!("{}{:06}{}", order_type.prefix(), millis.rem_euclid(1_000_000), digit % 10);
    number.truncate(ORDER_NUMBER_LEN);
    number
}

pub fn date_sequential_order_number(date: NaiveDate, sequence: u64) -> String {
    format!("ORD-{}-{:03}", date.format("%Y%m%d"), sequence)
}

/// Pick an order number not already used in `existing`.
///
/// The timestamp scheme alone is only probabilistically unique, so a taken
/// candidate is redrawn, and after that falls back to a suffix derived from
/// the store id.
pub fn assign_order_number(
    scheme: NumberingScheme,
    order_type: OrderType,
    placed_at: DateTime<Utc>,
    id: u64,
    existing: &Records<Order>,
    rng: &mut impl Rng,
) -> Result<String, OrderError> {
    let taken = |candidate: &str| existing.values().any(|o| o.order_number == candidate);

    match scheme {
        NumberingScheme::Timestamp => {
            let millis = placed_at.timestamp_millis();
            for _ in 0..MAX_DIGIT_DRAWS {
                let candidate = generate_order_number(order_type, millis, rng.gen_range(0..10));
                if !taken(&candidate) {
                    return Ok(candidate);
                }
            }
            let fallback = format!("{}{:07}", order_type.prefix(), id % 10_000_000);
            if taken(&fallback) {
                return Err(OrderError::StoreError(format!("No free order number for id {}", id)));
            }
            tracing::warn!(order_number = %fallback, "Timestamp order numbers collided, using serial suffix");
            Ok(fallback)
        }
        NumberingScheme::DateSequential => {
            let candidate = date_sequential_order_number(placed_at.date_naive(), id);
            if taken(&candidate) {
                return Err(OrderError::StoreError(format!("Order number {} already issued", candidate)));
            }
            Ok(candidate)
        }
    }
}
