//! Domain model for day annotations.
//!
//! # Responsibility
//! - Define calendar day identity and its canonical key.
//! - Define the annotation record attached to a day.
//!
//! # Invariants
//! - Day identity never carries time-of-day.
//! - Annotation lookup uses `DateKey` only.

pub mod annotation;
pub mod date;
