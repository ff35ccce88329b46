//! # Hanzi Stats Core
//!
//! Shared logic for Hanzi deck statistics: data models, Hanzi character
//! extraction, reference catalog (HSK levels/bands and frequency bands),
//! deck-source abstraction, aggregation, and category breakdown.
//!
//! This crate contains no tokio runtime, sqlx, or terminal dependencies.
//! The only I/O it performs is reading the reference dataset CSV files.

pub mod aggregate;
pub mod breakdown;
pub mod catalog;
pub mod dataset;
pub mod extract;
pub mod models;
pub mod source;
