//! Row <-> entity mappers
//!
//! Rows that already match an entity's shape decode straight into it;
//! the mappers here cover the ones that need reshaping.

mod blog;
mod message;
