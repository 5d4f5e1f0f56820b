//! Row to entity mappers
//!
//! `From<Model> for Entity` where every row is valid by schema constraints,
//! `TryFrom` where a text column must parse into a domain enum.

mod member;
mod notification;
mod schedule;
mod territory;

pub use member::members_from_rows;
