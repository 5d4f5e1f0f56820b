//! HTTP request handlers
//!
//! Each handler extracts its inputs and calls one service method.

pub mod auth;
pub mod duties;
pub mod groups;
pub mod health;
pub mod members;
pub mod notifications;
pub mod reports;
pub mod sms;
pub mod territories;
