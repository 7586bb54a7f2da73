//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL preference store using Diesel.

pub mod persistence;
