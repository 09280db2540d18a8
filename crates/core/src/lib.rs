//! Core business logic for Rentbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the [`rents::RentsRepository`] trait, implemented by the
//! db crate.
//!
//! # Modules
//!
//! - `rents` - Monthly rent snapshots, tenant sync, edit detection and saving

pub mod rents;
