//! Outdoor advertising exposure engine
//!
//! This crate computes adjusted ROTS, corrected Reach and frequency for
//! selections of outdoor media units, with demographic breakdowns by gender
//! and age, and serves them over an HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
