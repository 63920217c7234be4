// src/lib.rs

//! Company aggregator library.
//!
//! Collects advertising, BTL and souvenir companies from business
//! directories, tax open data and agency ratings, filters them by revenue
//! and profile, labels their market segment and exports one merged table.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;
