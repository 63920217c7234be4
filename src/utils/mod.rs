// src/utils/mod.rs

//! Utility functions and helpers.

pub mod decode;
pub mod delay;
pub mod html;
pub mod http;
pub mod log;
