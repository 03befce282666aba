//! Command handlers

pub mod asset;
pub mod catalog;
pub mod config;
