//! # Fake News Detector
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Word-level prediction explanations
pub mod explain;

/// Article collection from the web
pub mod collectors;

/// Inference settings
pub mod config;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
