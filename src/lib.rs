//! ROI Lead Generation API Library
//!
//! This library provides the ROI calculator engine and the lead capture
//! service around it: configuration, database stores, HTTP handlers for the
//! public calculator and the admin console.
//!
//! # Modules
//!
//! - `api`: HTTP-layer namespace.
//! - `core`: Domain namespace (engine, input coercion, models, errors).
//! - `data`: Data access namespace.
//! - `obs`: Observability and logging.
//! - `admin_handlers`: Admin auth, lead triage, export and benefits CMS.
//! - `config`: Configuration management.
//! - `csv_export`: Lead CSV rendering.
//! - `db`: Database connection and schema setup.
//! - `db_storage`: ROI defaults, strategic benefits and lead stores.
//! - `errors`: Error handling types.
//! - `form_input`: Coercion of loosely typed form values.
//! - `handlers`: Public HTTP handlers and shared state.
//! - `models`: Database rows and API payloads.
//! - `roi_calculator`: Pure ROI engine.
//! - `router`: Route table and middleware stack.
//! - `session`: Admin sessions and the auth middleware.
//! - `validation`: Email and phone checks.

pub mod api;
pub mod core;
pub mod data;
pub mod obs;

// Re-export primary modules for shared use in tests and other binaries
pub mod admin_handlers;
pub mod config;
pub mod csv_export;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod form_input;
pub mod handlers;
pub mod models;
pub mod roi_calculator;
pub mod router;
pub mod session;
pub mod validation;
