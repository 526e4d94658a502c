//! Shared test utilities for the checkreport workspace.
//!
//! This crate provides:
//! - **arb**: Proptest strategies for generating consistent analyzer stores
//! - **store_builder**: A fluent builder for store dumps
//! - **schema**: JSON schema validators for DTOs
//! - **fixtures**: Common test fixtures (sample stores and configs)
//!
//! # Example
//!
//! ```rust,ignore
//! use checkreport_testkit::arb;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     fn store_has_a_root_context(dump in arb::arb_store_dump()) {
//!         assert!(dump.call_contexts.iter().any(|c| c.call_id.is_none()));
//!     }
//! }
//! ```

pub mod arb;
pub mod fixtures;
pub mod schema;
pub mod store_builder;

// Re-export commonly used items
pub use arb::{
    arb_analyses_filter, arb_check_kind, arb_check_spec, arb_checker, arb_defaults, arb_interval,
    arb_report_format, arb_status, arb_status_filter, arb_store_dump, statuses_for, CheckSpec,
};
pub use fixtures::{sample_configs, sample_stores};
pub use schema::{validate_config_file, validate_store_dump, validate_store_json};
pub use store_builder::StoreBuilder;
