//! # Conference Controller Test Utilities
//!
//! Shared test utilities for the Switchroom conference controller.
//!
//! This crate provides mock implementations and test fixtures for isolated
//! conference testing without a real telephony control plane.
//!
//! ## Modules
//!
//! - `mock_control_plane` - In-memory control plane recording every command
//! - `fixtures` - Pre-configured test data (config, channels)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use conf_test_utils::fixtures::test_config;
//! use conf_test_utils::mock_control_plane::{IssuedCommand, MockControlPlane};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     // Control plane that rejects bridge creation
//!     let control = MockControlPlane::builder()
//!         .fail_create_bridge()
//!         .build();
//!
//!     // Drive the orchestration against it, then assert on the command
//!     // log:
//!     assert!(control.commands().is_empty());
//! }
//! ```

pub mod fixtures;
pub mod mock_control_plane;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_control_plane::*;
