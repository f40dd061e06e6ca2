//! Test utilities.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory implementations of every port for mocking persistence and email
//! - A builder for an `AppState` wired to those in-memory implementations

mod app_state_builder;
mod auth_mocks;
mod factories;
mod member_mocks;
mod otp_mocks;
mod visit_mocks;

pub use app_state_builder::*;
pub use auth_mocks::*;
pub use factories::*;
pub use member_mocks::*;
pub use otp_mocks::*;
pub use visit_mocks::*;
