//! # Status Relay Core
//!
//! Core business logic for the Status Relay SNS webhook receiver.
//!
//! This crate contains the domain logic for verifying SNS notification
//! payloads against their signing certificates, relaying data-message text
//! into a status file committed to a GitHub repository, and reporting
//! failures to an SNS alert topic.
//!
//! ## Architecture
//!
//! The core follows the same shape as the rest of the workspace:
//! - Business logic depends only on trait abstractions
//!   ([`notification::PayloadValidator`], [`secrets::ParameterStore`],
//!   [`alert::AlertPublisher`], [`status::StatusPublisher`])
//! - Infrastructure implementations (AWS SSM, AWS SNS, the GitHub Git Data
//!   API) are injected at runtime
//! - In-memory implementations of every trait exist for testing

pub mod alert;
pub mod notification;
pub mod secrets;
pub mod status;

pub use alert::{AlertError, AlertPublisher};
pub use notification::{
    NotificationKind, NotificationPayload, PayloadValidator, ValidatedNotification,
    ValidationError,
};
pub use secrets::{ParameterStore, ParameterStoreError};
pub use status::{ChannelLabel, StatusPublishError, StatusPublisher};
