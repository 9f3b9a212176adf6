//! # postbox-core
//!
//! The headless contact-form runtime for Postbox.
//!
//! This crate provides:
//! - The four collaborator traits (`Validator`, `RenderingSurface`,
//!   `Transport`, `ChallengeSource`)
//! - The `SubmissionController` that drives validate → preview → confirm →
//!   send → feedback → reset, with a single-flight submission guard
//! - Payload builders for the preview and the message id sequence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postbox_core::{SubmissionController, traits::{RenderingSurface, Transport}};
//!
//! let controller = SubmissionController::new(validator, surface, transport, challenges, settings);
//! controller.request_preview()?;
//! controller.confirm_submit().await?;
//! ```

pub mod controller;
pub mod payload;
pub mod traits;

pub use controller::SubmissionController;
