//! # postbox-contracts
//!
//! Shared types, payloads, and error contracts for the Postbox contact-form
//! controller.
//!
//! All crates in the workspace import from here. No controller or validation
//! logic lives in this crate — only data definitions, settings, and errors.

pub mod captcha;
pub mod error;
pub mod form;
pub mod notify;
pub mod settings;
pub mod submission;
pub mod validation;
