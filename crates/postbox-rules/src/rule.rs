//! Rule set configuration schema.
//!
//! A `RuleSetConfig` is deserialized from TOML. It carries the controller's
//! `[form]` settings and an array of `[[fields]]` rules. Field names must be
//! unique; order in the file has no effect on evaluation.
//!
//! Example:
//! ```toml
//! [form]
//! notification_secs = 5
//!
//! [[fields]]
//! name = "email"
//! required = true
//! pattern = '^[^\s@]+@[^\s@]+\.[^\s@]+$'
//!
//! [fields.messages]
//! required = "Email is required"
//! ```

use serde::{Deserialize, Serialize};

use postbox_contracts::{settings::FormSettings, validation::FieldRule};

/// The top-level structure of a Postbox rules document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub form: FormSettings,

    #[serde(default)]
    pub fields: Vec<FieldRule>,
}
