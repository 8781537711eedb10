//! Configuration for modelsync.
//!
//! Handles the settings file, environment overrides and variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, MetadataSettings, ServerSettings, Settings, SettingsError, SyncSettings,
};
