//! Display and settings helpers for the Riven media backend.

pub mod api;
pub mod config;
pub mod items;
pub mod util;

pub use api::{ApiClient, ApiError, RawResponse, SetSettingsResult, Settings};
pub use config::Config;
pub use items::{HasState, PlexDebridItem, StateGroups, group_by_state};
