//! Paths exposed by the backend settings service, relative to the base URL.

/// `GET`, followed by the setting key
pub const SETTINGS_GET: &str = "/settings/get";
/// `POST` with a `{ "key", "value" }` JSON body
pub const SETTINGS_SET: &str = "/settings/set";
/// `POST`, persists the in-memory settings on the backend
pub const SETTINGS_SAVE: &str = "/settings/save";
/// `GET`, reloads settings from the backend's storage
pub const SETTINGS_LOAD: &str = "/settings/load";
