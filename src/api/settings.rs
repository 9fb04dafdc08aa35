use constants::endpoints;
use futures::future::try_join_all;
use serde::{Serialize, ser::SerializeMap as _};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, RawResponse};

/// Setting values in the order they were requested.
///
/// `None` means the service did not answer with a success status for that key, which is
/// distinct from a setting whose value is JSON `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    entries: Vec<(String, Option<Value>)>,
}
impl Settings {
    /// The value of `key`, if it was fetched successfully
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).and_then(Option::as_ref)
    }

    /// `None` if `key` was never requested, `Some(None)` if fetching it failed
    pub fn entry(&self, key: &str) -> Option<&Option<Value>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn into_inner(self) -> Vec<(String, Option<Value>)> {
        self.entries
    }
}
// Failed keys serialize as null, the shape the web frontend consumes.
impl Serialize for Settings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Outcome of [`ApiClient::set_settings`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SetSettingsResult {
    /// One entry per setting, in the order they were given. `None` for rejected settings.
    pub results: Vec<Option<Value>>,
    pub save: RawResponse,
    pub load: RawResponse,
}
impl SetSettingsResult {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }
}

#[derive(Serialize)]
struct SetSettingRequest<'a> {
    key: &'a str,
    value: &'a Value,
}

impl ApiClient {
    /// Fetches a single setting. Returns `Ok(None)` if the service answers with a
    /// non-success status.
    pub async fn get_setting(&self, key: &str) -> Result<Option<Value>, ApiError> {
        let url = self.url(&format!("{}/{key}", endpoints::SETTINGS_GET));
        tracing::debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Setting {key} unavailable ({status})");
            return Ok(None);
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|error| ApiError::Decode {
                key: key.to_string(),
                error,
            })?;
        Ok(Some(value))
    }

    /// Fetches all `keys` concurrently.
    ///
    /// Keys the service rejects map to `None`. Any transport failure fails the whole call.
    /// A repeated key is fetched once and keeps the position of its first occurrence.
    pub async fn get_settings<K: AsRef<str>>(&self, keys: &[K]) -> Result<Settings, ApiError> {
        let mut unique = Vec::<&str>::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }

        let values = try_join_all(unique.iter().map(|key| self.get_setting(key))).await?;

        Ok(Settings {
            entries: unique
                .into_iter()
                .map(str::to_string)
                .zip(values)
                .collect(),
        })
    }

    /// Sets a single setting without saving it. Returns the service's JSON answer, or
    /// `Ok(None)` if it rejected the value.
    pub async fn set_setting(&self, key: &str, value: &Value) -> Result<Option<Value>, ApiError> {
        let url = self.url(endpoints::SETTINGS_SET);
        tracing::debug!("POST {url} ({key})");

        let response = self
            .client
            .post(url)
            .json(&SetSettingRequest { key, value })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Setting {key} rejected ({status})");
            return Ok(None);
        }

        let answer = response
            .json::<Value>()
            .await
            .map_err(|error| ApiError::Decode {
                key: key.to_string(),
                error,
            })?;
        Ok(Some(answer))
    }

    /// Sets every entry concurrently, then saves and reloads the backend's settings.
    ///
    /// Save and load are sent even if some settings were rejected, and load is only sent
    /// once save has answered. Nothing is rolled back.
    pub async fn set_settings<K, I>(&self, entries: I) -> Result<SetSettingsResult, ApiError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let entries = entries.into_iter().collect::<Vec<_>>();
        let results = try_join_all(
            entries
                .iter()
                .map(|(key, value)| self.set_setting(key.as_ref(), value)),
        )
        .await?;

        let save = self.save_settings().await?;
        let load = self.load_settings().await?;

        Ok(SetSettingsResult {
            results,
            save,
            load,
        })
    }

    /// Asks the backend to persist its current settings.
    pub async fn save_settings(&self) -> Result<RawResponse, ApiError> {
        let url = self.url(endpoints::SETTINGS_SAVE);
        tracing::debug!("POST {url}");
        let response = RawResponse::read(self.client.post(url).send().await?).await?;
        tracing::info!("Saved settings ({})", response.status);
        Ok(response)
    }

    /// Asks the backend to reload its settings from storage.
    pub async fn load_settings(&self) -> Result<RawResponse, ApiError> {
        let url = self.url(endpoints::SETTINGS_LOAD);
        tracing::debug!("GET {url}");
        let response = RawResponse::read(self.client.get(url).send().await?).await?;
        tracing::info!("Loaded settings ({})", response.status);
        Ok(response)
    }
}
