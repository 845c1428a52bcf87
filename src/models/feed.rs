use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::domain::LocationRecord;

/// Top-level document served by the location feed
///
/// Elements are kept undecoded so one malformed location cannot reject the
/// whole snapshot; see [`LocationFeed::into_records`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationFeed {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub locations: Vec<Value>,
}

impl LocationFeed {
    /// Decode every location, logging and skipping the ones that don't parse
    pub fn into_records(self) -> Vec<LocationRecord> {
        self.locations
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let name = value
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>")
                    .to_string();

                match serde_json::from_value::<LocationRecord>(value) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(index, name = %name, error = %e, "Skipping malformed location");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Deserialize a string that the feed may send as `null`
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize a list that the feed may send as `null`
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
