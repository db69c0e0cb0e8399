// Read-only champion catalog client.
//
// The catalog endpoint is Data-Dragon shaped (`{"data": {"Aatrox": {...}}}`)
// but a plain `[{"id", "name"}]` array is accepted too. The catalog is
// cosmetic: when it is unconfigured or unreachable the rest of the system
// runs with an empty list.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
    pub id: String,
    pub name: String,
}

pub struct ChampionCatalog {
    http: reqwest::Client,
    url: Option<String>,
}

impl ChampionCatalog {
    pub fn new(url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the champion catalog")?;
        Ok(Self { http, url })
    }

    /// Fetch the champion list, sorted by name. Any failure degrades to an
    /// empty list with a warning; callers never need a fallback path.
    pub async fn list(&self) -> Vec<Champion> {
        let Some(url) = &self.url else {
            info!("No catalog endpoint configured, champion list disabled");
            return Vec::new();
        };
        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Champion catalog unavailable: {e}");
                return Vec::new();
            }
        };
        let champions = parse_catalog(&body);
        if champions.is_empty() {
            warn!("Champion catalog at {url} yielded no entries");
        } else {
            info!("Loaded {} champions from catalog", champions.len());
        }
        champions
    }

    async fn fetch(&self, url: &str) -> Result<Value, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// Extract `{id, name}` entries from a catalog document, sorted by name.
/// Entries missing either field are skipped.
fn parse_catalog(body: &Value) -> Vec<Champion> {
    let entries: Vec<&Value> = match body.get("data") {
        Some(Value::Object(map)) => map.values().collect(),
        _ => match body.as_array() {
            Some(list) => list.iter().collect(),
            None => return Vec::new(),
        },
    };

    let mut champions: Vec<Champion> = entries
        .into_iter()
        .filter_map(|entry| {
            Some(Champion {
                id: entry.get("id")?.as_str()?.to_string(),
                name: entry.get("name")?.as_str()?.to_string(),
            })
        })
        .collect();
    champions.sort_by(|a, b| a.name.cmp(&b.name));
    champions
}
