//! Manifest loading: the list of plans a batch converts.
//!
//! The manifest is a JSON object with a `plans` array. Each entry carries
//! the metadata printed in the document header plus the `filename` of the
//! source document in the raw directory:
//!
//! ```json
//! {
//!   "plans": [
//!     {
//!       "documentCode": "HS-ISR-2025",
//!       "filename": "ISR Compensation Plan 2025.pdf",
//!       "title": "Inside Sales Representative Compensation Plan",
//!       "division": "Dental",
//!       "role": "Inside Sales Representative",
//!       "effectiveDate": "2025-01-01",
//!       "planYear": 2025,
//!       "version": "1.0",
//!       "status": "Active"
//!     }
//!   ]
//! }
//! ```

use crate::error::BatchError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

/// One plan document and its header metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    /// Unique key; also the output file stem.
    pub document_code: String,
    pub filename: String,
    pub title: String,
    pub division: String,
    pub role: String,
    pub effective_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub plan_year: String,
    #[serde(deserialize_with = "string_or_number")]
    pub version: String,
    pub status: String,
}

/// The ordered collection of plans for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub plans: Vec<PlanRecord>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl std::str::FromStr for Manifest {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

/// Read and parse the manifest. Any failure here is fatal for the batch.
pub async fn load_manifest(path: &Path) -> Result<Manifest, BatchError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

    let manifest: Manifest = raw.parse().map_err(|source| BatchError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} plans from {}", manifest.len(), path.display());
    Ok(manifest)
}

/// Hand-edited manifests write `planYear: 2025` as often as `"2025"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s,
        Loose::Number(n) => n.to_string(),
    })
}
