//! DTOs for add endpoints

use merkl_dag::Pin;
use merkl_domain::AddedOutput;
use serde::Serialize;
use utoipa::ToSchema;

/// One progress event of an add
#[derive(Debug, Serialize, ToSchema)]
pub struct AddedOutputDto {
    /// Path of the added entry
    #[schema(example = "docs/a.txt")]
    pub name: String,
    /// Identifier of the entry's root node
    #[schema(example = "f01a90212205e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8")]
    pub cid: String,
    /// Cumulative DAG size
    pub size: u64,
    /// File bytes consumed
    pub bytes: u64,
}

impl From<AddedOutput> for AddedOutputDto {
    fn from(output: AddedOutput) -> Self {
        Self {
            name: output.name,
            cid: output.cid.to_string(),
            size: output.size,
            bytes: output.bytes,
        }
    }
}

/// Response body for a successful add
#[derive(Debug, Serialize, ToSchema)]
pub struct AddResponse {
    /// Cluster root of the added content
    pub cid: String,
    /// Progress events, empty unless `progress=true`
    #[schema(example = json!([
        {"name": "site/index.html", "cid": "f01a90212205e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8", "size": 61, "bytes": 5}
    ]))]
    pub outputs: Vec<AddedOutputDto>,
}

/// A pinned root
#[derive(Debug, Serialize, ToSchema)]
pub struct PinDto {
    pub cid: String,
    /// RFC 3339 timestamp
    pub pinned_at: String,
}

impl From<Pin> for PinDto {
    fn from(pin: Pin) -> Self {
        Self {
            cid: pin.cid.to_string(),
            pinned_at: pin.pinned_at.to_rfc3339(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "Configuration error: unrecognized hash function: md4")]
    pub error: String,
}
