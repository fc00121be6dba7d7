//! Snapshot export of the current filtered and sorted view.

use std::path::Path;

use models::Record;

use crate::errors::ServiceError;

/// File name offered for downloads of the snapshot.
pub const EXPORT_FILE_NAME: &str = "public-apis-export.json";

/// Pretty-printed JSON array of the rows.
pub fn to_json(rows: &[Record]) -> Result<String, ServiceError> {
    serde_json::to_string_pretty(rows).map_err(ServiceError::storage)
}

/// Write the snapshot to `path`.
pub async fn write_json(rows: &[Record], path: &Path) -> Result<(), ServiceError> {
    let json = to_json(rows)?;
    tokio::fs::write(path, json).await.map_err(ServiceError::storage)
}
