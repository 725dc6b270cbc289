//! One tool handler per Falcon entity family. Each dispatches on `action`.

pub mod alerts;
pub mod detections;
pub mod host_groups;
pub mod hosts;
pub mod incidents;
pub mod iocs;
pub mod policies;
pub mod rtr;
pub mod vulnerabilities;

use crate::errors::ToolError;
use crate::falcon::{Ack, IdPage};
use serde::Serialize;
use serde_json::Value;

pub(crate) fn page_payload(page: IdPage) -> Value {
    serde_json::json!({
        "count": page.ids.len(),
        "ids": page.ids,
        "pagination": page.pagination,
    })
}

pub(crate) fn records_payload<T: Serialize>(
    key: &str,
    records: &[T],
    page: Option<IdPage>,
) -> Result<Value, ToolError> {
    let rendered = serde_json::to_value(records)
        .map_err(|err| ToolError::internal(format!("failed to encode {}: {}", key, err)))?;
    let mut payload = serde_json::json!({ "count": records.len() });
    payload[key] = rendered;
    if let Some(page) = page {
        payload["pagination"] = serde_json::to_value(page.pagination).unwrap_or(Value::Null);
    }
    Ok(payload)
}

pub(crate) fn ack_payload(ack: Ack) -> Value {
    serde_json::json!({ "success": ack.success, "message": ack.message })
}

pub(crate) fn record_payload<T: Serialize>(key: &str, record: &T) -> Result<Value, ToolError> {
    let rendered = serde_json::to_value(record)
        .map_err(|err| ToolError::internal(format!("failed to encode {}: {}", key, err)))?;
    let mut payload = serde_json::json!({});
    payload[key] = rendered;
    Ok(payload)
}
