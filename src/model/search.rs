//! Request bodies for the exact / like / in search endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldValue {
    pub field: String,
    pub value: Value,
}

/// `{"fields": [{"field": ..., "value": ...}, ...]}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub fields: Vec<FieldValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueItem {
    pub value: Value,
}

/// `{"field": ..., "values": [{"value": ...}, ...]}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InSearchRequest {
    pub field: String,
    pub values: Vec<ValueItem>,
}
