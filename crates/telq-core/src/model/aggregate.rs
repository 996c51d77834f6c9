use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One aggregation bucket: a group-by key set plus its computed values.
/// Key order is preserved as received from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AggregateBucket {
    #[serde(default)]
    pub by: Map<String, Value>,
    #[serde(default)]
    pub computes: Map<String, Value>,
}
