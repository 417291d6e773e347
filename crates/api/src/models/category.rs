//! Category domain type.

use serde::{Deserialize, Serialize};

use threadline_core::CategoryId;

/// A browsable product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_src: Option<String>,
    /// Grouping axis, e.g. "gender", "dress-style", "product-type".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub product_count: u32,
}
