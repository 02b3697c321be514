/*
 * Responsibility
 * - 汎用 resource の request/response DTO
 * - query の validation は to_filter() に持たせる
 */
use serde::{Deserialize, Serialize};

use crate::services::store::ListFilter;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    // Case-insensitive substring to look for
    pub q: Option<String>,
    // Field to search; defaults to the resource's search field
    pub field: Option<String>,
}

impl ListQuery {
    pub fn to_filter(
        &self,
        default_field: Option<&str>,
    ) -> Result<Option<ListFilter>, &'static str> {
        let Some(needle) = self.q.as_deref().filter(|q| !q.is_empty()) else {
            return Ok(None);
        };

        let field = self
            .field
            .as_deref()
            .or(default_field)
            .ok_or("this resource has no default search field; pass `field`")?;

        if field.trim().is_empty() || field.starts_with('$') || field.contains('\0') {
            return Err("invalid field name");
        }

        Ok(Some(ListFilter::new(field, needle)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: String,
    pub inserted_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreatedResponse {
    pub message: String,
    pub inserted_count: usize,
    pub inserted_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedResponse {
    pub message: String,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted: bool,
}
