use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::specs::SpecItem;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct CreateSpecBody {
    pub group_id: i64,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkedSpec {
    pub spec_value_id: i64,
    pub linked: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RemovedSpec {
    pub removed: bool,
}

impl CreateSpecBody {
    /// Trimmed (key, value), or a validation error naming the blank field.
    pub(super) fn validated(&self, request_id: &str) -> Result<(&str, &str), ApiError> {
        let key = self.key.trim();
        let value = self.value.trim();
        if key.is_empty() {
            return Err(ApiError::new(
                request_id.to_string(),
                "validation_error",
                "spec key must not be empty",
            ));
        }
        if value.is_empty() {
            return Err(ApiError::new(
                request_id.to_string(),
                "validation_error",
                "spec value must not be empty",
            ));
        }
        Ok((key, value))
    }
}

/// Resolve the body's group/key/value into a spec_value id, creating the
/// key and value rows when they do not exist yet.
pub(super) async fn resolve_spec_value(
    pool: &sqlx::PgPool,
    body: &CreateSpecBody,
    request_id: &str,
) -> Result<i64, ApiError> {
    let (key, value) = body.validated(request_id)?;

    let key_id = specdb_db::upsert_spec_key(pool, body.group_id, key)
        .await
        .map_err(|e| map_db_error(request_id.to_string(), &e))?;
    specdb_db::upsert_spec_value(pool, key_id, value)
        .await
        .map_err(|e| map_db_error(request_id.to_string(), &e))
}

pub(super) async fn list_product_specs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SpecItem>>>, ApiError> {
    let rows = specdb_db::get_product_specs(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SpecItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_product_spec(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Json(body): Json<CreateSpecBody>,
) -> Result<Json<ApiResponse<LinkedSpec>>, ApiError> {
    let spec_value_id = resolve_spec_value(&state.pool, &body, &req_id.0).await?;

    let linked = specdb_db::link_product_spec(&state.pool, product_id, spec_value_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: LinkedSpec {
            spec_value_id,
            linked,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_product_spec(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((product_id, spec_value_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<RemovedSpec>>, ApiError> {
    let removed = specdb_db::unlink_product_spec(&state.pool, product_id, spec_value_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RemovedSpec { removed },
        meta: ResponseMeta::new(req_id.0),
    }))
}
