use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::product_specs::{resolve_spec_value, CreateSpecBody, LinkedSpec, RemovedSpec};
use super::specs::SpecItem;
use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn list_variant_specs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(variant_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SpecItem>>>, ApiError> {
    let rows = specdb_db::get_variant_specs(&state.pool, variant_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SpecItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_variant_spec(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(variant_id): Path<i64>,
    Json(body): Json<CreateSpecBody>,
) -> Result<Json<ApiResponse<LinkedSpec>>, ApiError> {
    let spec_value_id = resolve_spec_value(&state.pool, &body, &req_id.0).await?;

    let linked = specdb_db::link_variant_spec(&state.pool, variant_id, spec_value_id)
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

pub(super) async fn remove_variant_spec(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((variant_id, spec_value_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<RemovedSpec>>, ApiError> {
    let removed = specdb_db::unlink_variant_spec(&state.pool, variant_id, spec_value_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RemovedSpec { removed },
        meta: ResponseMeta::new(req_id.0),
    }))
}
