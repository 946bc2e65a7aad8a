use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct SpecGroupItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SpecKeyItem {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SpecValueItem {
    pub id: i64,
    pub key_id: i64,
    pub value: String,
}

/// A linked spec with its key and group resolved, as returned by the
/// product and variant spec listings.
#[derive(Debug, Serialize)]
pub(super) struct SpecItem {
    pub spec_value_id: i64,
    pub value: String,
    pub key: SpecItemRef,
    pub group: SpecItemRef,
}

#[derive(Debug, Serialize)]
pub(super) struct SpecItemRef {
    pub id: i64,
    pub name: String,
}

impl From<specdb_db::SpecDetailRow> for SpecItem {
    fn from(row: specdb_db::SpecDetailRow) -> Self {
        Self {
            spec_value_id: row.spec_value_id,
            value: row.value,
            key: SpecItemRef {
                id: row.key_id,
                name: row.key_name,
            },
            group: SpecItemRef {
                id: row.group_id,
                name: row.group_name,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateSpecGroupBody {
    name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedGroup {
    id: i64,
}

pub(super) async fn list_spec_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SpecGroupItem>>>, ApiError> {
    let rows = specdb_db::list_spec_groups(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|r| SpecGroupItem {
            id: r.id,
            name: r.name,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_spec_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSpecGroupBody>,
) -> Result<Json<ApiResponse<CreatedGroup>>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "group name must not be empty",
        ));
    }

    let id = specdb_db::upsert_spec_group(&state.pool, name)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CreatedGroup { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_spec_keys(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SpecKeyItem>>>, ApiError> {
    let rows = specdb_db::list_spec_keys(&state.pool, group_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|r| SpecKeyItem {
            id: r.id,
            group_id: r.group_id,
            name: r.name,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_spec_values(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SpecValueItem>>>, ApiError> {
    let rows = specdb_db::list_spec_values(&state.pool, key_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|r| SpecValueItem {
            id: r.id,
            key_id: r.key_id,
            value: r.value,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
