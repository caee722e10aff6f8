//! Fixed-query domain lookups used by the frontend.

use crate::error::ApiError;
use crate::handlers::resource::parse_id;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

/// `GET /api/constructoras/by-user/:user_id`: newest company owned by the user.
pub async fn constructora_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = CrudService::query_opt(
        &state.pool,
        "SELECT * FROM constructoras WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        &[parse_id(&user_id)],
    )
    .await?
    .ok_or(ApiError::NotFound("Constructora no encontrada"))?;
    Ok(Json(row))
}

/// `GET /api/obras/by-residente/:residente_id`: the work site behind the
/// engineer's active assignment, newest assignment first.
pub async fn obra_by_residente(
    State(state): State<AppState>,
    Path(residente_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = CrudService::query_opt(
        &state.pool,
        "SELECT o.* FROM obras o \
         JOIN asignaciones_obra ao ON o.id = ao.obra_id \
         WHERE ao.residente_id = $1 AND ao.is_active = true \
         ORDER BY ao.fecha_inicio DESC \
         LIMIT 1",
        &[parse_id(&residente_id)],
    )
    .await?
    .ok_or(ApiError::NotFound("Obra no encontrada para el residente"))?;
    Ok(Json(row))
}
