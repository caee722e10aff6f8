//! Registration and sync flows: create the user at the identity provider,
//! then mirror it into the local tables. These run as sequential statements
//! without a shared transaction, so a mid-flow failure can leave the provider
//! user without its local records; callers retry by re-registering.

use crate::config::ResourceConfig;
use crate::error::ApiError;
use crate::identity::{create_user_with_phone_fallback, IdentityError, NewIdentityUser};
use crate::service::CrudService;
use crate::state::AppState;
use crate::{password, phone};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Allow-list used when a registration flow creates the company record.
const CONSTRUCTORA_REGISTER_COLUMNS: &[&str] = &[
    "user_id",
    "nombre_empresa",
    "rfc",
    "telefono",
    "email",
    "direccion",
    "plan_id",
];

/// Allow-list used when a registration flow creates or merges the engineer record.
const RESIDENTE_REGISTER_COLUMNS: &[&str] = &[
    "user_id",
    "constructora_id",
    "telefono",
    "nombre",
    "apellidos",
    "email",
    "is_active",
];

const ASIGNACION_COLUMNS: &[&str] = &[
    "residente_id",
    "obra_id",
    "fecha_inicio",
    "fecha_fin",
    "is_active",
    "motivo_cambio",
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
    #[serde(default)]
    pub user_data: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct SyncRequest {
    pub provider_uid: Option<String>,
}

fn provider_error(e: IdentityError, message: &str) -> ApiError {
    match e {
        IdentityError::EmailExists => ApiError::EmailTaken,
        other => ApiError::Internal {
            message: message.to_string(),
            detail: Some(other.to_string()),
        },
    }
}

fn str_field<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn normalized_phone(data: &Map<String, Value>) -> Option<String> {
    str_field(data, "telefono").and_then(phone::normalize)
}

fn residente_display_name(data: &Map<String, Value>) -> Option<String> {
    let name = [str_field(data, "nombre"), str_field(data, "apellidos")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    (!name.is_empty()).then_some(name)
}

/// `POST /api/auth/register`: create the provider user and the local
/// records for the requested user type.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(pass), Some(user_type)) = (req.email, req.password, req.user_type)
    else {
        return Err(ApiError::BadRequest(
            "Email, password y userType son requeridos".into(),
        ));
    };

    let (phone, display_name) = match (user_type.as_str(), req.user_data.as_ref()) {
        ("residente", Some(data)) => (normalized_phone(data), residente_display_name(data)),
        ("constructora", Some(data)) => (
            normalized_phone(data),
            str_field(data, "nombre_empresa")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        ),
        _ => (None, None),
    };

    let created = create_user_with_phone_fallback(
        state.identity.as_ref(),
        NewIdentityUser {
            email: email.clone(),
            password: pass,
            phone,
            display_name,
        },
    )
    .await
    .map_err(|e| provider_error(e, "Error registrando usuario"))?;

    let user = CrudService::query_opt(
        &state.pool,
        "INSERT INTO users (provider_uid, email, user_type) VALUES ($1, $2, $3) \
         RETURNING id, provider_uid, email, user_type",
        &[json!(created.uid), json!(email), json!(user_type)],
    )
    .await?
    .ok_or(ApiError::Db(sqlx::Error::RowNotFound))?;
    let user_id = user.get("id").cloned().unwrap_or(Value::Null);

    if let Some(mut body) = req.user_data {
        let config = match user_type.as_str() {
            "constructora" => Some(ResourceConfig::new(
                "constructoras",
                CONSTRUCTORA_REGISTER_COLUMNS,
            )),
            "residente" => Some(ResourceConfig::new("residentes", RESIDENTE_REGISTER_COLUMNS)),
            _ => None,
        };
        if let Some(config) = config {
            body.insert("user_id".into(), user_id);
            CrudService::create(&state.pool, &config, &body).await?;
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Usuario registrado exitosamente",
            "user": user,
            "providerUid": created.uid,
        })),
    ))
}

/// `POST /api/auth/sync`: resolve (or create) the local user row for an
/// already-existing provider uid.
pub async fn sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(uid) = req.provider_uid.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("provider_uid requerido".into()));
    };

    let existing = CrudService::query_opt(
        &state.pool,
        "SELECT id FROM users WHERE provider_uid = $1",
        &[json!(uid)],
    )
    .await?;
    if let Some(row) = existing {
        return Ok((StatusCode::OK, Json(json!({ "user_id": row["id"] }))));
    }

    // The local row needs an email; when the provider cannot answer,
    // synthesize one from the uid.
    let (email, full_name, phone) = match state.identity.fetch_user(&uid).await {
        Ok(u) => (
            u.email.unwrap_or_else(|| format!("user-{uid}@identity.local")),
            u.display_name,
            u.phone,
        ),
        Err(_) => (format!("user-{uid}@identity.local"), None, None),
    };

    let created = CrudService::query_opt(
        &state.pool,
        "INSERT INTO users (provider_uid, email, full_name, phone) VALUES ($1, $2, $3, $4) RETURNING id",
        &[json!(uid), json!(email), json!(full_name), json!(phone)],
    )
    .await?
    .ok_or(ApiError::Db(sqlx::Error::RowNotFound))?;
    Ok((StatusCode::CREATED, Json(json!({ "user_id": created["id"] }))))
}

/// `POST /api/constructoras/register`: provider user + local user + company
/// record in one flow.
pub async fn register_constructora(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut data = match body {
        Value::Object(m) => m,
        _ => return Err(ApiError::BadRequest("se esperaba un objeto JSON".into())),
    };
    let email = data
        .remove("email")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let pass = data
        .remove("password")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let company_phone = normalized_phone(&data);
    let display_name = str_field(&data, "nombre_empresa")
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let created = create_user_with_phone_fallback(
        state.identity.as_ref(),
        NewIdentityUser {
            email: email.clone(),
            password: pass,
            phone: company_phone.clone(),
            display_name: display_name.clone(),
        },
    )
    .await
    .map_err(|e| provider_error(e, "Error registrando constructora"))?;

    let user_email = created.email.unwrap_or(email);
    let user_name = created.display_name.or(display_name);
    let user_phone = created.phone.or(company_phone);
    let user = CrudService::query_opt(
        &state.pool,
        "INSERT INTO users (provider_uid, email, full_name, phone) VALUES ($1, $2, $3, $4) RETURNING id",
        &[json!(created.uid), json!(user_email), json!(user_name), json!(user_phone)],
    )
    .await?
    .ok_or(ApiError::Db(sqlx::Error::RowNotFound))?;

    data.insert("user_id".into(), user["id"].clone());
    let config = ResourceConfig::new("constructoras", CONSTRUCTORA_REGISTER_COLUMNS);
    let company = CrudService::create(&state.pool, &config, &data).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// `POST /api/residentes/register`: provider user + local user + engineer
/// record. An engineer already known by phone number is merged in place
/// instead of duplicated; an optional `obra_id` (re)assigns the work site.
pub async fn register_residente(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut data = match body {
        Value::Object(m) => m,
        _ => return Err(ApiError::BadRequest("se esperaba un objeto JSON".into())),
    };
    let email = data
        .remove("email")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let password = data
        .remove("password")
        .and_then(|v| v.as_str().map(|s| s.trim().to_string()))
        .filter(|s| s.len() >= 6)
        .unwrap_or_else(|| password::generate_strong(12));

    let resident_phone = normalized_phone(&data);
    let display_name = residente_display_name(&data);

    let created = create_user_with_phone_fallback(
        state.identity.as_ref(),
        NewIdentityUser {
            email: email.clone(),
            password,
            phone: resident_phone.clone(),
            display_name: display_name.clone(),
        },
    )
    .await
    .map_err(|e| provider_error(e, "Error registrando residente"))?;

    let user_email = created
        .email
        .filter(|e| !e.is_empty())
        .or_else(|| (!email.is_empty()).then_some(email))
        .unwrap_or_else(|| format!("user-{}@identity.local", created.uid));
    let user_name = created.display_name.or(display_name);
    let user_phone = created.phone.or(resident_phone);
    let user = CrudService::query_opt(
        &state.pool,
        "INSERT INTO users (provider_uid, email, full_name, phone) VALUES ($1, $2, $3, $4) RETURNING id",
        &[json!(created.uid), json!(user_email), json!(user_name), json!(user_phone)],
    )
    .await?
    .ok_or(ApiError::Db(sqlx::Error::RowNotFound))?;

    // Lookup by the raw phone as supplied, not the normalized form: that is
    // what earlier imports stored.
    let telefono = data.get("telefono").cloned().unwrap_or(Value::Null);
    let existing = CrudService::query_opt(
        &state.pool,
        "SELECT * FROM residentes WHERE telefono = $1",
        &[telefono.clone()],
    )
    .await?;

    let obra_id = data.get("obra_id").cloned().filter(|v| !v.is_null());

    if let Some(existing) = existing {
        let merged = merge_residente(&existing, &data, &user["id"], &telefono);
        let config = ResourceConfig::new("residentes", RESIDENTE_REGISTER_COLUMNS).has_updated_at(false);
        let q = crate::sql::build_update(&config, &existing["id"], &merged)?;
        let updated = CrudService::fetch_returning(&state.pool, &q)
            .await?
            .ok_or_else(ApiError::not_found)?;
        if let Some(obra_id) = obra_id {
            assign_obra(&state, &updated["id"], &obra_id).await;
        }
        Ok((StatusCode::OK, Json(updated)))
    } else {
        data.insert("user_id".into(), user["id"].clone());
        let config = ResourceConfig::new("residentes", RESIDENTE_REGISTER_COLUMNS);
        let resident = CrudService::create(&state.pool, &config, &data).await?;
        if let Some(obra_id) = obra_id {
            assign_obra(&state, &resident["id"], &obra_id).await;
        }
        Ok((StatusCode::CREATED, Json(resident)))
    }
}

/// Merge semantics for a re-registered engineer: supplied fields win, stored
/// values are kept otherwise, and an already-linked user_id is never replaced.
fn merge_residente(
    existing: &Value,
    data: &Map<String, Value>,
    new_user_id: &Value,
    telefono: &Value,
) -> Map<String, Value> {
    let keep = |key: &str| -> Value {
        match data.get(key) {
            Some(v) if !v.is_null() => v.clone(),
            _ => existing.get(key).cloned().unwrap_or(Value::Null),
        }
    };
    let user_id = match existing.get("user_id") {
        Some(v) if !v.is_null() => v.clone(),
        _ => new_user_id.clone(),
    };
    let is_active = match data.get("is_active") {
        Some(Value::Bool(b)) => Value::Bool(*b),
        _ => existing.get("is_active").cloned().unwrap_or(Value::Null),
    };

    let mut merged = Map::new();
    merged.insert("user_id".into(), user_id);
    merged.insert("constructora_id".into(), keep("constructora_id"));
    merged.insert("telefono".into(), telefono.clone());
    merged.insert("nombre".into(), keep("nombre"));
    merged.insert("apellidos".into(), keep("apellidos"));
    merged.insert("email".into(), keep("email"));
    merged.insert("is_active".into(), is_active);
    merged
}

/// Close any active assignment for the engineer and open a new one.
/// Best-effort: a failure here is logged and the registration still succeeds.
async fn assign_obra(state: &AppState, residente_id: &Value, obra_id: &Value) {
    let close = CrudService::execute(
        &state.pool,
        "UPDATE asignaciones_obra SET is_active = false, fecha_fin = NOW() \
         WHERE residente_id = $1 AND is_active = true",
        &[residente_id.clone()],
    )
    .await;
    if let Err(e) = close {
        tracing::error!(error = %e, "error cerrando asignaciones previas");
        return;
    }

    let mut body = Map::new();
    body.insert("residente_id".into(), residente_id.clone());
    body.insert("obra_id".into(), obra_id.clone());
    body.insert("is_active".into(), Value::Bool(true));
    let config = ResourceConfig::new("asignaciones_obra", ASIGNACION_COLUMNS);
    if let Err(e) = CrudService::create(&state.pool, &config, &body).await {
        tracing::error!(error = %e, "error creando asignación de obra");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn residente_display_name_joins_present_parts() {
        assert_eq!(
            residente_display_name(&map(json!({"nombre": "Ana", "apellidos": "Ruiz"}))),
            Some("Ana Ruiz".into())
        );
        assert_eq!(
            residente_display_name(&map(json!({"nombre": "Ana"}))),
            Some("Ana".into())
        );
        assert_eq!(residente_display_name(&map(json!({}))), None);
    }

    #[test]
    fn merge_keeps_existing_link_and_fills_gaps() {
        let existing = json!({
            "id": 9,
            "user_id": "11111111-1111-1111-1111-111111111111",
            "constructora_id": 3,
            "telefono": "5512345678",
            "nombre": "Ana",
            "apellidos": "Ruiz",
            "email": "ana@obra.mx",
            "is_active": false
        });
        let data = map(json!({"nombre": "Ana María", "is_active": true}));
        let merged = merge_residente(
            &existing,
            &data,
            &json!("22222222-2222-2222-2222-222222222222"),
            &json!("5512345678"),
        );
        assert_eq!(merged["user_id"], json!("11111111-1111-1111-1111-111111111111"));
        assert_eq!(merged["nombre"], json!("Ana María"));
        assert_eq!(merged["apellidos"], json!("Ruiz"));
        assert_eq!(merged["is_active"], json!(true));
        assert_eq!(merged["constructora_id"], json!(3));
    }

    #[test]
    fn merge_links_new_user_when_unlinked() {
        let existing = json!({"id": 9, "user_id": null, "telefono": "5512345678"});
        let merged = merge_residente(&existing, &map(json!({})), &json!("new-uid"), &json!("5512345678"));
        assert_eq!(merged["user_id"], json!("new-uid"));
    }
}
