//! Domain routes.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use lifeos_core::domains::{DomainDocument, DomainItem, DomainListing, RegistryEntry};
use lifeos_core::ids::sanitize_slug;
use serde::Deserialize;
use std::collections::BTreeMap;

/// GET /world/domains — registry merged with document bodies, drift
/// reported in `missing`.
pub async fn list(State(state): State<AppState>) -> Result<Json<DomainListing>, ApiError> {
    Ok(Json(state.domains.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateDomain {
    /// Defaults to a slug of `name`.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub document: DomainDocument,
}

/// POST /world/domains — create the document and its registry entry.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateDomain>,
) -> Result<Json<RegistryEntry>, ApiError> {
    let id = match body.id {
        Some(id) if !id.is_empty() => id,
        _ => {
            let slug = sanitize_slug(&body.name);
            if slug.is_empty() {
                return Err(ApiError::invalid("domain needs a name or an id"));
            }
            slug
        }
    };
    let entry = state.domains.create(&id, &body.name, &body.document).await?;
    Ok(Json(entry))
}

/// GET /world/domains/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DomainDocument>, ApiError> {
    Ok(Json(state.domains.get(&id).await?))
}

/// PUT /world/domains/:id — whole-document replace.
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(doc): Json<DomainDocument>,
) -> Result<Json<DomainDocument>, ApiError> {
    // Replace, not upsert: the document must already exist.
    state.domains.get(&id).await?;
    state.domains.save(&id, &doc).await?;
    Ok(Json(doc))
}

/// DELETE /world/domains/:id — removes the document only; the registry
/// entry stays and surfaces in the listing's `missing` set.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.domains.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    /// Which nested collection: `sections`, `principles`, `defined_modes`.
    pub array: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_yaml::Value>,
}

/// POST /world/domains/:id/items — insert a collection item with the next
/// free id and the array's defaults.
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddItem>,
) -> Result<Json<DomainItem>, ApiError> {
    let item = state.domains.add_item(&id, &body.array, body.fields).await?;
    Ok(Json(item))
}
