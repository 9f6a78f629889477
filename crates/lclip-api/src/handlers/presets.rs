//! Style preset listing.

use axum::Json;

use lclip_models::StylePreset;

/// GET /api/presets
pub async fn list_presets() -> Json<Vec<StylePreset>> {
    Json(StylePreset::builtin())
}
