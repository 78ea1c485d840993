use crate::config::MediaConfig;
use crate::entities::{
    MaterialType, advice_entity as advice, material_entity as materials, method_entity as methods,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Joins the media prefix and a stored file path; absolute URLs pass through.
pub fn document_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Clone)]
pub struct ContentService {
    pool: DatabaseConnection,
    media_base_url: String,
}

impl ContentService {
    pub fn new(pool: DatabaseConnection, media: &MediaConfig) -> Self {
        Self {
            pool,
            media_base_url: media.base_url.clone(),
        }
    }

    pub async fn advice(&self) -> AppResult<AdviceListResponse> {
        let rows = advice::Entity::find()
            .order_by_asc(advice::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(AdviceListResponse {
            advice: rows.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn methods(&self) -> AppResult<Vec<MethodResponse>> {
        let rows = methods::Entity::find()
            .order_by_asc(methods::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn method(&self, id: i32) -> AppResult<MethodResponse> {
        methods::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Method not found".to_string()))
    }

    fn to_response(&self, m: materials::Model) -> MaterialResponse {
        MaterialResponse {
            id: m.id,
            document_url: document_url(&self.media_base_url, &m.document),
            title: m.title,
            material_type: m.material_type,
        }
    }

    pub async fn materials(&self, material_type: Option<&str>) -> AppResult<Vec<MaterialResponse>> {
        let mut query = materials::Entity::find().order_by_asc(materials::Column::Id);
        if let Some(raw) = material_type.map(str::trim).filter(|s| !s.is_empty()) {
            let kind: MaterialType = raw.parse().map_err(|_| {
                AppError::ValidationError(format!("Unknown material type: {raw}"))
            })?;
            query = query.filter(materials::Column::MaterialType.eq(kind));
        }
        let rows = query.all(&self.pool).await?;
        Ok(rows.into_iter().map(|m| self.to_response(m)).collect())
    }

    /// First material of the given type.
    pub async fn material_by_type(&self, material_type: &str) -> AppResult<MaterialResponse> {
        let not_found = || AppError::NotFound("Material not found".to_string());
        let kind: MaterialType = material_type.parse().map_err(|_| not_found())?;
        materials::Entity::find()
            .filter(materials::Column::MaterialType.eq(kind))
            .order_by_asc(materials::Column::Id)
            .one(&self.pool)
            .await?
            .map(|m| self.to_response(m))
            .ok_or_else(not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        assert_eq!(
            document_url("https://cdn.example.com/media/", "/materials/guide.pdf"),
            "https://cdn.example.com/media/materials/guide.pdf"
        );
        assert_eq!(
            document_url("https://cdn.example.com/media", "materials/guide.pdf"),
            "https://cdn.example.com/media/materials/guide.pdf"
        );
        assert_eq!(
            document_url("https://cdn.example.com/media", "https://files.example.com/a.pdf"),
            "https://files.example.com/a.pdf"
        );
    }
}
