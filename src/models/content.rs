use crate::entities::{MaterialType, advice_entity, method_entity};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdviceResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
}

impl From<advice_entity::Model> for AdviceResponse {
    fn from(a: advice_entity::Model) -> Self {
        Self {
            id: a.id,
            title: a.title,
            content: a.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdviceListResponse {
    pub advice: Vec<AdviceResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MethodResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub details: Option<String>,
}

impl From<method_entity::Model> for MethodResponse {
    fn from(m: method_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            details: m.details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaterialResponse {
    pub id: i32,
    pub title: String,
    pub material_type: MaterialType,
    pub document_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialQuery {
    /// `methodichka` or `workbook`
    pub material_type: Option<String>,
}
