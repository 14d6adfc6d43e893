use serde::Deserialize;

use crate::error::ApiError;
use crate::products::repo::ProductPatch;

/// Body for product creation. `title`, `desc` and `img` are required and must
/// be non-empty; `price`, when given, must not be negative.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub img: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("desc", &self.description),
            ("img", &self.img),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} is required")));
            }
        }
        validate_price(self.price)
    }
}

/// Body for a partial product update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub img: Option<String>,
    pub price: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("desc", &self.description),
            ("img", &self.img),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() {
                    return Err(ApiError::Validation(format!("{field} must not be empty")));
                }
            }
        }
        validate_price(self.price)
    }

    pub fn into_patch(self) -> ProductPatch {
        ProductPatch {
            title: self.title,
            description: self.description,
            img: self.img,
            price: self.price,
            categories: self.categories,
            size: self.size,
            color: self.color,
        }
    }
}

fn validate_price(price: Option<f64>) -> Result<(), ApiError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(ApiError::Validation(
            "price must be a non-negative number".into(),
        )),
        _ => Ok(()),
    }
}
