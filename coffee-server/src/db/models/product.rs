//! Product Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::ProductCategory;
use surrealdb::RecordId;

pub type ProductId = RecordId;

pub const DEFAULT_RATINGS: f64 = 4.5;

fn default_ratings() -> f64 {
    DEFAULT_RATINGS
}

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: f64,
    /// Percentage in [0, 100]
    #[serde(default)]
    pub discount: f64,
    pub category: ProductCategory,
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Object key of the thumbnail
    #[serde(default)]
    pub thumbnail: String,
    /// Object keys of the gallery images
    #[serde(default)]
    pub images: Vec<String>,
    /// Id of the admin who created the product
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_ratings")]
    pub ratings: f64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Product {
    /// Every object key this product references
    pub fn object_keys(&self) -> Vec<String> {
        let mut keys = self.images.clone();
        if !self.thumbnail.is_empty() {
            keys.push(self.thumbnail.clone());
        }
        keys
    }
}

/// Create product payload
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub discount: f64,
    pub category: ProductCategory,
    pub summary: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub author: String,
}

/// Update product payload; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub category: Option<ProductCategory>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.discount.is_none()
            && self.category.is_none()
            && self.summary.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.thumbnail.is_none()
            && self.images.is_none()
    }
}
