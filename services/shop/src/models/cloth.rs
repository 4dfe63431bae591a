//! Cloth model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sellable clothing item
///
/// Price is stored in the smallest currency unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cloth {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New cloth creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClothRequest {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub description: Option<String>,
}

impl CreateClothRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.category.trim().is_empty() {
            errors.push("Category is required".to_string());
        }
        if self.price < 0 {
            errors.push("Price must not be negative".to_string());
        }

        errors
    }
}

/// Partial cloth update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClothRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
}

impl UpdateClothRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            errors.push("Name must not be empty".to_string());
        }
        if let Some(category) = &self.category
            && category.trim().is_empty()
        {
            errors.push("Category must not be empty".to_string());
        }
        if let Some(price) = self.price
            && price < 0
        {
            errors.push("Price must not be negative".to_string());
        }

        errors
    }
}

/// A cloth together with the summed quantity across its storages
#[derive(Debug, Clone, Serialize)]
pub struct ClothWithQuantity {
    #[serde(flatten)]
    pub cloth: Cloth,
    pub total_quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateClothRequest {
            name: "Batik Shirt".to_string(),
            category: "shirt".to_string(),
            price: 150_000,
            description: None,
        };
        assert!(valid.validate().is_empty());

        let invalid = CreateClothRequest {
            name: " ".to_string(),
            category: String::new(),
            price: -1,
            description: None,
        };
        assert_eq!(invalid.validate().len(), 3);
    }

    #[test]
    fn test_update_request_validation_only_checks_present_fields() {
        assert!(UpdateClothRequest::default().validate().is_empty());

        let invalid = UpdateClothRequest {
            price: Some(-10),
            ..Default::default()
        };
        assert_eq!(invalid.validate(), vec!["Price must not be negative"]);
    }
}
