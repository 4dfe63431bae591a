//! Storage model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stock record for a cloth
///
/// `quantity_limit` counts the units still sellable. Exactly one storage
/// per cloth carries `is_primary`; purchases reconcile against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Storage {
    pub id: Uuid,
    pub cloth_id: Uuid,
    pub quantity_limit: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New storage creation payload
///
/// The first storage created for a cloth becomes primary even when
/// `is_primary` is not set.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStorageRequest {
    pub cloth_id: Uuid,
    pub quantity_limit: i32,
    pub is_primary: Option<bool>,
}

impl CreateStorageRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.quantity_limit < 0 {
            errors.push("Quantity limit must not be negative".to_string());
        }

        errors
    }
}

/// Partial storage update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStorageRequest {
    pub quantity_limit: Option<i32>,
    pub is_primary: Option<bool>,
}

impl UpdateStorageRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(quantity_limit) = self.quantity_limit
            && quantity_limit < 0
        {
            errors.push("Quantity limit must not be negative".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateStorageRequest {
            cloth_id: Uuid::new_v4(),
            quantity_limit: 10,
            is_primary: None,
        };
        assert!(valid.validate().is_empty());

        let invalid = CreateStorageRequest {
            cloth_id: Uuid::new_v4(),
            quantity_limit: -5,
            is_primary: Some(true),
        };
        assert_eq!(
            invalid.validate(),
            vec!["Quantity limit must not be negative"]
        );
    }

    #[test]
    fn test_update_request_validation() {
        assert!(UpdateStorageRequest::default().validate().is_empty());

        let invalid = UpdateStorageRequest {
            quantity_limit: Some(-1),
            is_primary: None,
        };
        assert!(!invalid.validate().is_empty());
    }
}
