//! Buy model, filters, and pagination payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed page size for buy listings
pub const PER_PAGE: u32 = 10;

/// A purchase fact linking a user and a cloth
///
/// `payment_status`: 0 = unpaid, 1 = paid.
/// `confirmation_status`: tri-state fulfillment marker (0/1/2).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Buy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cloth_id: Uuid,
    pub quantity: i32,
    pub payment_method: String,
    pub payment_status: i16,
    pub confirmation_status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New purchase payload
///
/// `user_id` may be omitted when the request carries a bearer token; staff
/// enter purchases on behalf of customers by setting it explicitly.
/// Client-supplied status fields are accepted but overridden to 0 by the
/// server.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBuyRequest {
    pub user_id: Option<Uuid>,
    pub cloth_id: Uuid,
    pub quantity: i32,
    pub payment_method: String,
    pub payment_status: Option<i16>,
    pub confirmation_status: Option<i16>,
}

impl CreateBuyRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.quantity < 1 {
            errors.push("Quantity must be at least 1".to_string());
        }
        if self.payment_method.trim().is_empty() {
            errors.push("Payment method is required".to_string());
        }

        errors
    }
}

/// Partial purchase update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBuyRequest {
    pub quantity: Option<i32>,
    pub payment_method: Option<String>,
    pub payment_status: Option<i16>,
    pub confirmation_status: Option<i16>,
}

impl UpdateBuyRequest {
    /// Shape validation; returns the list of violations
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(quantity) = self.quantity
            && quantity < 1
        {
            errors.push("Quantity must be at least 1".to_string());
        }
        if let Some(payment_method) = &self.payment_method
            && payment_method.trim().is_empty()
        {
            errors.push("Payment method must not be empty".to_string());
        }

        errors
    }
}

/// Attribute filters for buy listings
#[derive(Debug, Clone, Default)]
pub struct BuyFilter {
    pub payment_method: Option<String>,
    pub payment_status: Option<i16>,
    pub confirmation_status: Option<i16>,
}

impl BuyFilter {
    /// Filter validation; returns the list of violations
    ///
    /// `payment_status` accepts 0 or 1; `confirmation_status` 0, 1, or 2.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(payment_status) = self.payment_status
            && !(0..=1).contains(&payment_status)
        {
            errors.push("Payment status must be 0 or 1".to_string());
        }
        if let Some(confirmation_status) = self.confirmation_status
            && !(0..=2).contains(&confirmation_status)
        {
            errors.push("Confirmation status must be 0, 1, or 2".to_string());
        }

        errors
    }
}

/// Query parameters for buy listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyListQuery {
    /// 1-based page number
    pub buys_page: Option<u32>,
    /// Scope the listing to one user (admin view)
    pub user_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub payment_status: Option<i16>,
    pub confirmation_status: Option<i16>,
}

impl BuyListQuery {
    /// The 1-based page this query asks for
    pub fn page(&self) -> u32 {
        self.buys_page.unwrap_or(1).max(1)
    }

    /// The attribute filters carried by this query
    pub fn filter(&self) -> BuyFilter {
        BuyFilter {
            payment_method: self.payment_method.clone(),
            payment_status: self.payment_status,
            confirmation_status: self.confirmation_status,
        }
    }
}

/// Row offset for a 1-based page
pub fn page_offset(page: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(PER_PAGE)
}

/// Paginated buy listing response
#[derive(Debug, Clone, Serialize)]
pub struct BuyListResponse {
    pub items: Vec<Buy>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl BuyListResponse {
    /// Assemble a page of results with its pagination metadata
    pub fn new(items: Vec<Buy>, page: u32, total: i64) -> Self {
        Self {
            items,
            page,
            per_page: PER_PAGE,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateBuyRequest {
            user_id: None,
            cloth_id: Uuid::new_v4(),
            quantity: 1,
            payment_method: "transfer".to_string(),
            payment_status: None,
            confirmation_status: None,
        };
        assert!(valid.validate().is_empty());

        let invalid = CreateBuyRequest {
            user_id: None,
            cloth_id: Uuid::new_v4(),
            quantity: 0,
            payment_method: "  ".to_string(),
            payment_status: None,
            confirmation_status: None,
        };
        assert_eq!(invalid.validate().len(), 2);
    }

    #[test]
    fn test_update_request_validation() {
        assert!(UpdateBuyRequest::default().validate().is_empty());

        let invalid = UpdateBuyRequest {
            quantity: Some(0),
            ..Default::default()
        };
        assert_eq!(invalid.validate(), vec!["Quantity must be at least 1"]);
    }

    #[test]
    fn test_filter_validation_ranges() {
        let valid = BuyFilter {
            payment_method: Some("cash".to_string()),
            payment_status: Some(1),
            confirmation_status: Some(2),
        };
        assert!(valid.validate().is_empty());

        let invalid = BuyFilter {
            payment_method: None,
            payment_status: Some(2),
            confirmation_status: Some(3),
        };
        assert_eq!(invalid.validate().len(), 2);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 10);
        assert_eq!(page_offset(5), 40);
        // Page 0 is clamped to the first page.
        assert_eq!(page_offset(0), 0);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = BuyListQuery::default();
        assert_eq!(query.page(), 1);

        let query = BuyListQuery {
            buys_page: Some(0),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);

        let query = BuyListQuery {
            buys_page: Some(3),
            ..Default::default()
        };
        assert_eq!(query.page(), 3);
    }
}
