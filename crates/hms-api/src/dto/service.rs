//! Service catalog DTOs

use hms_core::models::{ServiceFilter, ServiceSearchField, ServiceSummary, ServiceUpdate};
use hms_core::traits::Pagination;
use hms_services::NewService;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{default_page, default_page_size, trimmed_keyword};

/// Catalog search parameters
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListQuery {
    pub keyword: Option<String>,

    /// 1 name, 2 category, anything else name or category
    pub field: Option<i32>,

    /// Inclusive lower price bound
    pub from_price: Option<Decimal>,

    /// Inclusive upper price bound
    pub to_price: Option<Decimal>,

    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page_number: i64,

    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
}

impl ServiceListQuery {
    pub fn filter(&self) -> ServiceFilter {
        ServiceFilter {
            keyword: trimmed_keyword(self.keyword.as_deref()),
            field: ServiceSearchField::from_code(self.field),
            from_price: self.from_price,
            to_price: self.to_price,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_number, self.page_size)
    }
}

/// Create a catalog entry
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,

    /// Checked against the catalog rules, not here
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub image_url: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
}

impl From<CreateServiceRequest> for NewService {
    fn from(req: CreateServiceRequest) -> Self {
        Self {
            name: req.name,
            price: req.price,
            description: req.description,
            image_url: req.image_url,
            category: req.category,
        }
    }
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    pub image_url: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
}

impl From<UpdateServiceRequest> for ServiceUpdate {
    fn from(req: UpdateServiceRequest) -> Self {
        Self {
            name: req.name,
            price: req.price,
            description: req.description,
            image_url: req.image_url,
            category: req.category,
        }
    }
}

/// A catalog entry with its average rating
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub average_rating: f64,
}

impl From<ServiceSummary> for ServiceResponse {
    fn from(summary: ServiceSummary) -> Self {
        let service = summary.service;
        Self {
            id: service.id,
            name: service.name,
            price: service.price,
            image_url: service.image_url,
            description: service.description,
            category: service.category,
            average_rating: summary.average_rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRatingResponse {
    pub average_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_list_query_filter() {
        let query = ServiceListQuery {
            keyword: Some(" clean ".to_string()),
            field: Some(2),
            from_price: Some(dec!(100)),
            to_price: None,
            page_number: 2,
            page_size: 5,
        };

        let filter = query.filter();
        assert_eq!(filter.keyword.as_deref(), Some("clean"));
        assert_eq!(filter.field, ServiceSearchField::Category);
        assert_eq!(filter.from_price, Some(dec!(100)));
        assert_eq!(query.pagination().offset(), 5);
    }

    #[test]
    fn test_create_request_accepts_numeric_price() {
        let req: CreateServiceRequest = serde_json::from_str(
            r#"{"name": "Pipe repair", "price": 150000.5, "category": "Plumbing"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.price, dec!(150000.5));
    }

    #[test]
    fn test_update_request_is_partial() {
        let req: UpdateServiceRequest = serde_json::from_str(r#"{"price": 99}"#).unwrap();
        let update = ServiceUpdate::from(req);
        assert_eq!(update.price, Some(dec!(99)));
        assert!(update.name.is_none());

        let req: UpdateServiceRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(ServiceUpdate::from(req), ServiceUpdate::default());
    }
}
