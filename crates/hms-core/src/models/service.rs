//! Service catalog model
//!
//! A service is an offering customers can book (plumbing, cleaning, ...).
//! Services are soft-deleted so bookings and ratings keep their history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Service entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier
    pub id: i32,

    /// Display name
    pub name: String,

    /// Price, never negative
    pub price: Decimal,

    /// Free-form description
    pub description: Option<String>,

    /// Image reference shown in the catalog
    pub image_url: Option<String>,

    /// Category used for grouping and search
    pub category: String,

    /// Set when an admin removes the service from the catalog
    pub deleted_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Digits after the decimal point the store keeps
    pub const PRICE_SCALE: u32 = 2;

    /// Exclusive upper bound of a storable price (NUMERIC(14,2))
    pub const PRICE_LIMIT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

    /// Check that the price is acceptable for the catalog: not negative,
    /// below [`Self::PRICE_LIMIT`] and without sub-cent digits
    pub fn is_valid_price(price: Decimal) -> bool {
        price >= Decimal::ZERO
            && price < Self::PRICE_LIMIT
            && price.normalize().scale() <= Self::PRICE_SCALE
    }

    /// Visible in the catalog and available for booking
    pub fn is_available(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl Default for Service {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            price: Decimal::ZERO,
            description: None,
            image_url: None,
            category: String::new(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial service update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl ServiceUpdate {
    /// Apply the update to a service in place
    pub fn apply_to(&self, service: &mut Service) {
        if let Some(name) = &self.name {
            service.name = name.clone();
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if let Some(description) = &self.description {
            service.description = Some(description.clone());
        }
        if let Some(image_url) = &self.image_url {
            service.image_url = Some(image_url.clone());
        }
        if let Some(category) = &self.category {
            service.category = category.clone();
        }
    }
}

/// Column matched by the catalog keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceSearchField {
    Name,
    Category,
    #[default]
    NameOrCategory,
}

impl ServiceSearchField {
    /// Map the numeric `field` query parameter (1 name, 2 category, 3 either)
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => Self::Name,
            Some(2) => Self::Category,
            _ => Self::NameOrCategory,
        }
    }

    /// Column selector understood by the SQL layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::NameOrCategory => "any",
        }
    }
}

/// Catalog search criteria
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub keyword: Option<String>,
    pub field: ServiceSearchField,
    /// Inclusive lower price bound
    pub from_price: Option<Decimal>,
    /// Inclusive upper price bound
    pub to_price: Option<Decimal>,
}

impl ServiceFilter {
    /// In-memory equivalent of the catalog search predicate
    pub fn matches(&self, service: &Service) -> bool {
        if !service.is_available() {
            return false;
        }

        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            let needle = keyword.to_lowercase();
            let name = service.name.to_lowercase().contains(&needle);
            let category = service.category.to_lowercase().contains(&needle);
            let hit = match self.field {
                ServiceSearchField::Name => name,
                ServiceSearchField::Category => category,
                ServiceSearchField::NameOrCategory => name || category,
            };
            if !hit {
                return false;
            }
        }

        self.from_price.map_or(true, |from| service.price >= from)
            && self.to_price.map_or(true, |to| service.price <= to)
    }
}

/// A catalog entry enriched with its average rating
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    pub service: Service,
    pub average_rating: f64,
}
