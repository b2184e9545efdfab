//! Service catalog
//!
//! Admin maintenance of the offered services and the public catalog
//! search. Listings carry the average rating from the rating store.

use hms_core::models::{Service, ServiceFilter, ServiceSummary, ServiceUpdate};
use hms_core::traits::{Page, Pagination, RatingRepository, ServiceRepository};
use hms_core::{AppError, AppResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
}

pub struct CatalogService<S: ?Sized, R: ?Sized> {
    services: Arc<S>,
    ratings: Arc<R>,
}

impl<S, R> CatalogService<S, R>
where
    S: ServiceRepository + ?Sized,
    R: RatingRepository + ?Sized,
{
    pub fn new(services: Arc<S>, ratings: Arc<R>) -> Self {
        Self { services, ratings }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, new: NewService) -> AppResult<Service> {
        if !Service::is_valid_price(new.price) {
            return Err(AppError::PriceInvalid);
        }

        let service = Service {
            name: new.name,
            price: new.price,
            description: new.description,
            image_url: new.image_url,
            category: new.category,
            ..Default::default()
        };
        let service = self.services.create(&service).await?;
        info!(service_id = service.id, "Service created");
        Ok(service)
    }

    /// Partial update of a service still in the catalog
    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, update: ServiceUpdate) -> AppResult<Service> {
        if update.price.is_some_and(|p| !Service::is_valid_price(p)) {
            return Err(AppError::PriceInvalid);
        }

        let mut service = self
            .services
            .find_available(id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        update.apply_to(&mut service);

        self.services.update(&service).await
    }

    /// Remove from the catalog; bookings and ratings stay
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.services.soft_delete(id).await? {
            return Err(AppError::ServiceNotFound);
        }
        info!(service_id = id, "Service deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &ServiceFilter,
        pagination: Pagination,
    ) -> AppResult<Page<ServiceSummary>> {
        let (services, total) = self
            .services
            .search(filter, pagination.limit(), pagination.offset())
            .await?;

        let mut items = Vec::with_capacity(services.len());
        for service in services {
            items.push(self.summarize(service).await?);
        }
        Ok(Page::new(items, total, pagination))
    }

    pub async fn get(&self, id: i32) -> AppResult<ServiceSummary> {
        let service = self
            .services
            .find_available(id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;
        self.summarize(service).await
    }

    /// Average score of a service, deleted or not
    pub async fn average_rating(&self, id: i32) -> AppResult<f64> {
        if self.services.find_by_id(id).await?.is_none() {
            return Err(AppError::ServiceNotFound);
        }
        self.ratings.average_for_service(id).await
    }

    async fn summarize(&self, service: Service) -> AppResult<ServiceSummary> {
        let average_rating = self.ratings.average_for_service(service.id).await?;
        Ok(ServiceSummary {
            service,
            average_rating,
        })
    }
}
