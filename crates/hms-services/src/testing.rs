//! In-memory repositories
//!
//! [`MemoryStore`] implements every repository trait over one set of
//! tables behind a mutex. It enforces the same guarantees as the SQL
//! schema: unique email (ignoring case) and phone, one rating per
//! booking, guarded booking transitions, and user writes that leave role
//! and active flag alone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hms_core::models::{
    normalize_email, Booking, BookingDetails, BookingFilter, BookingScope, BookingStatus,
    EmployeeSearchField, ProfileUpdate, Rating, RevokedToken, Service, ServiceFilter, User,
    UserRole,
};
use hms_core::traits::{
    BookingRepository, RatingRepository, Repository, RevokedTokenRepository, ServiceRepository,
    UserRepository,
};
use hms_core::{AppError, AppResult};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    services: Vec<Service>,
    bookings: Vec<Booking>,
    ratings: Vec<Rating>,
    revoked: HashMap<String, RevokedToken>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Mirror of the users_email_key / users_phone_number_key constraints
    fn check_unique_user(&self, user: &User) -> AppResult<()> {
        let others = self.users.iter().filter(|u| u.id != user.id);
        for other in others {
            if normalize_email(&other.email) == normalize_email(&user.email) {
                return Err(AppError::EmailExists);
            }
            if other.phone_number == user.phone_number {
                return Err(AppError::PhoneExists);
            }
        }
        Ok(())
    }

    fn details(&self, booking: &Booking) -> BookingDetails {
        let service = self.services.iter().find(|s| s.id == booking.service_id);
        let name_of = |id: i32| {
            self.users
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.full_name.clone())
        };

        BookingDetails {
            booking: booking.clone(),
            service_name: service.map(|s| s.name.clone()).unwrap_or_default(),
            service_price: service.map(|s| s.price).unwrap_or_default(),
            customer_name: name_of(booking.customer_id).unwrap_or_default(),
            employee_name: booking.employee_id.and_then(name_of),
            has_rated: self.ratings.iter().any(|r| r.booking_id == booking.id),
        }
    }

    /// Apply a status change if the guard holds
    fn transition(
        &mut self,
        id: i32,
        guard: impl Fn(&Booking) -> bool,
        apply: impl FnOnce(&mut Booking),
    ) -> bool {
        match self.bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) if guard(booking) => {
                apply(booking);
                booking.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}

fn page<T: Clone>(items: &[T], limit: i64, offset: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

/// Every repository, in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user row directly, bypassing the services
    pub fn insert_user(&self, mut user: User) -> User {
        let mut tables = self.tables.lock();
        user.id = tables.next_id();
        tables.users.push(user.clone());
        user
    }

    /// Insert a service row directly
    pub fn insert_service(&self, mut service: Service) -> Service {
        let mut tables = self.tables.lock();
        service.id = tables.next_id();
        tables.services.push(service.clone());
        service
    }

    /// Insert a booking row directly, in any state
    pub fn insert_booking(&self, mut booking: Booking) -> Booking {
        let mut tables = self.tables.lock();
        booking.id = tables.next_id();
        tables.bookings.push(booking.clone());
        booking
    }

    /// Current state of a booking
    pub fn booking(&self, id: i32) -> Option<Booking> {
        self.tables.lock().bookings.iter().find(|b| b.id == id).cloned()
    }

    /// Number of stored ratings
    pub fn rating_count(&self) -> usize {
        self.tables.lock().ratings.len()
    }

    /// Number of entries in the revocation set
    pub fn revoked_count(&self) -> usize {
        self.tables.lock().revoked.len()
    }
}

#[async_trait]
impl Repository<User, i32> for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.tables.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, entity: &User) -> AppResult<User> {
        let mut tables = self.tables.lock();
        let mut user = entity.clone();
        user.id = 0;
        user.email = normalize_email(&user.email);
        tables.check_unique_user(&user)?;
        user.id = tables.next_id();
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, entity: &User) -> AppResult<User> {
        let mut tables = self.tables.lock();
        tables.check_unique_user(entity)?;
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == entity.id)
            .ok_or(AppError::UserNotFound)?;
        slot.full_name = entity.full_name.clone();
        slot.email = normalize_email(&entity.email);
        slot.phone_number = entity.phone_number.clone();
        slot.password_hash = entity.password_hash.clone();
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == normalize_email(email))
            .cloned())
    }

    async fn update_profile(&self, id: i32, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let mut tables = self.tables.lock();
        let Some(mut user) = tables.users.iter().find(|u| u.id == id).cloned() else {
            return Ok(None);
        };
        update.apply_to(&mut user);
        user.email = normalize_email(&user.email);
        tables.check_unique_user(&user)?;

        // only the profile columns are written back
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::UserNotFound)?;
        slot.full_name = user.full_name;
        slot.email = user.email;
        slot.phone_number = user.phone_number;
        slot.updated_at = Utc::now();
        Ok(Some(slot.clone()))
    }

    async fn set_password_hash(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        let mut tables = self.tables.lock();
        Ok(match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.phone_number == phone)
            .cloned())
    }

    async fn toggle_active(&self, id: i32) -> AppResult<Option<User>> {
        let mut tables = self.tables.lock();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.active = !user.active;
            user.clone()
        }))
    }

    async fn list_by_role(
        &self,
        role: UserRole,
        keyword: Option<&str>,
        field: EmployeeSearchField,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let tables = self.tables.lock();
        let keyword = keyword.filter(|k| !k.is_empty());
        let matching: Vec<User> = tables
            .users
            .iter()
            .filter(|u| u.role == role)
            .filter(|u| keyword.map_or(true, |k| field.matches(u, k)))
            .cloned()
            .collect();

        Ok((page(&matching, limit, offset), matching.len() as i64))
    }
}

#[async_trait]
impl Repository<Service, i32> for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Service>> {
        Ok(self
            .tables
            .lock()
            .services
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn create(&self, entity: &Service) -> AppResult<Service> {
        Ok(self.insert_service(entity.clone()))
    }

    async fn update(&self, entity: &Service) -> AppResult<Service> {
        let mut tables = self.tables.lock();
        let slot = tables
            .services
            .iter_mut()
            .find(|s| s.id == entity.id && s.is_available())
            .ok_or(AppError::ServiceNotFound)?;
        *slot = entity.clone();
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn find_available(&self, id: i32) -> AppResult<Option<Service>> {
        Ok(self
            .tables
            .lock()
            .services
            .iter()
            .find(|s| s.id == id && s.is_available())
            .cloned())
    }

    async fn soft_delete(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.lock();
        match tables
            .services
            .iter_mut()
            .find(|s| s.id == id && s.is_available())
        {
            Some(service) => {
                service.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search(
        &self,
        filter: &ServiceFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Service>, i64)> {
        let tables = self.tables.lock();
        let matching: Vec<Service> = tables
            .services
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        Ok((page(&matching, limit, offset), matching.len() as i64))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Booking>> {
        Ok(self.booking(id))
    }

    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        Ok(self.insert_booking(Booking {
            status: BookingStatus::Pending,
            employee_id: None,
            ..booking.clone()
        }))
    }

    async fn claim(&self, id: i32, employee_id: i32) -> AppResult<bool> {
        Ok(self.tables.lock().transition(
            id,
            |b| b.status == BookingStatus::Pending,
            |b| {
                b.status = BookingStatus::Accepted;
                b.employee_id = Some(employee_id);
            },
        ))
    }

    async fn complete(&self, id: i32, employee_id: i32) -> AppResult<bool> {
        Ok(self.tables.lock().transition(
            id,
            |b| b.status == BookingStatus::Accepted && b.is_bound_to(employee_id),
            |b| b.status = BookingStatus::Completed,
        ))
    }

    async fn cancel(&self, id: i32, customer_id: i32) -> AppResult<bool> {
        Ok(self.tables.lock().transition(
            id,
            |b| b.status == BookingStatus::Pending && b.is_owned_by(customer_id),
            |b| b.status = BookingStatus::Cancelled,
        ))
    }

    async fn find_details(&self, id: i32) -> AppResult<Option<BookingDetails>> {
        let tables = self.tables.lock();
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .map(|b| tables.details(b)))
    }

    async fn list(
        &self,
        scope: BookingScope,
        filter: &BookingFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookingDetails>, i64)> {
        let tables = self.tables.lock();
        let mut matching: Vec<BookingDetails> = tables
            .bookings
            .iter()
            .filter(|b| scope.permits(b))
            .map(|b| tables.details(b))
            .filter(|d| filter.matches(d))
            .collect();
        matching.sort_by(|a, b| {
            b.booking
                .created_at
                .cmp(&a.booking.created_at)
                .then(b.booking.id.cmp(&a.booking.id))
        });

        Ok((page(&matching, limit, offset), matching.len() as i64))
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn find_by_booking(&self, booking_id: i32) -> AppResult<Option<Rating>> {
        Ok(self
            .tables
            .lock()
            .ratings
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned())
    }

    async fn create(&self, rating: &Rating) -> AppResult<Rating> {
        let mut tables = self.tables.lock();
        if tables.ratings.iter().any(|r| r.booking_id == rating.booking_id) {
            return Err(AppError::AlreadyRated);
        }
        let mut rating = rating.clone();
        rating.id = tables.next_id();
        tables.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn average_for_service(&self, service_id: i32) -> AppResult<f64> {
        let tables = self.tables.lock();
        let scores: Vec<i16> = tables
            .ratings
            .iter()
            .filter(|r| {
                tables
                    .bookings
                    .iter()
                    .any(|b| b.id == r.booking_id && b.service_id == service_id)
            })
            .map(|r| r.score)
            .collect();

        Ok(hms_core::models::average_score(&scores))
    }

    async fn has_rated_completed(&self, service_id: i32, customer_id: i32) -> AppResult<bool> {
        let tables = self.tables.lock();
        Ok(tables.bookings.iter().any(|b| {
            b.service_id == service_id
                && b.customer_id == customer_id
                && b.status == BookingStatus::Completed
                && tables.ratings.iter().any(|r| r.booking_id == b.id)
        }))
    }
}

#[async_trait]
impl RevokedTokenRepository for MemoryStore {
    async fn revoke(&self, token: &RevokedToken) -> AppResult<()> {
        self.tables
            .lock()
            .revoked
            .entry(token.jti.clone())
            .or_insert_with(|| token.clone());
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.tables.lock().revoked.contains_key(jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.revoked.len();
        tables.revoked.retain(|_, entry| !entry.is_stale(now));
        Ok((before - tables.revoked.len()) as u64)
    }
}
