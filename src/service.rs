//! Service layer API for coupon lifecycle operations
use super::coupon::Coupon;
use super::error::{CouponError, Result, ValidationError};
use super::request::CouponRequest;
use super::store::CouponStore;
use super::types::{CouponCode, CouponId};

/// Loads coupons from the store, applies one entity operation and writes the result back.
///
/// Code uniqueness is checked here before writing so callers get a clear message;
/// the store's own constraint stays the authoritative guard.
pub struct CouponService<S> {
    store: S,
}

impl<S: CouponStore> CouponService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[tracing::instrument(name = "Find coupon", skip(self), fields(coupon_id = %id))]
    pub fn find_by_id(&self, id: &CouponId) -> Result<Coupon> {
        self.store
            .get(id)?
            .ok_or(CouponError::NotFound(*id))
    }

    /// Create and persist a new coupon
    #[tracing::instrument(name = "Create coupon", skip(self, request))]
    pub fn create(&self, request: &CouponRequest) -> Result<Coupon> {
        let code = CouponCode::parse(request.code().unwrap_or_default())?;
        self.validate_unique_code(&code)?;

        let coupon = Coupon::create(request)?;
        let coupon = self.store.save(coupon)?;

        tracing::info!(coupon_id = %coupon.id(), code = %coupon.code(), "coupon created");
        Ok(coupon)
    }

    /// Update description and discount value; a new code rebuilds the coupon from the request
    #[tracing::instrument(name = "Update coupon", skip(self, request), fields(coupon_id = %id))]
    pub fn update(&self, id: &CouponId, request: &CouponRequest) -> Result<Coupon> {
        let mut coupon = self.find_by_id(id)?;

        if coupon.is_deleted() {
            return Err(ValidationError::UpdateDeleted.into());
        }
        if !coupon.can_be_redeemed() && coupon.is_expired() {
            return Err(ValidationError::UpdateExpired.into());
        }

        // no code in the request keeps the current one
        let new_code = match request.code() {
            Some(raw) => Some(CouponCode::parse(raw)?).filter(|code| code != coupon.code()),
            None => None,
        };
        if let Some(code) = &new_code {
            self.validate_unique_code(code)?;
        }

        coupon.update(request.description(), request.discount_value())?;

        if new_code.is_some() {
            coupon = Coupon::create(request)?.replacing(&coupon);
        }

        let coupon = self.store.save(coupon)?;
        tracing::info!(code = %coupon.code(), "coupon updated");
        Ok(coupon)
    }

    #[tracing::instrument(name = "Delete coupon", skip(self), fields(coupon_id = %id))]
    pub fn delete(&self, id: &CouponId) -> Result<Coupon> {
        self.apply(id, |coupon| Ok(coupon.delete()?))
    }

    #[tracing::instrument(name = "Redeem coupon", skip(self), fields(coupon_id = %id))]
    pub fn redeem(&self, id: &CouponId) -> Result<Coupon> {
        self.apply(id, |coupon| Ok(coupon.redeem()?))
    }

    #[tracing::instrument(name = "Publish coupon", skip(self), fields(coupon_id = %id))]
    pub fn publish(&self, id: &CouponId) -> Result<Coupon> {
        self.apply(id, |coupon| Ok(coupon.publish()?))
    }

    #[tracing::instrument(name = "Deactivate coupon", skip(self), fields(coupon_id = %id))]
    pub fn deactivate(&self, id: &CouponId) -> Result<Coupon> {
        self.apply(id, |coupon| Ok(coupon.deactivate()?))
    }

    // load, mutate, save; nothing is written when the transition is refused
    fn apply<F>(&self, id: &CouponId, transition: F) -> Result<Coupon>
    where
        F: FnOnce(&mut Coupon) -> Result<()>,
    {
        let mut coupon = self.find_by_id(id)?;

        if let Err(e) = transition(&mut coupon) {
            tracing::warn!(reason = %e, "coupon transition refused");
            return Err(e);
        }

        let coupon = self.store.save(coupon)?;
        tracing::info!(status = %coupon.status(), "coupon transition applied");
        Ok(coupon)
    }

    fn validate_unique_code(&self, code: &CouponCode) -> Result<()> {
        if self.store.exists_by_code(code)? {
            return Err(ValidationError::DuplicateCode(code.to_string()).into());
        }
        Ok(())
    }
}
