//! Coupon entity: factory, field validators and lifecycle transitions
//!
//! Every mutator checks its guards before touching any field, so a rejected
//! call leaves the coupon exactly as it was.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{CouponError, StateError, ValidationError};
use super::request::CouponRequest;
use super::types::{CouponCode, CouponId, CouponStatus, DiscountValue, TimeStamp};

pub const MAX_DESCRIPTION_LEN: usize = 255;

#[derive(minicbor::Encode, minicbor::Decode, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[n(0)]
    id: CouponId,
    #[n(1)]
    code: CouponCode,
    #[n(2)]
    description: String,
    #[n(3)]
    discount_value: DiscountValue,
    #[n(4)]
    expiration_date: TimeStamp,
    #[n(5)]
    status: CouponStatus, // kept in step with the flags by every mutator
    #[n(6)]
    published: bool,
    #[n(7)]
    redeemed: bool,
    #[n(8)]
    redeemed_at: Option<TimeStamp>,
    #[n(9)]
    deleted_at: Option<TimeStamp>,
    // written by the store only
    #[n(10)]
    created_at: Option<TimeStamp>,
    #[n(11)]
    updated_at: Option<TimeStamp>,
}

impl Coupon {
    /// Validate the request and build a fresh coupon with a new id.
    pub fn create(request: &CouponRequest) -> Result<Self, ValidationError> {
        Self::create_at(request, Utc::now())
    }

    /// Fields are checked in the order code, expiration date, discount value,
    /// description; the first violation is returned.
    pub fn create_at(request: &CouponRequest, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let code = CouponCode::parse(request.code().unwrap_or_default())?;
        let expiration_date = validate_expiration_date(request.expiration_date(), now)?;
        let discount_value = validate_discount_value(request.discount_value())?;
        let description = validate_description(request.description())?;

        let published = request.published();
        let status = if published {
            CouponStatus::Active
        } else {
            CouponStatus::Inactive
        };

        Ok(Self {
            id: CouponId::new(),
            code,
            description,
            discount_value,
            expiration_date,
            status,
            published,
            redeemed: false,
            redeemed_at: None,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        })
    }

    pub fn publish(&mut self) -> Result<(), StateError> {
        if self.published {
            return Err(StateError::AlreadyPublished);
        }
        if self.is_deleted() {
            return Err(StateError::PublishDeleted);
        }
        self.published = true;
        self.status = CouponStatus::Active;
        Ok(())
    }

    /// Only the status changes; `published` stays set.
    pub fn deactivate(&mut self) -> Result<(), StateError> {
        if !self.published {
            return Err(StateError::NotPublished);
        }
        self.status = CouponStatus::Inactive;
        Ok(())
    }

    pub fn redeem(&mut self) -> Result<(), StateError> {
        self.redeem_at(Utc::now())
    }

    pub fn redeem_at(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        self.check_redeemable(now)?;
        self.redeemed = true;
        self.redeemed_at = Some(now.into());
        self.status = CouponStatus::Inactive;
        Ok(())
    }

    /// Soft delete. Flags other than the status are left alone.
    pub fn delete(&mut self) -> Result<(), StateError> {
        self.delete_at(Utc::now())
    }

    pub fn delete_at(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        if self.is_deleted() {
            return Err(StateError::AlreadyDeleted);
        }
        if self.redeemed {
            return Err(StateError::AlreadyRedeemed);
        }
        self.deleted_at = Some(now.into());
        self.status = CouponStatus::Inactive;
        Ok(())
    }

    /// Replace description and discount value, re-running the factory validators.
    pub fn update(
        &mut self,
        description: Option<&str>,
        discount_value: Option<Decimal>,
    ) -> Result<(), CouponError> {
        if self.is_deleted() {
            return Err(StateError::Deleted.into());
        }
        if self.redeemed {
            return Err(StateError::Redeemed.into());
        }
        let description = validate_description(description)?;
        let discount_value = validate_discount_value(discount_value)?;

        self.description = description;
        self.discount_value = discount_value;
        Ok(())
    }

    pub fn can_be_redeemed(&self) -> bool {
        self.can_be_redeemed_at(Utc::now())
    }

    pub fn can_be_redeemed_at(&self, now: DateTime<Utc>) -> bool {
        self.check_redeemable(now).is_ok()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date.to_datetime_utc()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Stamp the persistence timestamps. Meant for [`crate::store::CouponStore`]
    /// implementations; `created_at` is only set the first time.
    pub fn record_persisted(&mut self, at: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(at.into());
        }
        self.updated_at = Some(at.into());
    }

    // A rebuilt coupon takes over the record of the one it replaces.
    pub(crate) fn replacing(mut self, previous: &Coupon) -> Self {
        self.id = previous.id;
        self.created_at = previous.created_at;
        self
    }

    fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), StateError> {
        if self.redeemed {
            return Err(StateError::AlreadyRedeemed);
        }
        if self.is_deleted() {
            return Err(StateError::Deleted);
        }
        if self.is_expired_at(now) {
            return Err(StateError::Expired);
        }
        if !self.published {
            return Err(StateError::NotPublished);
        }
        Ok(())
    }

    pub fn id(&self) -> CouponId {
        self.id
    }
    pub fn code(&self) -> &CouponCode {
        &self.code
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn discount_value(&self) -> Decimal {
        self.discount_value.to_decimal()
    }
    pub fn expiration_date(&self) -> DateTime<Utc> {
        self.expiration_date.to_datetime_utc()
    }
    pub fn status(&self) -> CouponStatus {
        self.status
    }
    pub fn is_published(&self) -> bool {
        self.published
    }
    pub fn is_redeemed(&self) -> bool {
        self.redeemed
    }
    pub fn redeemed_at(&self) -> Option<DateTime<Utc>> {
        self.redeemed_at.map(|ts| ts.to_datetime_utc())
    }
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at.map(|ts| ts.to_datetime_utc())
    }
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.map(|ts| ts.to_datetime_utc())
    }
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at.map(|ts| ts.to_datetime_utc())
    }
}

fn validate_expiration_date(
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<TimeStamp, ValidationError> {
    let date = date.ok_or(ValidationError::MissingExpiration)?;
    if date <= now {
        return Err(ValidationError::ExpirationInPast);
    }
    Ok(date.into())
}

fn validate_discount_value(value: Option<Decimal>) -> Result<DiscountValue, ValidationError> {
    let value = value.ok_or(ValidationError::MissingDiscount)?;
    DiscountValue::parse(value)
}

// returns the trimmed description
fn validate_description(description: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = description.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankDescription);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(trimmed.to_string())
}
