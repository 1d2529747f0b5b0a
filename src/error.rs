use crate::types::CouponId;

pub type Result<T> = std::result::Result<T, CouponError>;

/// A requested value or state violates a coupon business rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("code must not be blank")]
    BlankCode,
    #[error("code must be exactly 6 alphanumeric characters")]
    CodeLength,
    #[error("expiration date must not be null")]
    MissingExpiration,
    #[error("expiration date cannot be in the past")]
    ExpirationInPast,
    #[error("discount value must not be null")]
    MissingDiscount,
    #[error("minimum discount is 0.50")]
    DiscountTooLow,
    #[error("maximum discount is 100")]
    DiscountTooHigh,
    #[error("description must not be blank")]
    BlankDescription,
    #[error("description must not exceed 255 characters")]
    DescriptionTooLong,
    #[error("coupon with code {0} already exists")]
    DuplicateCode(String),
    #[error("cannot update a deleted coupon")]
    UpdateDeleted,
    #[error("cannot update an expired coupon")]
    UpdateExpired,
}

/// A lifecycle transition was attempted from a state that does not allow it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("coupon already published")]
    AlreadyPublished,
    #[error("cannot publish a deleted coupon")]
    PublishDeleted,
    #[error("coupon not published")]
    NotPublished,
    #[error("coupon already redeemed")]
    AlreadyRedeemed,
    #[error("coupon deleted")]
    Deleted,
    #[error("coupon expired")]
    Expired,
    #[error("coupon already deleted")]
    AlreadyDeleted,
    #[error("coupon redeemed")]
    Redeemed,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[error("failed to encode coupon record: {0}")]
    Encode(String),
    #[error("failed to decode coupon record: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("code {0} is already held by another coupon")]
    DuplicateCode(String),
}

#[derive(thiserror::Error, Debug)]
pub enum IdError {
    #[error("invalid coupon id encoding: {0}")]
    Decode(#[from] bech32::DecodeError),
    #[error("failed to encode coupon id: {0}")]
    Encode(#[from] bech32::EncodeError),
    #[error("expected a coupon_ id, got prefix {0}")]
    WrongPrefix(String),
    #[error("coupon id must carry 16 bytes, got {0}")]
    Length(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum CouponError {
    #[error("invalid coupon: {0}")]
    Invalid(#[from] ValidationError),
    #[error("illegal state: {0}")]
    IllegalState(#[from] StateError),
    #[error("coupon {0} not found")]
    NotFound(CouponId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status: {0}")]
pub struct UnknownStatus(pub String);
