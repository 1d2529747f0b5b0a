//! Discount coupon lifecycle: a validated coupon entity with a small state
//! machine, and a service that persists it through a [`store::CouponStore`].

pub mod coupon;
pub mod error;
pub mod request;
pub mod service;
pub mod settings;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use coupon::Coupon;
pub use error::{CouponError, StateError, StoreError, ValidationError};
pub use request::CouponRequest;
pub use service::CouponService;
pub use store::{CouponStore, SledCouponStore};
pub use types::{CouponCode, CouponId, CouponStatus};
