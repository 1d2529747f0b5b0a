//! Field set accepted by the create and update operations
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

// Every field may be absent; the entity decides which absences are errors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CouponRequest {
    code: Option<String>,
    description: Option<String>,
    discount_value: Option<Decimal>,
    expiration_date: Option<DateTime<Utc>>,
    published: bool,
}

impl CouponRequest {
    /// Construct an empty request, fields are then filled with the setters
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
    pub fn set_discount_value(mut self, value: Decimal) -> Self {
        self.discount_value = Some(value);
        self
    }
    pub fn set_expiration_date(mut self, date: DateTime<Utc>) -> Self {
        self.expiration_date = Some(date);
        self
    }
    pub fn set_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    pub fn discount_value(&self) -> Option<Decimal> {
        self.discount_value
    }
    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
    }
    pub fn published(&self) -> bool {
        self.published
    }
}
