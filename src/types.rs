//! Value types shared by the coupon entity, its store and the service
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use uuid7::uuid7;

use crate::error::{IdError, UnknownStatus, ValidationError};
use crate::utils::{bech32_to_bytes, bytes_to_bech32, coupon_hrp};

pub const CODE_LENGTH: usize = 6;

/// 0.50
pub const MIN_DISCOUNT: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// 100.00
pub const MAX_DISCOUNT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 2);

/// Opaque coupon identifier: the raw bytes of a uuid7, shown as a `coupon_` bech32m string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CouponId([u8; 16]);

/// Alphanumeric uppercase code of exactly [`CODE_LENGTH`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CouponCode(String);

/// Discount within `[MIN_DISCOUNT, MAX_DISCOUNT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DiscountValue(Decimal);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TimeStamp(DateTime<Utc>);

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CouponStatus {
    #[n(0)]
    Active,
    #[n(1)]
    Inactive,
}

impl CouponId {
    pub fn new() -> Self {
        Self(*uuid7().as_bytes())
    }
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        let raw: [u8; 16] = bytes
            .try_into()
            .map_err(|_| IdError::Length(bytes.len()))?;
        Ok(Self(raw))
    }
}

impl Default for CouponId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CouponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bytes_to_bech32(coupon_hrp(), &self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for CouponId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bech32_to_bytes(coupon_hrp(), s.trim())?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for CouponId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl CouponCode {
    /// Drops every character outside `[A-Za-z0-9]` and uppercases what is left.
    pub fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    /// Rejects blank input, then requires the normalized form to be exactly six characters.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::BlankCode);
        }
        let normalized = Self::normalize(raw);
        if normalized.len() != CODE_LENGTH {
            return Err(ValidationError::CodeLength);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CouponCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl DiscountValue {
    /// Both bounds are inclusive.
    pub fn parse(value: Decimal) -> Result<Self, ValidationError> {
        if value < MIN_DISCOUNT {
            return Err(ValidationError::DiscountTooLow);
        }
        if value > MAX_DISCOUNT {
            return Err(ValidationError::DiscountTooHigh);
        }
        Ok(Self(value))
    }

    pub fn to_decimal(&self) -> Decimal {
        self.0
    }
}

impl TimeStamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

impl CouponStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, CouponStatus::Active)
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponStatus::Active => f.write_str("ACTIVE"),
            CouponStatus::Inactive => f.write_str("INACTIVE"),
        }
    }
}

impl FromStr for CouponStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(CouponStatus::Active),
            "INACTIVE" => Ok(CouponStatus::Inactive),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl<C> minicbor::Encode<C> for CouponId {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.0)?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CouponId {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let bytes = d.bytes()?;

        CouponId::from_slice(bytes)
            .map_err(|_| minicbor::decode::Error::message("coupon id must be 16 bytes"))
    }
}

impl<C> minicbor::Encode<C> for CouponCode {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.str(&self.0)?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CouponCode {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        Ok(CouponCode(d.str()?.to_owned()))
    }
}

impl<C> minicbor::Encode<C> for DiscountValue {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.0.serialize())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for DiscountValue {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let raw: [u8; 16] = d
            .bytes()?
            .try_into()
            .map_err(|_| minicbor::decode::Error::message("discount value must be 16 bytes"))?;

        Ok(DiscountValue(Decimal::deserialize(raw)))
    }
}

// encoded as [seconds, subsecond nanos] so the full chrono range survives a round trip
impl<C> minicbor::Encode<C> for TimeStamp {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?
            .i64(self.0.timestamp())?
            .u32(self.0.timestamp_subsec_nanos())?
            .ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        if d.array()? != Some(2) {
            return Err(minicbor::decode::Error::message(
                "timestamp must be a [secs, nanos] pair",
            ));
        }
        let secs = d.i64()?;
        let nanos = d.u32()?;

        DateTime::from_timestamp(secs, nanos)
            .map(TimeStamp)
            .ok_or_else(|| minicbor::decode::Error::message("timestamp out of range"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn coupon_id_display_parses_back() {
        let original = CouponId::new();

        let rendered = original.to_string();
        assert!(rendered.starts_with("coupon_1"));
        assert_eq!(rendered.parse::<CouponId>().unwrap(), original);
    }

    #[test]
    fn coupon_ids_are_unique() {
        assert_ne!(CouponId::new(), CouponId::new());
    }

    #[test]
    fn coupon_id_rejects_short_payload() {
        let short = bytes_to_bech32(coupon_hrp(), &[1, 2, 3]).unwrap();
        assert!(matches!(short.parse::<CouponId>(), Err(IdError::Length(3))));
    }

    #[test]
    fn normalize_strips_symbols_and_uppercases() {
        assert_eq!(CouponCode::normalize("no#v@o!26"), "NOVO26");
        assert_eq!(CouponCode::normalize(" a-b c_1 "), "ABC1");
        assert_eq!(CouponCode::normalize("çafé12"), "AF12");
    }

    #[test]
    fn parse_reports_blank_before_length() {
        assert_eq!(CouponCode::parse("   "), Err(ValidationError::BlankCode));
        assert_eq!(CouponCode::parse("#!@"), Err(ValidationError::CodeLength));
        assert_eq!(CouponCode::parse("ABC"), Err(ValidationError::CodeLength));
        assert_eq!(CouponCode::parse("abc1234"), Err(ValidationError::CodeLength));
        assert_eq!(CouponCode::parse("abc-123").unwrap().as_str(), "ABC123");
    }

    #[test]
    fn discount_bounds_are_inclusive() {
        assert!(DiscountValue::parse(Decimal::new(50, 2)).is_ok());
        assert!(DiscountValue::parse(Decimal::new(100, 0)).is_ok());
        assert_eq!(
            DiscountValue::parse(Decimal::new(49, 2)),
            Err(ValidationError::DiscountTooLow)
        );
        assert_eq!(
            DiscountValue::parse(Decimal::new(10_001, 2)),
            Err(ValidationError::DiscountTooHigh)
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("active".parse::<CouponStatus>(), Ok(CouponStatus::Active));
        assert_eq!("INACTIVE".parse::<CouponStatus>(), Ok(CouponStatus::Inactive));
        assert_eq!(
            "paused".parse::<CouponStatus>(),
            Err(UnknownStatus("paused".into()))
        );
        assert!(CouponStatus::Active.is_active());
        assert!(!CouponStatus::Inactive.is_active());
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&CouponStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
    }

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::now();

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: TimeStamp = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn timestamp_encoding_past_year_2262() {
        let original = TimeStamp::from(Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap());

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: TimeStamp = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn timestamp_decoding_rejects_bare_integer() {
        let encoding = minicbor::to_vec(1_700_000_000i64).unwrap();
        assert!(minicbor::decode::<TimeStamp>(&encoding).is_err());
    }

    #[test]
    fn discount_encoding_keeps_scale() {
        let original = DiscountValue::parse(Decimal::new(1050, 2)).unwrap();

        let encoding = minicbor::to_vec(original).unwrap();
        let decode: DiscountValue = minicbor::decode(&encoding).unwrap();

        assert_eq!(decode.to_decimal().to_string(), "10.50");
    }
}
