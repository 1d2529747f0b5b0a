//! Persistence collaborator of the coupon service
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sled::Transactional;
use sled::transaction::{ConflictableTransactionError, TransactionError};

use super::coupon::Coupon;
use super::error::StoreError;
use super::types::{CouponCode, CouponId};

const COUPONS_TREE: &str = "coupons";
const CODES_TREE: &str = "codes";

/// Single-record reads and writes keyed by [`CouponId`], plus the code lookup.
///
/// `save` is an upsert by id. Implementations own the `created_at`/`updated_at`
/// stamps and must refuse a code already held by a different coupon.
pub trait CouponStore {
    fn get(&self, id: &CouponId) -> Result<Option<Coupon>, StoreError>;
    fn save(&self, coupon: Coupon) -> Result<Coupon, StoreError>;
    fn exists_by_code(&self, code: &CouponCode) -> Result<bool, StoreError>;
}

/// Coupons in a sled tree keyed by id bytes, with a second tree mapping code -> id.
pub struct SledCouponStore {
    instance: Arc<sled::Db>,
    coupons: sled::Tree,
    codes: sled::Tree,
}

impl SledCouponStore {
    pub fn new(instance: Arc<sled::Db>) -> Result<Self, StoreError> {
        let coupons = instance.open_tree(COUPONS_TREE)?;
        let codes = instance.open_tree(CODES_TREE)?;
        Ok(Self {
            instance,
            coupons,
            codes,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::new(Arc::new(db))
    }

    /// Flush dirty pages to disk, returning the number of bytes written.
    pub fn flush(&self) -> Result<usize, StoreError> {
        Ok(self.instance.flush()?)
    }
}

impl CouponStore for SledCouponStore {
    fn get(&self, id: &CouponId) -> Result<Option<Coupon>, StoreError> {
        match self.coupons.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "Persist coupon record", skip(self, coupon), fields(coupon_id = %coupon.id()))]
    fn save(&self, mut coupon: Coupon) -> Result<Coupon, StoreError> {
        coupon.record_persisted(Utc::now());

        let key = *coupon.id().as_bytes();
        let code = coupon.code().clone();
        let encoded = minicbor::to_vec(&coupon).map_err(|e| StoreError::Encode(e.to_string()))?;

        // both trees move together so the code index never disagrees with the records
        (&self.coupons, &self.codes)
            .transaction(|(coupons, codes)| {
                if let Some(owner) = codes.get(code.as_str())?
                    && owner[..] != key[..]
                {
                    return Err(ConflictableTransactionError::Abort(
                        StoreError::DuplicateCode(code.to_string()),
                    ));
                }
                if let Some(bytes) = coupons.get(&key[..])? {
                    let previous: Coupon = minicbor::decode(&bytes)
                        .map_err(|e| ConflictableTransactionError::Abort(StoreError::Decode(e)))?;
                    if previous.code() != &code {
                        codes.remove(previous.code().as_str())?;
                    }
                }
                codes.insert(code.as_str(), &key[..])?;
                coupons.insert(&key[..], encoded.as_slice())?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => StoreError::Sled(e),
            })?;

        tracing::debug!(code = %code, "coupon record written");
        Ok(coupon)
    }

    fn exists_by_code(&self, code: &CouponCode) -> Result<bool, StoreError> {
        Ok(self.codes.contains_key(code.as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    use super::*;
    use crate::request::CouponRequest;

    fn coupon(code: &str) -> Coupon {
        let request = CouponRequest::new()
            .set_code(code)
            .set_description("Store test")
            .set_discount_value(Decimal::new(5, 0))
            .set_expiration_date(Utc::now() + Duration::days(10));
        Coupon::create(&request).unwrap()
    }

    fn sled_store() -> anyhow::Result<(tempfile::TempDir, SledCouponStore)> {
        // one database per test, sled holds a file lock on the path
        let temp_dir = tempdir()?;
        let store = SledCouponStore::open(temp_dir.path().join("store.db"))?;
        Ok((temp_dir, store))
    }

    fn far_future() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn sled_save_then_get() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        let saved = store.save(coupon("ABC123"))?;
        assert!(saved.created_at().is_some());
        assert_eq!(saved.created_at(), saved.updated_at());

        let loaded = store.get(&saved.id())?;
        assert_eq!(loaded, Some(saved));
        Ok(())
    }

    #[test]
    fn sled_get_missing_is_none() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;
        assert_eq!(store.get(&CouponId::new())?, None);
        Ok(())
    }

    #[test]
    fn sled_resave_keeps_created_at() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        let first = store.save(coupon("ABC123"))?;
        let second = store.save(first.clone())?;

        assert_eq!(second.created_at(), first.created_at());
        assert!(second.updated_at() >= first.updated_at());
        Ok(())
    }

    #[test]
    fn sled_rejects_code_owned_by_another_coupon() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        store.save(coupon("ABC123"))?;
        let result = store.save(coupon("abc-123"));

        assert!(matches!(result, Err(StoreError::DuplicateCode(code)) if code == "ABC123"));
        Ok(())
    }

    #[test]
    fn sled_code_index_follows_code_changes() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        let original = store.save(coupon("OLD001"))?;
        let renamed = coupon("NEW001").replacing(&original);
        store.save(renamed)?;

        assert!(!store.exists_by_code(&CouponCode::parse("OLD001")?)?);
        assert!(store.exists_by_code(&CouponCode::parse("NEW001")?)?);
        assert_eq!(
            store.get(&original.id())?.map(|c| c.code().to_string()),
            Some("NEW001".to_string())
        );
        Ok(())
    }

    #[test]
    fn sled_deleted_coupons_keep_their_code() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        let mut saved = store.save(coupon("ABC123"))?;
        saved.delete()?;
        store.save(saved)?;

        assert!(store.exists_by_code(&CouponCode::parse("ABC123")?)?);
        Ok(())
    }

    #[test]
    fn sled_keeps_expiration_past_year_2262() -> anyhow::Result<()> {
        let (_dir, store) = sled_store()?;

        let request = CouponRequest::new()
            .set_code("FAR300")
            .set_description("Far future")
            .set_discount_value(Decimal::new(5, 0))
            .set_expiration_date(far_future());
        let saved = store.save(Coupon::create(&request)?)?;

        let loaded = store.get(&saved.id())?.context("coupon should be stored")?;
        assert_eq!(loaded.expiration_date(), far_future());
        Ok(())
    }
}
