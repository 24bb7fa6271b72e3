//! Repository port traits.
//!
//! Adapters (Postgres, SQLite, in-memory mocks) implement these. Search
//! methods take `skip`/`limit` where a `limit` of 0 means "no limit".

use chrono::NaiveDate;

use crate::domain::{Currency, CurrencyFilter, CurrencyId, Rate, RateFilter, RateId, Sort, SortField};
use crate::dto::UpdateCurrencyRequest;
use crate::error::RepoError;

/// Persistence for the currency catalog.
#[async_trait::async_trait]
pub trait CurrencyRepository: Send + Sync + 'static {
    /// Inserts a currency. A duplicate code fails with [`RepoError::Conflict`].
    async fn create_currency(&self, currency: Currency) -> Result<Currency, RepoError>;

    async fn get_currency(&self, id: CurrencyId) -> Result<Option<Currency>, RepoError>;

    async fn find_currencies(
        &self,
        filter: &CurrencyFilter,
        skip: u32,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Currency>, RepoError>;

    async fn count_currencies(&self, filter: &CurrencyFilter) -> Result<u64, RepoError>;

    /// Applies the present fields of `patch`, refreshes `updated_at` and
    /// returns the stored record.
    async fn update_currency(
        &self,
        id: CurrencyId,
        patch: &UpdateCurrencyRequest,
    ) -> Result<Currency, RepoError>;

    async fn delete_currency(&self, id: CurrencyId) -> Result<(), RepoError>;

    /// The whole catalog ordered by code.
    async fn list_all_currencies(&self) -> Result<Vec<Currency>, RepoError> {
        self.find_currencies(&CurrencyFilter::default(), 0, 0, Sort::asc(SortField::Code))
            .await
    }
}

/// Persistence for rate snapshots.
#[async_trait::async_trait]
pub trait RateRepository: Send + Sync + 'static {
    async fn create_rate(&self, rate: Rate) -> Result<Rate, RepoError>;

    async fn get_rate(&self, id: RateId) -> Result<Option<Rate>, RepoError>;

    async fn find_rates(
        &self,
        filter: &RateFilter,
        skip: u32,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Rate>, RepoError>;

    async fn count_rates(&self, filter: &RateFilter) -> Result<u64, RepoError>;

    /// Replaces the rates mapping and refreshes `updated_at`.
    async fn update_rate(&self, rate: &Rate) -> Result<Rate, RepoError>;

    async fn delete_rate(&self, id: RateId) -> Result<(), RepoError>;

    /// Newest snapshot stored for `(base, date)`.
    async fn find_rate_by_base_date(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<Option<Rate>, RepoError> {
        let filter = RateFilter::by_base_date(base, date);
        Ok(self
            .find_rates(&filter, 0, 1, Sort::default())
            .await?
            .into_iter()
            .next())
    }

    /// Most recently created snapshot for `base`, whatever its date.
    async fn find_latest_rate_by_base(&self, base: &str) -> Result<Option<Rate>, RepoError> {
        let filter = RateFilter::by_base(base);
        Ok(self
            .find_rates(&filter, 0, 1, Sort::default())
            .await?
            .into_iter()
            .next())
    }
}

/// Everything the service needs from storage.
pub trait Store: CurrencyRepository + RateRepository {}

impl<T: CurrencyRepository + RateRepository> Store for T {}
