//! Currency Application Service
//!
//! Orchestrates the catalog, rate acquisition and conversion through the
//! store and rate provider ports. Contains NO infrastructure logic.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;

use currency_types::domain::currency::normalize_code;
use currency_types::{
    AppError, ConversionResponse, CreateCurrencyRequest, Currency, CurrencyFilter, CurrencyId,
    DateRange, ImportSummary, LatestRates, Rate, RateFilter, RateProvider, Rates, RepoError, Sort,
    SortField, Store, UpdateCurrencyRequest,
};
use exchange_rates::REFERENCE_CURRENCY;

use crate::locks::RateLocks;

/// Application service for the currency reference API.
///
/// Generic over the store `R` and the rate provider `P`, both injected at
/// construction. Cloning is cheap and shares the same store, provider and
/// lock table, which is how detached tasks get their own handle.
pub struct CurrencyService<R: Store, P: RateProvider> {
    repo: Arc<R>,
    provider: Arc<P>,
    locks: Arc<RateLocks>,
}

impl<R: Store, P: RateProvider> Clone for CurrencyService<R, P> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            provider: self.provider.clone(),
            locks: self.locks.clone(),
        }
    }
}

/// Outcome of the locked part of a latest-rate acquisition.
enum Acquired {
    Ready(Rate),
    /// The provider answered for another `(base, date)` than requested.
    Elsewhere(LatestRates),
}

impl<R: Store, P: RateProvider> CurrencyService<R, P> {
    pub fn new(repo: R, provider: P) -> Self {
        Self::from_shared(Arc::new(repo), Arc::new(provider))
    }

    pub fn from_shared(repo: Arc<R>, provider: Arc<P>) -> Self {
        Self {
            repo,
            provider,
            locks: Arc::new(RateLocks::new()),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns a reference to the rate provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[cfg(test)]
    pub(crate) fn locks(&self) -> &RateLocks {
        &self.locks
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates a currency. Blank fields and duplicate codes are rejected.
    #[tracing::instrument(skip(self))]
    pub async fn create_currency(&self, req: CreateCurrencyRequest) -> Result<Currency, AppError> {
        let currency = Currency::new(req.name, &req.code)?;
        let code = currency.code.clone();

        self.repo
            .create_currency(currency)
            .await
            .map_err(|e| match e {
                RepoError::Conflict(_) => {
                    AppError::BadRequest(format!("Currency {code} already exists"))
                }
                other => other.into(),
            })
    }

    pub async fn get_currency(&self, id: CurrencyId) -> Result<Currency, AppError> {
        self.repo
            .get_currency(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Currency {}", id))))
    }

    pub async fn get_currency_by_code(&self, code: &str) -> Result<Currency, AppError> {
        let code = normalize_code(code);
        self.repo
            .find_currencies(&CurrencyFilter::by_code(code.clone()), 0, 1, Sort::default())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Currency {code}")))
    }

    /// Currencies whose code is in `codes`. Fails when none match.
    pub async fn get_currencies_by_codes(&self, codes: &[String]) -> Result<Vec<Currency>, AppError> {
        let codes: Vec<String> = codes.iter().map(|c| normalize_code(c)).collect();
        let currencies = self
            .repo
            .find_currencies(
                &CurrencyFilter::by_codes(codes.clone()),
                0,
                0,
                Sort::asc(SortField::Code),
            )
            .await?;

        if currencies.is_empty() {
            return Err(AppError::NotFound(format!(
                "No currencies for codes {}",
                codes.join(",")
            )));
        }
        Ok(currencies)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_currency(
        &self,
        code: &str,
        patch: UpdateCurrencyRequest,
    ) -> Result<Currency, AppError> {
        let currency = self.get_currency_by_code(code).await?;
        self.repo
            .update_currency(currency.id, &patch)
            .await
            .map_err(Into::into)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_currency(&self, code: &str) -> Result<(), AppError> {
        let currency = self.get_currency_by_code(code).await?;
        self.repo
            .delete_currency(currency.id)
            .await
            .map_err(Into::into)
    }

    /// One page of the catalog plus the catalog size.
    pub async fn list_currencies(
        &self,
        skip: u32,
        limit: u32,
        order_by: Option<&str>,
    ) -> Result<(Vec<Currency>, u64), AppError> {
        let sort = Sort::for_currencies(order_by)?;
        let filter = CurrencyFilter::default();
        let items = self.repo.find_currencies(&filter, skip, limit, sort).await?;
        let total = self.repo.count_currencies(&filter).await?;
        Ok((items, total))
    }

    pub async fn count_currencies(&self, filter: &CurrencyFilter) -> Result<u64, AppError> {
        self.repo.count_currencies(filter).await.map_err(Into::into)
    }

    /// Seeds the catalog from the provider's symbol list. Symbols that
    /// cannot be inserted, usually because the code already exists, are
    /// logged and counted as skipped.
    #[tracing::instrument(skip(self))]
    pub async fn import_currencies(&self) -> Result<ImportSummary, AppError> {
        let symbols = self.provider.list_symbols().await?;
        let mut summary = ImportSummary {
            created: 0,
            skipped: 0,
        };

        for (code, name) in symbols {
            let req = CreateCurrencyRequest {
                name,
                code: code.clone(),
            };
            match self.create_currency(req).await {
                Ok(_) => summary.created += 1,
                Err(e) => {
                    tracing::warn!(%code, error = %e, "Skipping currency");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            created = summary.created,
            skipped = summary.skipped,
            "Imported currencies"
        );
        Ok(summary)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate acquisition
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns today's (UTC) snapshot for `code`, fetching it from the
    /// provider only when none is stored yet.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_create_latest_rate(&self, code: &str) -> Result<Rate, AppError> {
        let code = normalize_code(code);
        let today = Utc::now().date_naive();

        let acquired = self
            .locks
            .run_exclusive(&code, today, self.acquire_latest(&code, today))
            .await?;

        match acquired {
            Acquired::Ready(rate) => Ok(rate),
            Acquired::Elsewhere(latest) => {
                tracing::debug!(
                    base = %latest.base,
                    date = %latest.date,
                    "Provider reported a different snapshot key"
                );
                self.get_or_create_rate(&latest.base, latest.date, latest.rates)
                    .await
            }
        }
    }

    /// Locked part of [`Self::get_or_create_latest_rate`].
    async fn acquire_latest(&self, code: &str, today: NaiveDate) -> Result<Acquired, AppError> {
        if let Some(rate) = self.repo.find_rate_by_base_date(code, today).await? {
            tracing::debug!(rate_id = %rate.id, "Rate already stored");
            return Ok(Acquired::Ready(rate));
        }

        let latest = self.provider.latest_rates(code, &[]).await?;
        if latest.base == code && latest.date == today {
            let rate = self.insert_if_missing(code, today, latest.rates).await?;
            return Ok(Acquired::Ready(rate));
        }
        Ok(Acquired::Elsewhere(latest))
    }

    /// Stores `rates` for `(base, date)` unless a snapshot already exists,
    /// in which case the stored one is returned unchanged.
    #[tracing::instrument(skip(self, rates))]
    pub async fn get_or_create_rate(
        &self,
        base: &str,
        date: NaiveDate,
        rates: Rates,
    ) -> Result<Rate, AppError> {
        self.locks
            .run_exclusive(base, date, self.insert_if_missing(base, date, rates))
            .await
    }

    /// Lookup-then-insert. Callers hold the `(base, date)` lock.
    async fn insert_if_missing(
        &self,
        base: &str,
        date: NaiveDate,
        rates: Rates,
    ) -> Result<Rate, AppError> {
        if let Some(rate) = self.repo.find_rate_by_base_date(base, date).await? {
            return Ok(rate);
        }

        let rate = self.repo.create_rate(Rate::new(base, date, rates)).await?;
        tracing::debug!(rate_id = %rate.id, %base, %date, "Stored rate snapshot");
        Ok(rate)
    }

    /// Get-or-create of today's snapshot for every catalog currency.
    ///
    /// A failing currency is logged and skipped; only a failure to read the
    /// catalog itself is returned.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_all_latest_rates(&self) -> Result<Vec<Rate>, AppError> {
        let currencies = self.repo.list_all_currencies().await?;
        let mut rates = Vec::with_capacity(currencies.len());

        for currency in currencies {
            match self.get_or_create_latest_rate(&currency.code).await {
                Ok(rate) => rates.push(rate),
                Err(e) => {
                    tracing::error!(code = %currency.code, error = %e, "Failed to refresh rate")
                }
            }
        }

        tracing::info!(count = rates.len(), "Refreshed latest rates");
        Ok(rates)
    }

    /// Runs [`Self::refresh_all_latest_rates`] on a detached task.
    pub fn spawn_refresh_all_latest_rates(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.refresh_all_latest_rates().await {
                tracing::error!(error = %e, "Refresh of all latest rates failed");
            }
        })
    }

    /// Fetches `range` for `code` in one provider call and stores one
    /// snapshot per returned day. Days that fail to persist are logged and
    /// left out of the result.
    #[tracing::instrument(skip(self))]
    pub async fn backfill_time_series(
        &self,
        code: &str,
        range: DateRange,
    ) -> Result<Vec<Rate>, AppError> {
        let code = normalize_code(code);
        let series = self.provider.time_series(&code, range, &[]).await?;
        let mut stored = Vec::with_capacity(series.rates.len());

        for (date, rates) in series.rates {
            match self.get_or_create_rate(&series.base, date, rates).await {
                Ok(rate) => stored.push(rate),
                Err(e) => tracing::error!(%date, error = %e, "Failed to store time series day"),
            }
        }

        tracing::debug!(count = stored.len(), "Backfilled time series");
        Ok(stored)
    }

    /// Runs [`Self::backfill_time_series`] on a detached task.
    pub fn spawn_backfill_time_series(&self, code: &str, range: DateRange) -> JoinHandle<()> {
        let service = self.clone();
        let code = code.to_string();
        tokio::spawn(async move {
            if let Err(e) = service.backfill_time_series(&code, range).await {
                tracing::error!(%code, error = %e, "Time series backfill failed");
            }
        })
    }

    /// Starts one independent backfill task per catalog currency.
    #[tracing::instrument(skip(self))]
    pub async fn backfill_all_time_series(
        &self,
        range: DateRange,
    ) -> Result<Vec<JoinHandle<()>>, AppError> {
        let currencies = self.repo.list_all_currencies().await?;
        Ok(currencies
            .iter()
            .map(|currency| self.spawn_backfill_time_series(&currency.code, range))
            .collect())
    }

    /// Runs [`Self::backfill_all_time_series`] on a detached task, catalog
    /// read included, so a caller can accept the request before anything
    /// touches the store.
    pub fn spawn_backfill_all_time_series(&self, range: DateRange) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.backfill_all_time_series(range).await {
                tracing::error!(%range, error = %e, "Time series backfill of all currencies failed");
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate queries & conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// One page of stored snapshots for a catalog currency.
    pub async fn list_rates_for_currency(
        &self,
        code: &str,
        skip: u32,
        limit: u32,
        order_by: Option<&str>,
    ) -> Result<(Vec<Rate>, u64), AppError> {
        let sort = Sort::for_rates(order_by)?;
        let currency = self.get_currency_by_code(code).await?;
        let filter = RateFilter::by_base(currency.code);

        let rates = self.repo.find_rates(&filter, skip, limit, sort).await?;
        let total = self.repo.count_rates(&filter).await?;
        Ok((rates, total))
    }

    /// The newest stored snapshot for each of `codes`.
    pub async fn latest_rates_for_codes(&self, codes: &[String]) -> Result<Vec<Rate>, AppError> {
        let currencies = self.get_currencies_by_codes(codes).await?;
        let mut rates = Vec::with_capacity(currencies.len());

        for currency in currencies {
            rates.push(self.latest_rate(&currency.code).await?);
        }
        Ok(rates)
    }

    async fn latest_rate(&self, base: &str) -> Result<Rate, AppError> {
        self.repo
            .find_latest_rate_by_base(base)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No rates stored for {base}")))
    }

    /// Converts with the newest stored snapshot of `from`.
    #[tracing::instrument(skip(self))]
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ConversionResponse, AppError> {
        let (from, to) = (normalize_code(from), normalize_code(to));
        let rate = self.latest_rate(&from).await?;
        let result = exchange_rates::convert(&rate, &from, &to, amount)?;

        Ok(ConversionResponse {
            from,
            to,
            amount,
            result,
        })
    }

    /// Converts through the newest stored snapshot of the reference
    /// currency, rounded to three decimals.
    #[tracing::instrument(skip(self))]
    pub async fn convert_cross(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ConversionResponse, AppError> {
        let (from, to) = (normalize_code(from), normalize_code(to));
        let rate = self.latest_rate(REFERENCE_CURRENCY).await?;
        let result = exchange_rates::convert_cross(&rate, &from, &to, amount)?;

        Ok(ConversionResponse {
            from,
            to,
            amount,
            result,
        })
    }
}
