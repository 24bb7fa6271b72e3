//! SQLite repository adapter.

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use currency_types::{
    Currency, CurrencyFilter, CurrencyId, CurrencyRepository, Rate, RateFilter, RateId,
    RateRepository, RepoError, Sort, UpdateCurrencyRequest,
};

use crate::types::{DbCurrency, DbRate, date_to_text, map_db_error, timestamp_to_text};

const CURRENCY_COLUMNS: &str = "SELECT id, name, code, created_at, updated_at FROM currencies";
const RATE_COLUMNS: &str =
    "SELECT id, base, date, rates, created_at, updated_at FROM currency_rates";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currencies.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_currency_rates.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        run_migrations(&pool).await?;

        tracing::debug!("SQLite schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query helpers
// ─────────────────────────────────────────────────────────────────────────────

fn push_currency_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a CurrencyFilter) {
    let mut clause = " WHERE ";
    if let Some(code) = &filter.code {
        qb.push(clause).push("code = ").push_bind(code.as_str());
        clause = " AND ";
    }
    if let Some(codes) = &filter.codes {
        qb.push(clause);
        if codes.is_empty() {
            qb.push("1 = 0");
        } else {
            qb.push("code IN (");
            let mut list = qb.separated(", ");
            for code in codes {
                list.push_bind(code.as_str());
            }
            list.push_unseparated(")");
        }
    }
}

fn push_rate_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RateFilter) {
    let mut clause = " WHERE ";
    if let Some(base) = &filter.base {
        qb.push(clause).push("base = ").push_bind(base.clone());
        clause = " AND ";
    }
    if let Some(date) = filter.date {
        qb.push(clause).push("date = ").push_bind(date_to_text(date));
    }
}

/// `ORDER BY ... LIMIT ... OFFSET ...`; SQLite reads `LIMIT -1` as unbounded.
fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, sort: Sort, skip: u32, limit: u32) {
    let limit = if limit == 0 { -1 } else { i64::from(limit) };
    qb.push(" ORDER BY ")
        .push(sort.to_sql())
        .push(" LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(i64::from(skip));
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for SqliteRepo {
    async fn create_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        sqlx::query(
            r#"INSERT INTO currencies (id, name, code, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(currency.id.to_string())
        .bind(&currency.name)
        .bind(&currency.code)
        .bind(timestamp_to_text(currency.created_at))
        .bind(timestamp_to_text(currency.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(currency)
    }

    async fn get_currency(&self, id: CurrencyId) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> = sqlx::query_as(&format!("{CURRENCY_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(DbCurrency::into_domain).transpose()
    }

    async fn find_currencies(
        &self,
        filter: &CurrencyFilter,
        skip: u32,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Currency>, RepoError> {
        let mut qb = QueryBuilder::new(CURRENCY_COLUMNS);
        push_currency_filter(&mut qb, filter);
        push_page(&mut qb, sort, skip, limit);

        let rows: Vec<DbCurrency> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(DbCurrency::into_domain).collect()
    }

    async fn count_currencies(&self, filter: &CurrencyFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM currencies");
        push_currency_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(count.max(0) as u64)
    }

    async fn update_currency(
        &self,
        id: CurrencyId,
        patch: &UpdateCurrencyRequest,
    ) -> Result<Currency, RepoError> {
        let mut currency = self.get_currency(id).await?.ok_or(RepoError::NotFound)?;
        currency.apply(patch)?;

        let result = sqlx::query(
            r#"UPDATE currencies SET name = ?, code = ?, updated_at = ? WHERE id = ?"#,
        )
        .bind(&currency.name)
        .bind(&currency.code)
        .bind(timestamp_to_text(currency.updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.get_currency(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_currency(&self, id: CurrencyId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM currencies WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate snapshots
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for SqliteRepo {
    async fn create_rate(&self, rate: Rate) -> Result<Rate, RepoError> {
        let rates = serde_json::to_string(&rate.rates)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO currency_rates (id, base, date, rates, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(rate.id.to_string())
        .bind(&rate.base)
        .bind(date_to_text(rate.date))
        .bind(rates)
        .bind(timestamp_to_text(rate.created_at))
        .bind(timestamp_to_text(rate.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rate)
    }

    async fn get_rate(&self, id: RateId) -> Result<Option<Rate>, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(&format!("{RATE_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(DbRate::into_domain).transpose()
    }

    async fn find_rates(
        &self,
        filter: &RateFilter,
        skip: u32,
        limit: u32,
        sort: Sort,
    ) -> Result<Vec<Rate>, RepoError> {
        let mut qb = QueryBuilder::new(RATE_COLUMNS);
        push_rate_filter(&mut qb, filter);
        push_page(&mut qb, sort, skip, limit);

        let rows: Vec<DbRate> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(DbRate::into_domain).collect()
    }

    async fn count_rates(&self, filter: &RateFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM currency_rates");
        push_rate_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(count.max(0) as u64)
    }

    async fn update_rate(&self, rate: &Rate) -> Result<Rate, RepoError> {
        let rates = serde_json::to_string(&rate.rates)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let result =
            sqlx::query(r#"UPDATE currency_rates SET rates = ?, updated_at = ? WHERE id = ?"#)
                .bind(rates)
                .bind(timestamp_to_text(chrono::Utc::now()))
                .bind(rate.id.to_string())
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        self.get_rate(rate.id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_rate(&self, id: RateId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM currency_rates WHERE id = ?"#)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
