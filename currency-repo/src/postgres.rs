//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use currency_types::{
    Currency, CurrencyFilter, CurrencyId, CurrencyRepository, Rate, RateFilter, RateId,
    RateRepository, RepoError, Sort, UpdateCurrencyRequest,
};

use crate::types::{DbCurrency, DbRate, map_db_error};

const CURRENCY_COLUMNS: &str = "SELECT id, name, code, created_at, updated_at FROM currencies";
const RATE_COLUMNS: &str =
    "SELECT id, base, date, rates, created_at, updated_at FROM currency_rates";

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currencies_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_currency_rates_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;

        tracing::debug!("Postgres schema ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query helpers
// ─────────────────────────────────────────────────────────────────────────────

fn push_currency_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a CurrencyFilter) {
    let mut clause = " WHERE ";
    if let Some(code) = &filter.code {
        qb.push(clause).push("code = ").push_bind(code.as_str());
        clause = " AND ";
    }
    if let Some(codes) = &filter.codes {
        qb.push(clause)
            .push("code = ANY(")
            .push_bind(codes.as_slice())
            .push(")");
    }
}

fn push_rate_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RateFilter) {
    let mut clause = " WHERE ";
    if let Some(base) = &filter.base {
        qb.push(clause).push("base = ").push_bind(base.clone());
        clause = " AND ";
    }
    if let Some(date) = filter.date {
        qb.push(clause).push("date = ").push_bind(date);
    }
}

/// `ORDER BY ... [LIMIT ...] OFFSET ...`; a zero limit leaves the page unbounded.
fn push_page(qb: &mut QueryBuilder<'_, Postgres>, sort: Sort, skip: u32, limit: u32) {
    qb.push(" ORDER BY ").push(sort.to_sql());
    if limit > 0 {
        qb.push(" LIMIT ").push_bind(i64::from(limit));
    }
    qb.push(" OFFSET ").push_bind(i64::from(skip));
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CurrencyRepository for PostgresRepo {
    async fn create_currency(&self, currency: Currency) -> Result<Currency, RepoError> {
        sqlx::query(
            r#"INSERT INTO currencies (id, name, code, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(currency.id.into_uuid())
        .bind(&currency.name)
        .bind(&currency.code)
        .bind(currency.created_at)
        .bind(currency.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(currency)
    }

    async fn get_currency(&self, id: CurrencyId) -> Result<Option<Currency>, RepoError> {
        let row: Option<DbCurrency> =
            sqlx::query_as(&format!("{CURRENCY_COLUMNS} WHERE id = $1"))
                .bind(id.into_uuid())
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

        let row: Option<DbCurrency> = sqlx::query_as(
            r#"UPDATE currencies SET name = $1, code = $2, updated_at = $3 WHERE id = $4
               RETURNING id, name, code, created_at, updated_at"#,
        )
        .bind(&currency.name)
        .bind(&currency.code)
        .bind(currency.updated_at)
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.ok_or(RepoError::NotFound)?.into_domain()
    }

    async fn delete_currency(&self, id: CurrencyId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM currencies WHERE id = $1"#)
            .bind(id.into_uuid())
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
impl RateRepository for PostgresRepo {
    async fn create_rate(&self, rate: Rate) -> Result<Rate, RepoError> {
        sqlx::query(
            r#"INSERT INTO currency_rates (id, base, date, rates, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(*rate.id.as_uuid())
        .bind(&rate.base)
        .bind(rate.date)
        .bind(Json(&rate.rates))
        .bind(rate.created_at)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rate)
    }

    async fn get_rate(&self, id: RateId) -> Result<Option<Rate>, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(&format!("{RATE_COLUMNS} WHERE id = $1"))
            .bind(*id.as_uuid())
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
        let row: Option<DbRate> = sqlx::query_as(
            r#"UPDATE currency_rates SET rates = $1, updated_at = $2 WHERE id = $3
               RETURNING id, base, date, rates, created_at, updated_at"#,
        )
        .bind(Json(&rate.rates))
        .bind(Utc::now())
        .bind(*rate.id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.ok_or(RepoError::NotFound)?.into_domain()
    }

    async fn delete_rate(&self, id: RateId) -> Result<(), RepoError> {
        let result = sqlx::query(r#"DELETE FROM currency_rates WHERE id = $1"#)
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
