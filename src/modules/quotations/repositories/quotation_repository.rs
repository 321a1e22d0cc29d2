// QuotationRepository: storage seam for quotations and their items
//
// Multi-row writes (header + items) run inside a single transaction. A
// transaction dropped before `commit` rolls back, so an error anywhere in
// `create` or `replace` leaves the stored quotation untouched.
//
// Soft-deleted quotations remain readable by id but are never written.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};

use crate::core::{AppError, PageRequest, Result};
use crate::modules::quotations::models::{
    NewQuotationItem, Quotation, QuotationDraft, QuotationFilter, QuotationItem, QuotationItemRow,
    QuotationRow, QuotationStatus,
};

const QUOTATION_COLUMNS: &str = "id, customer_id, quotation_date, status, currency, \
                                 conversion_rate, payment_terms, valid_until, notes, \
                                 total_amount, created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str = "id, quotation_id, description, quantity, unit_price";

/// Repository for quotation persistence
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// Insert header and items atomically
    async fn create(&self, draft: &QuotationDraft) -> Result<Quotation>;

    /// Overwrite header, replace items wholesale and store the new total.
    /// `None` when the quotation does not exist or is soft-deleted.
    async fn replace(&self, id: i64, draft: &QuotationDraft) -> Result<Option<Quotation>>;

    /// Load a quotation with its items, soft-deleted ones included
    async fn find_by_id(&self, id: i64) -> Result<Option<Quotation>>;

    /// Page through quotations, newest first
    async fn list(&self, filter: &QuotationFilter, page: PageRequest) -> Result<(Vec<Quotation>, i64)>;

    /// `false` when the quotation does not exist or is soft-deleted
    async fn update_status(&self, id: i64, status: QuotationStatus) -> Result<bool>;

    /// Mark as deleted; `false` when missing or already deleted
    async fn soft_delete(&self, id: i64) -> Result<bool>;
}

/// MySQL-backed quotation repository
#[derive(Clone)]
pub struct MySqlQuotationRepository {
    pool: MySqlPool,
}

impl MySqlQuotationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error) -> AppError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return AppError::field("customer_id", "The selected customer id is invalid.");
            }
        }
        AppError::Database(e)
    }

    async fn insert_items(
        tx: &mut Transaction<'_, MySql>,
        quotation_id: i64,
        items: &[NewQuotationItem],
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<MySql>::new(
            "INSERT INTO quotation_items (quotation_id, description, quantity, unit_price) ",
        );
        builder.push_values(items, |mut row, item| {
            row.push_bind(quotation_id)
                .push_bind(item.description.clone())
                .push_bind(item.quantity)
                .push_bind(item.unit_price);
        });

        builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    async fn load_items(&self, quotation_ids: &[i64]) -> Result<HashMap<i64, Vec<QuotationItem>>> {
        let mut grouped: HashMap<i64, Vec<QuotationItem>> = HashMap::new();
        if quotation_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT {} FROM quotation_items WHERE quotation_id IN (",
            ITEM_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for id in quotation_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id ASC");

        let rows = builder
            .build_query_as::<QuotationItemRow>()
            .fetch_all(&self.pool)
            .await?;

        for row in rows {
            grouped
                .entry(row.quotation_id)
                .or_default()
                .push(QuotationItem::from(row));
        }

        Ok(grouped)
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, MySql>, filter: &QuotationFilter) {
        builder.push(" WHERE 1 = 1");

        if !filter.with_deleted {
            builder.push(" AND deleted_at IS NULL");
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(customer_id) = filter.customer_id {
            builder.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND quotation_date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND quotation_date <= ").push_bind(to);
        }
    }
}

#[async_trait]
impl QuotationRepository for MySqlQuotationRepository {
    async fn create(&self, draft: &QuotationDraft) -> Result<Quotation> {
        let notes = draft.notes_json()?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO quotations (
                customer_id, quotation_date, status, currency, conversion_rate,
                payment_terms, valid_until, notes, total_amount
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.customer_id)
        .bind(draft.quotation_date)
        .bind(draft.status.as_str())
        .bind(draft.currency.to_string())
        .bind(draft.conversion_rate)
        .bind(&draft.payment_terms)
        .bind(draft.valid_until)
        .bind(notes)
        .bind(draft.total_amount())
        .execute(&mut *tx)
        .await
        .map_err(Self::map_write_error)?;

        let id = result.last_insert_id() as i64;
        Self::insert_items(&mut tx, id, &draft.items).await?;

        tx.commit().await?;

        tracing::debug!(quotation_id = id, items = draft.items.len(), "Quotation rows inserted");

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Quotation {} vanished after insert", id)))
    }

    async fn replace(&self, id: i64, draft: &QuotationDraft) -> Result<Option<Quotation>> {
        let notes = draft.notes_json()?;
        let mut tx = self.pool.begin().await?;

        let live = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM quotations WHERE id = ? AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if live.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE quotations
            SET customer_id = ?, quotation_date = ?, status = ?, currency = ?,
                conversion_rate = ?, payment_terms = ?, valid_until = ?, notes = ?,
                total_amount = ?, updated_at = CURRENT_TIMESTAMP(6)
            WHERE id = ?
            "#,
        )
        .bind(draft.customer_id)
        .bind(draft.quotation_date)
        .bind(draft.status.as_str())
        .bind(draft.currency.to_string())
        .bind(draft.conversion_rate)
        .bind(&draft.payment_terms)
        .bind(draft.valid_until)
        .bind(notes)
        .bind(draft.total_amount())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_write_error)?;

        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut tx, id, &draft.items).await?;

        tx.commit().await?;

        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Quotation>> {
        let row = sqlx::query_as::<_, QuotationRow>(&format!(
            "SELECT {} FROM quotations WHERE id = ?",
            QUOTATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.load_items(&[id]).await?;
        let quotation = row.into_quotation(items.remove(&id).unwrap_or_default())?;

        Ok(Some(quotation))
    }

    async fn list(&self, filter: &QuotationFilter, page: PageRequest) -> Result<(Vec<Quotation>, i64)> {
        let mut count_builder = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM quotations");
        Self::push_filters(&mut count_builder, filter);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder =
            QueryBuilder::<MySql>::new(format!("SELECT {} FROM quotations", QUOTATION_COLUMNS));
        Self::push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = builder
            .build_query_as::<QuotationRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items = self.load_items(&ids).await?;

        let quotations = rows
            .into_iter()
            .map(|row| {
                let row_items = items.remove(&row.id).unwrap_or_default();
                row.into_quotation(row_items)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((quotations, total))
    }

    async fn update_status(&self, id: i64, status: QuotationStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE quotations SET status = ?, updated_at = CURRENT_TIMESTAMP(6) \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE quotations SET deleted_at = CURRENT_TIMESTAMP(6) \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
