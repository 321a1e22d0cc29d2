// CustomerRepository: storage seam for customers
//
// The MySQL implementation uses runtime-checked queries. Deleting a
// customer cascades to its quotations and their items through the
// foreign keys declared in the migrations.

use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, PageRequest, Result};
use crate::modules::customers::models::{Customer, CustomerRequest};

const CUSTOMER_COLUMNS: &str = "id, name, contact_person, email, phone, address, address2, \
                                city, state, postal_code, created_at, updated_at";

/// Repository for customer persistence
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a customer (request must already be validated)
    async fn create(&self, request: &CustomerRequest) -> Result<Customer>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>>;

    /// Fetch several customers at once; missing ids are skipped
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Customer>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>>;

    /// Page through customers, newest first, optionally matching `search`
    /// against name, contact person and email
    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<Customer>, i64)>;

    /// Overwrite a customer; `None` when it does not exist
    async fn update(&self, id: i64, request: &CustomerRequest) -> Result<Option<Customer>>;

    /// Remove a customer; `false` when it did not exist
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// MySQL-backed customer repository
#[derive(Clone)]
pub struct MySqlCustomerRepository {
    pool: MySqlPool,
}

impl MySqlCustomerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error) -> AppError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::field("email", "The email has already been taken.");
            }
        }
        AppError::Database(e)
    }

    fn push_search<'a>(builder: &mut QueryBuilder<'a, MySql>, search: Option<&str>) {
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            builder
                .push(" WHERE (name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR contact_person LIKE ")
                .push_bind(pattern.clone())
                .push(" OR email LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl CustomerRepository for MySqlCustomerRepository {
    async fn create(&self, request: &CustomerRequest) -> Result<Customer> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (
                name, contact_person, email, phone, address,
                address2, city, state, postal_code
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(&request.contact_person)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.address2)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.postal_code)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        let id = result.last_insert_id() as i64;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Customer {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = ?",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Customer>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<MySql>::new(format!(
            "SELECT {} FROM customers WHERE id IN (",
            CUSTOMER_COLUMNS
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let customers = builder
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE email = ?",
            CUSTOMER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<Customer>, i64)> {
        let mut count_builder = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM customers");
        Self::push_search(&mut count_builder, search);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut builder =
            QueryBuilder::<MySql>::new(format!("SELECT {} FROM customers", CUSTOMER_COLUMNS));
        Self::push_search(&mut builder, search);
        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let customers = builder
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;

        Ok((customers, total))
    }

    async fn update(&self, id: i64, request: &CustomerRequest) -> Result<Option<Customer>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE customers
            SET name = ?, contact_person = ?, email = ?, phone = ?, address = ?,
                address2 = ?, city = ?, state = ?, postal_code = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.name)
        .bind(&request.contact_person)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.address2)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.postal_code)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
