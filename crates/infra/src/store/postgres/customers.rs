//! Customer Directory persistence (Postgres).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

use storders_core::CustomerId;
use storders_directory::{Customer, CustomerPatch, NewCustomer};

use super::{map_sqlx_error, PostgresStore};
use crate::store::{CustomerFilter, CustomerStore, Page, StoreError};

const CUSTOMER_COLUMNS: &str = "id, company_name, contact_name, contact_email, phone, \
                                address, city, country, created_at, updated_at";

fn customer_from_row(row: &PgRow) -> Result<Customer, sqlx::Error> {
    Ok(Customer {
        id: CustomerId::from_uuid(row.try_get("id")?),
        company_name: row.try_get("company_name")?,
        contact_name: row.try_get("contact_name")?,
        contact_email: row.try_get("contact_email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CustomerStore for PostgresStore {
    #[instrument(skip(self, new), fields(company = %new.company_name), err)]
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let customer = Customer::create(CustomerId::new(), new, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, company_name, contact_name, contact_email, phone,
                address, city, country, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.company_name)
        .bind(&customer.contact_name)
        .bind(&customer.contact_email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.country)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;

        Ok(customer)
    }

    #[instrument(skip(self), fields(customer_id = %id), err)]
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("get_customer", e))?;

        row.map(|r| customer_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_customer", e))
    }

    #[instrument(skip(self), err)]
    async fn list_customers(
        &self,
        filter: CustomerFilter,
        page: Page,
    ) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE ($1::text IS NULL
                   OR company_name ILIKE '%' || $1 || '%'
                   OR contact_name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR country ILIKE '%' || $2 || '%')
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.search.as_deref())
        .bind(filter.country.as_deref())
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;

        rows.iter()
            .map(customer_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_customers", e))
    }

    #[instrument(skip(self, patch), fields(customer_id = %id), err)]
    async fn update_customer(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError> {
        let Some(mut customer) = self.get_customer(id).await? else {
            return Ok(None);
        };
        customer.apply(patch, Utc::now());

        sqlx::query(
            r#"
            UPDATE customers
            SET company_name = $2, contact_name = $3, contact_email = $4,
                phone = $5, address = $6, city = $7, country = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.company_name)
        .bind(&customer.contact_name)
        .bind(&customer.contact_email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.country)
        .bind(customer.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;

        Ok(Some(customer))
    }
}
