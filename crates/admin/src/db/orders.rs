//! Order repository (collaborator surface).
//!
//! Plain document CRUD: list newest-first, patch a status field by business
//! key. Status transition legality is not checked here.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use orderdesk_core::{Email, OrderId, OrderNumber, OrderStatus};

use super::RepositoryError;
use crate::models::Order;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_email: String,
    status: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
        })?;
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number,
            customer_email,
            status,
            total_cents: row.total_cents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, order_number, customer_email, status, total_cents, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_recent(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an order by its business key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_number(
        &self,
        order_number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an order document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        order_number: &OrderNumber,
        customer_email: &Email,
        status: OrderStatus,
        total_cents: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (order_number, customer_email, status, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(order_number)
        .bind(customer_email)
        .bind(status)
        .bind(total_cents)
        .bind(created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order number already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Update an order's status by business key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has that number.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        order_number: &OrderNumber,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET status = ?1, updated_at = ?2
            WHERE order_number = ?3
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(status)
        .bind(now)
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::test_pool;

    async fn seed(repo: &OrderRepository<'_>, number: &str, placed_at: DateTime<Utc>) -> Order {
        repo.create(
            &OrderNumber::parse(number).unwrap(),
            &Email::parse("c@x.com").unwrap(),
            OrderStatus::Pending,
            4200,
            placed_at,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_recent_orders_newest_first() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        let base = Utc::now();

        seed(&repo, "OD-1", base - Duration::hours(2)).await;
        seed(&repo, "OD-3", base).await;
        seed(&repo, "OD-2", base - Duration::hours(1)).await;

        let orders = repo.list_recent().await.unwrap();
        let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["OD-3", "OD-2", "OD-1"]);
    }

    #[tokio::test]
    async fn test_update_status_by_business_key() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        let order = seed(&repo, "OD-7", Utc::now()).await;
        assert_eq!(order.status, OrderStatus::Pending);

        let updated = repo
            .update_status(&order.order_number, OrderStatus::Shipped, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.id, order.id);

        let fetched = repo.get_by_number(&order.order_number).await.unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_update_status_unknown_number_is_not_found() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        let err = repo
            .update_status(
                &OrderNumber::parse("OD-404").unwrap(),
                OrderStatus::Cancelled,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_duplicate_order_number_is_conflict() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);
        seed(&repo, "OD-9", Utc::now()).await;

        let err = repo
            .create(
                &OrderNumber::parse("OD-9").unwrap(),
                &Email::parse("c@x.com").unwrap(),
                OrderStatus::Pending,
                100,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
