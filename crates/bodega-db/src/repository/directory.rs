//! # Directory Repository
//!
//! Companies, warehouses and clients: the records a sale points at.
//! Sales only read them; creation exists for seeding and tests.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bodega_core::{Client, Company, Warehouse};

const CLIENT_COLUMNS: &str =
    "id, name, tax_id, business_name, business_activity, address, email, created_at";

/// Loads a warehouse on the caller's connection.
pub async fn find_warehouse(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Warehouse>> {
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "SELECT id, company_id, name, created_at FROM warehouses WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(warehouse)
}

/// Loads a client on the caller's connection.
pub async fn find_client(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Client>> {
    let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
    let client = sqlx::query_as::<_, Client>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(client)
}

/// Fields for a new client.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub tax_id: Option<String>,
    pub business_name: Option<String>,
    pub business_activity: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl NewClient {
    /// A client with only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        NewClient {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Repository for companies, warehouses and clients.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    pub async fn create_company(&self, name: &str) -> DbResult<Company> {
        let company = Company {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %company.id, name = %company.name, "Inserting company");

        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&company.id)
            .bind(&company.name)
            .bind(company.created_at)
            .execute(&self.pool)
            .await?;

        Ok(company)
    }

    pub async fn create_warehouse(&self, company_id: &str, name: &str) -> DbResult<Warehouse> {
        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %warehouse.id, company_id = %company_id, "Inserting warehouse");

        sqlx::query(
            "INSERT INTO warehouses (id, company_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&warehouse.id)
        .bind(&warehouse.company_id)
        .bind(&warehouse.name)
        .bind(warehouse.created_at)
        .execute(&self.pool)
        .await?;

        Ok(warehouse)
    }

    pub async fn create_client(&self, new: NewClient) -> DbResult<Client> {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            tax_id: new.tax_id,
            business_name: new.business_name,
            business_activity: new.business_activity,
            address: new.address,
            email: new.email,
            created_at: Utc::now(),
        };

        debug!(id = %client.id, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, tax_id, business_name, business_activity,
                address, email, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.tax_id)
        .bind(&client.business_name)
        .bind(&client.business_activity)
        .bind(&client.address)
        .bind(&client.email)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get_warehouse(&self, id: &str) -> DbResult<Option<Warehouse>> {
        let mut conn = self.pool.acquire().await?;
        find_warehouse(&mut conn, id).await
    }

    pub async fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        find_client(&mut conn, id).await
    }

    pub async fn count_companies(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Lists a company's warehouses by name.
    pub async fn list_warehouses(&self, company_id: &str) -> DbResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, company_id, name, created_at
            FROM warehouses
            WHERE company_id = ?1
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(warehouses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_directory_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let directory = db.directory();

        let company = directory.create_company("Ferretería Sur").await.unwrap();
        directory.create_warehouse(&company.id, "Norte").await.unwrap();
        let central = directory.create_warehouse(&company.id, "Central").await.unwrap();

        assert_eq!(directory.count_companies().await.unwrap(), 1);

        let listed = directory.list_warehouses(&company.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Central");

        let found = directory.get_warehouse(&central.id).await.unwrap().unwrap();
        assert_eq!(found.company_id, company.id);
        assert!(directory.get_warehouse("missing").await.unwrap().is_none());

        let client = directory
            .create_client(NewClient {
                tax_id: Some("76.123.456-7".to_string()),
                ..NewClient::named("Constructora Andes")
            })
            .await
            .unwrap();
        let found = directory.get_client(&client.id).await.unwrap().unwrap();
        assert_eq!(found.tax_id.as_deref(), Some("76.123.456-7"));
    }
}
