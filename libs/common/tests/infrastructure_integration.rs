//! Integration tests for the database connection helpers
//!
//! Skipped unless `TEST_DATABASE_URL` points at a reachable PostgreSQL.

use common::database::{DatabaseConfig, connect_with_retry, health_check};
use sqlx::Row;

#[tokio::test]
async fn test_connect_with_retry_reaches_database() -> Result<(), Box<dyn std::error::Error>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return Ok(());
    };

    let mut config = DatabaseConfig::new(url);
    config.connect_retries = 2;
    config.connect_retry_delay = 1;
    let pool = connect_with_retry(&config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1);

    Ok(())
}
