//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis store are
//! properly configured and reachable. They require live instances and a
//! DATABASE_URL, so they are ignored by default:
//!
//!     cargo test -p common -- --ignored

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    // PostgreSQL
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    // The migrated schema must expose the four tables the services rely on.
    for table in ["users", "cloths", "storages", "buys"] {
        let row = sqlx::query("SELECT to_regclass($1) IS NOT NULL AS present")
            .bind(table)
            .fetch_one(&pool)
            .await?;
        let present: bool = row.get("present");
        assert!(present, "expected table {table} to exist after migrations");
    }

    // Redis
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let test_key = "integration_test_key";
    let test_value = "integration_test_value";

    redis_pool.set(test_key, test_value, Some(10)).await?;

    let retrieved_value = redis_pool.get(test_key).await?;
    assert_eq!(
        retrieved_value,
        Some(test_value.to_string()),
        "Redis SET/GET test failed"
    );

    redis_pool.delete(test_key).await?;

    let retrieved_value = redis_pool.get(test_key).await?;
    assert_eq!(retrieved_value, None, "Redis delete operation failed");

    Ok(())
}
