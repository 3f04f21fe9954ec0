use anyhow::Result;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

pub type DbConn = Surreal<Db>;

/// Initialize database connection with RocksDB backend
pub async fn connect(path: &str) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns("ticketing").use_db("flights").await?;
    Ok(db)
}

/// In-memory connection for tests and throwaway demos
pub async fn connect_memory() -> Result<DbConn> {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns("ticketing").use_db("flights").await?;
    Ok(db)
}

/// Initialize database schema
pub async fn init_schema(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        -- Orders table (schemaless for flexibility)
        DEFINE TABLE orders SCHEMALESS;

        -- Airport nodes
        DEFINE TABLE airport SCHEMAFULL;
        DEFINE FIELD code ON airport TYPE string;
        DEFINE INDEX idx_airport_code ON airport FIELDS code UNIQUE;

        -- Route edges (graph relation between airports)
        DEFINE TABLE connected_to SCHEMAFULL TYPE RELATION FROM airport TO airport;
        DEFINE FIELD distance_km ON connected_to TYPE float;
        DEFINE FIELD flight_time_hr ON connected_to TYPE option<float>;
        "#,
    )
    .await?;

    Ok(())
}

/// Create the query-performance indexes the optimized scenario relies on.
pub async fn create_indexes(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS idx_depart_date ON orders FIELDS depart_date;
        DEFINE INDEX IF NOT EXISTS idx_order_id ON orders FIELDS order_id;
        DEFINE INDEX IF NOT EXISTS idx_route_date ON orders FIELDS origin, destination, depart_date;
        DEFINE INDEX IF NOT EXISTS idx_ct_distance ON connected_to FIELDS distance_km, flight_time_hr;
        "#,
    )
    .await?;

    Ok(())
}

/// Drop the performance indexes so the baseline scenario runs unindexed.
pub async fn drop_indexes(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        REMOVE INDEX IF EXISTS idx_depart_date ON orders;
        REMOVE INDEX IF EXISTS idx_order_id ON orders;
        REMOVE INDEX IF EXISTS idx_route_date ON orders;
        REMOVE INDEX IF EXISTS idx_ct_distance ON connected_to;
        "#,
    )
    .await?;

    Ok(())
}
