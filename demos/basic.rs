use sqlx_tx_query::{
    filters, run_in_transaction, Connection, DatabaseConfig, Error, IsolationLevel, QueryBuilder,
    TransactionOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pool = DatabaseConfig::from_env()?.connect().await?;

    println!("=== Basic Transaction Example ===\n");

    // Example 1: Simple INSERT
    println!("1. Creating a user...");
    run_in_transaction(&pool, &TransactionOptions::default(), |conn| {
        Box::pin(async move {
            conn.execute(
                "INSERT INTO users (name, email, tenant_id) VALUES ($1, $2, $3)",
                &["Alice".into(), "alice@example.com".into(), "t1".into()],
            )
            .await?;
            Ok::<_, Error>(())
        })
    })
    .await?;
    println!("   ✓ User created successfully\n");

    // Example 2: Building a filtered query
    println!("2. Querying active users of a tenant...");
    let query = QueryBuilder::new()
        .select(["id", "name"])?
        .from("users")?
        .where_eq(filters! { "tenant_id" => "t1", "deleted_at" => sqlx_tx_query::Value::Null })
        .order_by_asc("name")
        .limit(10)?
        .build()?;
    println!("   SQL: {}", query);
    println!("   Args: {:?}", query.values);

    let options = TransactionOptions::new()
        .isolation_level(IsolationLevel::RepeatableRead)
        .read_only(true)
        .timeout_millis(2_000);
    let found = run_in_transaction(&pool, &options, |conn| {
        Box::pin(async move {
            let out = conn.execute(&query.text, &query.values).await?;
            Ok::<_, Error>(out.rows.len())
        })
    })
    .await?;
    println!("   ✓ Found {} users\n", found);

    // Example 3: Error handling and automatic rollback
    println!("3. Testing automatic rollback on error...");
    let result: Result<(), Error> = run_in_transaction(&pool, &TransactionOptions::default(), |conn| {
        Box::pin(async move {
            conn.execute(
                "INSERT INTO users (name, email, tenant_id) VALUES ($1, $2, $3)",
                &["Charlie".into(), "charlie@example.com".into(), "t1".into()],
            )
            .await?;

            // This will cause an error
            conn.execute("SELECT * FROM non_existent_table", &[]).await?;

            Ok(())
        })
    })
    .await;

    match result {
        Ok(_) => println!("   ✗ Should have failed!"),
        Err(e) => println!("   ✓ Transaction rolled back: {}\n", e),
    }

    println!("=== All examples completed successfully ===");

    pool.close().await;
    Ok(())
}
