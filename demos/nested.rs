use sqlx_tx_query::{run_in_savepoint, run_in_transaction, Connection, DatabaseConfig, Error, TransactionOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let pool = DatabaseConfig::from_env()?.connect().await?;

    println!("=== Nested Transaction (Savepoint) Example ===\n");

    // Example 1: Successful nested work
    println!("1. Savepoint - both succeed...");
    run_in_transaction(&pool, &TransactionOptions::default(), |tx| {
        Box::pin(async move {
            tx.execute("INSERT INTO users (name, email) VALUES ($1, $2)", &["David".into(), "david@example.com".into()])
                .await?;
            println!("   Outer: Created user");

            run_in_savepoint(tx, "audit", |sp| {
                Box::pin(async move {
                    sp.execute("INSERT INTO audit_log (action) VALUES ($1)", &["User created".into()])
                        .await?;
                    println!("   Nested: Created audit log");
                    Ok::<_, Error>(())
                })
            })
            .await?;

            println!("   ✓ Both committed\n");
            Ok::<_, Error>(())
        })
    })
    .await?;

    // Example 2: Nested work fails, outer succeeds
    println!("2. Savepoint fails, outer succeeds...");
    run_in_transaction(&pool, &TransactionOptions::default(), |tx| {
        Box::pin(async move {
            tx.execute("INSERT INTO users (name, email) VALUES ($1, $2)", &["Eve".into(), "eve@example.com".into()])
                .await?;
            println!("   Outer: Created user");

            let nested = run_in_savepoint(tx, "audit", |sp| {
                Box::pin(async move {
                    // This will fail
                    sp.execute("INSERT INTO non_existent_table VALUES ($1)", &[1.into()])
                        .await?;
                    Ok::<_, Error>(())
                })
            })
            .await;

            match nested {
                Ok(_) => println!("   ✗ Nested should have failed!"),
                Err(e) => println!("   Nested: Failed ({})", e),
            }

            println!("   ✓ Outer transaction committed (user created)\n");
            Ok::<_, Error>(())
        })
    })
    .await?;

    println!("=== All nested transaction examples completed ===");

    pool.close().await;
    Ok(())
}
