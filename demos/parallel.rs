use sqlx_tx_query::postgres::PgPooledConnection;
use sqlx_tx_query::{
    parallel_task, run_parallel_in_transaction, Connection, DatabaseConfig, Error, ParallelTask,
    TransactionOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let pool = DatabaseConfig::from_env()?.connect().await?;

    println!("=== Parallel Transaction Example ===\n");

    let user_id: i64 = 1;
    let sessions: ParallelTask<'_, PgPooledConnection, u64, Error> = parallel_task(move |mut conn| {
        Box::pin(async move {
            let out = conn
                .execute("DELETE FROM sessions WHERE user_id = $1", &[user_id.into()])
                .await?;
            Ok(out.row_count)
        })
    });
    let tokens: ParallelTask<'_, PgPooledConnection, u64, Error> = parallel_task(move |mut conn| {
        Box::pin(async move {
            let out = conn
                .execute("DELETE FROM api_tokens WHERE user_id = $1", &[user_id.into()])
                .await?;
            Ok(out.row_count)
        })
    });

    let counts =
        run_parallel_in_transaction(&pool, &TransactionOptions::default(), vec![sessions, tokens])
            .await?;
    println!("   ✓ Removed {} sessions and {} tokens\n", counts[0], counts[1]);

    println!("=== Parallel example completed ===");

    pool.close().await;
    Ok(())
}
