use anyhow::{Context, Result};
use mongodb::{Client, Database};
use std::env;

/// Connect to MongoDB and return the application database handle.
/// Called once at startup; the handle is cloned into shared state.
pub async fn get_database() -> Result<Database> {
    let uri = env::var("MONGODB_URI").context("MONGODB_URI not set")?;
    let db_name = env::var("MONGODB_DB").unwrap_or_else(|_| String::from("qrvault"));

    let client = Client::with_uri_str(&uri)
        .await
        .context("Failed to create MongoDB client")?;

    Ok(client.database(&db_name))
}
