use sqlx::AnyPool;

pub async fn migrate(pool: &AnyPool) -> anyhow::Result<()> {
    // Data log; `id` gives insertion order
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS data_log (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  timestamp TEXT NOT NULL,
  total_add_to_cart BIGINT NOT NULL CHECK (total_add_to_cart >= 0),
  total_ordered_units BIGINT NOT NULL CHECK (total_ordered_units >= 0),
  new_add_to_cart BIGINT NOT NULL CHECK (new_add_to_cart >= 0),
  new_ordered_units BIGINT NOT NULL CHECK (new_ordered_units >= 0)
);
"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
