use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "builtin_types",
        sql: include_str!("migrations/002_builtin_types.sql"),
    },
];

/// Bring the schema up to date and return the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Could not create the schema_migrations table")?;

    let applied = get_applied_migrations(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version))
        .collect();

    for migration in &pending {
        apply_migration(conn, migration)?;
    }

    if !pending.is_empty() {
        tracing::info!(
            applied = pending.len(),
            version = ?current_version(conn)?,
            "Schema upgraded"
        );
    }
    Ok(pending.len())
}

/// Highest applied migration version, `None` on a fresh database.
pub fn current_version(conn: &Connection) -> Result<Option<String>> {
    Ok(get_applied_migrations(conn)?.pop())
}

fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

/// Run one migration and record it in the same transaction, so a failing
/// script leaves neither its tables nor a version row behind.
fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::debug!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).with_context(|| {
        format!(
            "Migration {} ({}) failed",
            migration.version, migration.name
        )
    })?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (migration.version, migration.name, chrono::Utc::now().to_rfc3339()),
    )?;
    tx.commit()?;
    Ok(())
}
