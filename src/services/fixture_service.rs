//! Fixture loading and dumping.
//!
//! Fixtures seed a test environment with known users. `load` reorders
//! entries into dependency order before inserting so that files produced
//! by other tools (in arbitrary model order) still load cleanly.

use std::path::Path;

use chrono::Utc;

use crate::{
    db::DbPool,
    error::ApiError,
    models::fixture::{
        FixtureEntry, USER_MODEL, UserFields, model_rank, parse_fixture_date,
    },
    services::user_service,
};

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed fixture JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {model} record (pk {pk}): {reason}")]
    InvalidRecord {
        model: String,
        pk: String,
        reason: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a fixture load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records written to the database
    pub loaded: usize,

    /// Records of models this service does not store
    pub skipped: usize,
}

/// Sort entries into dependency order, keeping file order within a model.
pub fn sort_entries(entries: &mut [FixtureEntry]) {
    entries.sort_by_key(|entry| model_rank(&entry.model));
}

/// Parse fixture JSON text.
pub fn parse(text: &str) -> Result<Vec<FixtureEntry>, FixtureError> {
    Ok(serde_json::from_str(text)?)
}

/// Read and load a fixture file.
pub async fn load_file(pool: &DbPool, path: &Path) -> Result<LoadSummary, FixtureError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;

    load(pool, parse(&text)?).await
}

/// Load fixture entries inside a single transaction.
///
/// `auth.user` records are upserted by primary key; any other model is
/// skipped. One malformed record rolls back the whole load.
pub async fn load(
    pool: &DbPool,
    mut entries: Vec<FixtureEntry>,
) -> Result<LoadSummary, FixtureError> {
    sort_entries(&mut entries);

    let mut summary = LoadSummary::default();
    let mut tx = pool.begin().await?;

    for entry in entries {
        if entry.model != USER_MODEL {
            tracing::warn!(model = %entry.model, pk = %entry.pk, "Skipping unsupported fixture model");
            summary.skipped += 1;
            continue;
        }

        let invalid = |reason: String| FixtureError::InvalidRecord {
            model: entry.model.clone(),
            pk: entry.pk.to_string(),
            reason,
        };

        let pk = entry
            .pk
            .as_i64()
            .ok_or_else(|| invalid("primary key must be an integer".to_string()))?;

        let fields: UserFields =
            serde_json::from_value(entry.fields.clone()).map_err(|e| invalid(e.to_string()))?;

        if fields.username.trim().is_empty() {
            return Err(invalid("username is empty".to_string()));
        }

        let date_joined = match fields.date_joined.as_deref() {
            Some(value) => parse_fixture_date(value)
                .ok_or_else(|| invalid(format!("bad date_joined '{}'", value)))?,
            None => Utc::now(),
        };
        let last_login = match fields.last_login.as_deref() {
            Some(value) => Some(
                parse_fixture_date(value)
                    .ok_or_else(|| invalid(format!("bad last_login '{}'", value)))?,
            ),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, username, first_name, last_name, email, password, is_active, is_staff, date_joined, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                password = excluded.password,
                is_active = excluded.is_active,
                is_staff = excluded.is_staff,
                date_joined = excluded.date_joined,
                last_login = excluded.last_login
            "#,
        )
        .bind(pk)
        .bind(fields.username.trim())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.password)
        .bind(fields.is_active)
        .bind(fields.is_staff)
        .bind(date_joined)
        .bind(last_login)
        .execute(&mut *tx)
        .await?;

        summary.loaded += 1;
    }

    tx.commit().await?;

    tracing::info!(
        loaded = summary.loaded,
        skipped = summary.skipped,
        "Fixture loaded"
    );

    Ok(summary)
}

/// Dump every user as fixture entries, ordered by primary key.
pub async fn dump(pool: &DbPool) -> Result<Vec<FixtureEntry>, FixtureError> {
    let users = user_service::all_users(pool).await?;

    Ok(users.iter().map(FixtureEntry::from).collect())
}
