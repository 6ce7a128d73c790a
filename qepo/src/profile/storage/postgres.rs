use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::profile::errors::ProfileError;
use crate::profile::types::{Profile, ProfileSearchField, ProfileUpdate};
use crate::storage::validate_postgres_table_schema;

use super::config::DB_TABLE_PROFILES;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            username TEXT UNIQUE,
            bio TEXT,
            profile_picture_url TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_profile_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), ProfileError> {
    let expected_columns = [
        ("user_id", "text"),
        ("email", "text"),
        ("username", "text"),
        ("bio", "text"),
        ("profile_picture_url", "text"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_PROFILES.as_str(),
        &expected_columns,
        ProfileError::Storage,
    )
    .await
}

pub(super) async fn get_profile_by_field_postgres(
    pool: &Pool<Postgres>,
    field: &ProfileSearchField,
) -> Result<Option<Profile>, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let (column, value) = match field {
        ProfileSearchField::UserId(id) => ("user_id", id),
        ProfileSearchField::Username(name) => ("username", name),
    };

    Ok(sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE {column} = $1
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn insert_profile_postgres(
    pool: &Pool<Postgres>,
    profile: &Profile,
) -> Result<Profile, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (user_id, email, username, bio, profile_picture_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO NOTHING
        "#
    ))
    .bind(&profile.user_id)
    .bind(&profile.email)
    .bind(&profile.username)
    .bind(&profile.bio)
    .bind(&profile.profile_picture_url)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await?;

    Ok(sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE user_id = $1
        "#
    ))
    .bind(&profile.user_id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_fields_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<bool, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET
            username = COALESCE($1, username),
            bio = COALESCE($2, bio),
            updated_at = $3
        WHERE user_id = $4
        "#
    ))
    .bind(&update.username)
    .bind(&update.bio)
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn set_picture_url_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
    url: &str,
) -> Result<bool, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET profile_picture_url = $1, updated_at = $2
        WHERE user_id = $3
        "#
    ))
    .bind(url)
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
