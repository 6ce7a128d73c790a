use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::profile::errors::ProfileError;
use crate::profile::types::{Profile, ProfileSearchField, ProfileUpdate};
use crate::storage::validate_sqlite_table_schema;

use super::config::DB_TABLE_PROFILES;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            user_id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            username TEXT UNIQUE,
            bio TEXT,
            profile_picture_url TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| ProfileError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn validate_profile_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), ProfileError> {
    let expected_columns = [
        ("user_id", "TEXT"),
        ("email", "TEXT"),
        ("username", "TEXT"),
        ("bio", "TEXT"),
        ("profile_picture_url", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        DB_TABLE_PROFILES.as_str(),
        &expected_columns,
        ProfileError::Storage,
    )
    .await
}

pub(super) async fn get_profile_by_field_sqlite(
    pool: &Pool<Sqlite>,
    field: &ProfileSearchField,
) -> Result<Option<Profile>, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let (column, value) = match field {
        ProfileSearchField::UserId(id) => ("user_id", id),
        ProfileSearchField::Username(name) => ("username", name),
    };

    Ok(sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE {column} = ?
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await?)
}

pub(super) async fn insert_profile_sqlite(
    pool: &Pool<Sqlite>,
    profile: &Profile,
) -> Result<Profile, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (user_id, email, username, bio, profile_picture_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
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

    // A concurrent creator may have won; return whatever is stored
    Ok(sqlx::query_as::<_, Profile>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(&profile.user_id)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn update_fields_sqlite(
    pool: &Pool<Sqlite>,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<bool, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET
            username = COALESCE(?, username),
            bio = COALESCE(?, bio),
            updated_at = ?
        WHERE user_id = ?
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

pub(super) async fn set_picture_url_sqlite(
    pool: &Pool<Sqlite>,
    user_id: &str,
    url: &str,
) -> Result<bool, ProfileError> {
    let table_name = DB_TABLE_PROFILES.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET profile_picture_url = ?, updated_at = ?
        WHERE user_id = ?
        "#
    ))
    .bind(url)
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
