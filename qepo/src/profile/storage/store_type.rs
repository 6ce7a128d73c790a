use crate::profile::errors::ProfileError;
use crate::profile::types::{Profile, ProfileSearchField, ProfileUpdate};
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::*;
use super::sqlite::*;

pub(crate) struct ProfileStore;

impl ProfileStore {
    /// Create the profiles table if needed and check its columns
    pub(crate) async fn init() -> Result<(), ProfileError> {
        let store = &*GENERIC_DATA_STORE;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_profile_tables_sqlite(pool).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_profile_tables_postgres(pool).await
            }
            _ => Err(ProfileError::Storage("Unsupported database type".to_string())),
        }
    }

    #[tracing::instrument(fields(profile_field = %field))]
    pub(crate) async fn get_profile_by(
        field: ProfileSearchField,
    ) -> Result<Option<Profile>, ProfileError> {
        let store = &*GENERIC_DATA_STORE;

        let result = if let Some(pool) = store.as_sqlite() {
            get_profile_by_field_sqlite(pool, &field).await
        } else if let Some(pool) = store.as_postgres() {
            get_profile_by_field_postgres(pool, &field).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "Profile lookup completed"),
            Err(e) => tracing::error!(error = %e, "Profile lookup failed"),
        }

        result
    }

    /// Insert unless a row for the user already exists; returns the stored row.
    #[tracing::instrument(skip(profile), fields(user_id = %profile.user_id))]
    pub(crate) async fn insert_profile(profile: &Profile) -> Result<Profile, ProfileError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            insert_profile_sqlite(pool, profile).await
        } else if let Some(pool) = store.as_postgres() {
            insert_profile_postgres(pool, profile).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    /// `false` when no row matched `user_id`
    #[tracing::instrument(skip(update))]
    pub(crate) async fn update_fields(
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<bool, ProfileError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            update_fields_sqlite(pool, user_id, update).await
        } else if let Some(pool) = store.as_postgres() {
            update_fields_postgres(pool, user_id, update).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument]
    pub(crate) async fn set_picture_url(user_id: &str, url: &str) -> Result<bool, ProfileError> {
        let store = &*GENERIC_DATA_STORE;

        if let Some(pool) = store.as_sqlite() {
            set_picture_url_sqlite(pool, user_id, url).await
        } else if let Some(pool) = store.as_postgres() {
            set_picture_url_postgres(pool, user_id, url).await
        } else {
            Err(ProfileError::Storage("Unsupported database type".to_string()))
        }
    }
}
