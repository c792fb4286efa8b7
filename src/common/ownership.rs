// src/common/ownership.rs
//! Owner-only mutation guard shared by every entity type
//!
//! Resolve the target by id (NotFound), compare its owner with the caller
//! (NotAuthorized), hand back the loaded row for the mutation.

use sqlx::{sqlite::SqliteRow, FromRow, SqlitePool};
use tracing::warn;

use super::error::ApiError;

/// An entity row owned by exactly one user
pub trait Owned {
    /// Human-readable kind used in error messages
    const KIND: &'static str;
    /// Table the entity lives in
    const TABLE: &'static str;

    fn owner_id(&self) -> &str;
}

/// Check an already-resolved entity against the caller
pub fn ensure_owner<T: Owned>(
    entity: Option<T>,
    entity_id: &str,
    caller_id: &str,
) -> Result<T, ApiError> {
    let entity = entity.ok_or_else(|| {
        warn!(entity = T::KIND, entity_id = %entity_id, "Entity not found");
        ApiError::NotFound(format!("{} not found", T::KIND))
    })?;

    if entity.owner_id() != caller_id {
        warn!(
            entity = T::KIND,
            entity_id = %entity_id,
            caller_id = %caller_id,
            owner_id = %entity.owner_id(),
            "Ownership check failed"
        );
        return Err(ApiError::NotAuthorized(format!(
            "You do not own this {}",
            T::KIND
        )));
    }

    Ok(entity)
}

/// Load an entity by id
pub async fn find_by_id<T>(db: &SqlitePool, id: &str) -> Result<Option<T>, ApiError>
where
    T: Owned + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let query = format!("SELECT * FROM {} WHERE id = ?", T::TABLE);
    let found = sqlx::query_as::<_, T>(&query)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found)
}

/// Load an entity by id and require the caller to own it
pub async fn authorize_owned<T>(db: &SqlitePool, id: &str, caller_id: &str) -> Result<T, ApiError>
where
    T: Owned + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let found = find_by_id::<T>(db, id).await?;
    ensure_owner(found, id, caller_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Garage {
        owner: String,
    }

    impl Owned for Garage {
        const KIND: &'static str = "Garage";
        const TABLE: &'static str = "garages";

        fn owner_id(&self) -> &str {
            &self.owner
        }
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let result = ensure_owner::<Garage>(None, "G_1", "U_1");
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_foreign_entity_is_not_authorized() {
        let garage = Garage {
            owner: "U_2".to_string(),
        };
        let result = ensure_owner(Some(garage), "G_1", "U_1");
        assert!(matches!(result, Err(ApiError::NotAuthorized(_))));
    }

    #[test]
    fn test_owner_gets_entity_back() {
        let garage = Garage {
            owner: "U_1".to_string(),
        };
        let garage = ensure_owner(Some(garage), "G_1", "U_1").unwrap();
        assert_eq!(garage.owner_id(), "U_1");
    }
}
