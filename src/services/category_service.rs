use std::time::SystemTime;

use tracing::{debug, info};

use crate::{
    dao::models::{CategoryEntity, RenameOutcome},
    error::ServiceError,
    state::SharedState,
};

/// Categories seeded the first time the collection is read empty.
pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Action",
    "Adventure",
    "Arcade",
    "Fighting",
    "Puzzle",
    "Racing",
    "Shooting",
    "Sports",
    "Strategy",
];

/// Every category name, seeding [`DEFAULT_CATEGORIES`] when none exist yet.
///
/// Seeding relies on the unique index over `name`: a concurrent reader seeding at the same time
/// makes some inserts fail with a duplicate, which is ignored.
pub async fn list_categories(state: &SharedState) -> Result<Vec<String>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let categories = store.list_categories().await?;
    if !categories.is_empty() {
        return Ok(names(categories));
    }

    let now = SystemTime::now();
    for name in DEFAULT_CATEGORIES {
        match store.insert_category(CategoryEntity::new(name, now)).await {
            Ok(()) => {}
            Err(err) if err.is_duplicate() => {
                debug!(name, "default category already seeded");
            }
            Err(err) => return Err(err.into()),
        }
    }
    info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");

    let categories = store.list_categories().await?;
    Ok(names(categories))
}

/// Create a category. A taken name is a [`ServiceError::Conflict`].
pub async fn create_category(state: &SharedState, name: Option<String>) -> Result<String, ServiceError> {
    let name = required_name(name, "category name is required")?;
    let store = state.require_catalog_store().await?;

    store
        .insert_category(CategoryEntity::new(name.clone(), SystemTime::now()))
        .await?;
    info!(name, "category created");
    Ok(name)
}

/// Rename `old_name` and move every game filed under it to the new name.
///
/// The cascade runs even when `old_name` is no longer a category, so repeating a rename finishes
/// a cascade that was interrupted earlier.
pub async fn rename_category(
    state: &SharedState,
    old_name: &str,
    new_name: Option<String>,
) -> Result<RenameOutcome, ServiceError> {
    let new_name = required_name(new_name, "new category name is required")?;
    if new_name == old_name {
        return Ok(RenameOutcome::default());
    }

    let store = state.require_catalog_store().await?;
    let outcome = store
        .rename_category(old_name.to_owned(), new_name.clone(), SystemTime::now())
        .await?;

    info!(
        old_name,
        new_name,
        renamed = outcome.renamed,
        games_updated = outcome.games_updated,
        "category renamed"
    );
    Ok(outcome)
}

/// Delete a category unless a game still references it by exact name.
///
/// Deleting an absent name succeeds and returns `false`.
pub async fn delete_category(state: &SharedState, name: &str) -> Result<bool, ServiceError> {
    let store = state.require_catalog_store().await?;

    let games = store.count_games_in_category(name.to_owned()).await?;
    if games > 0 {
        return Err(ServiceError::CategoryInUse {
            name: name.to_owned(),
            games,
        });
    }

    let removed = store.delete_category(name.to_owned()).await?;
    if removed {
        info!(name, "category deleted");
    }
    Ok(removed)
}

fn required_name(name: Option<String>, message: &str) -> Result<String, ServiceError> {
    name.map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ServiceError::InvalidInput(message.to_owned()))
}

fn names(categories: Vec<CategoryEntity>) -> Vec<String> {
    categories.into_iter().map(|category| category.name).collect()
}
