//! Route handlers for the category endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::Session,
    category::{
        Category, CategoryForm, CategoryId, CategoryUpdate, NewCategory, create_category,
        delete_category, get_all_categories, get_category, update_category,
    },
    extract::JsonBody,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's categories ordered by name.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_all_categories(session.user_id, &connection)?;

    Ok(Json(categories))
}

/// Create a custom category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
    JsonBody(form): JsonBody<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let new_category = NewCategory::try_from(form)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(session.user_id, new_category, &connection)
        .inspect_err(|error| tracing::error!("could not create category: {error}"))?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Show one of the user's categories.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let category = get_category(category_id, session.user_id, &connection)?;

    Ok(Json(category))
}

/// Change some or all of a category's fields.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
    Path(category_id): Path<CategoryId>,
    JsonBody(update): JsonBody<CategoryUpdate>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let category = match get_category(category_id, session.user_id, &connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    };
    let category = update.apply(category)?;
    update_category(&category, &connection)?;

    Ok(Json(category))
}

/// Delete a category. Its transactions become uncategorized.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_category(category_id, session.user_id, &connection)?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
