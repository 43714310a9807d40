use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;

pub mod api;

/// A single to-do item as stored by the service.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct ToDo {
    id: i64,
    title: String,
    description: Option<String>,
    reminder: DateTime<Utc>,
}

impl ToDo {
    pub fn new(id: i64, title: String, description: Option<String>, reminder: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description,
            reminder,
        }
    }

    /// Returns the storage-assigned identifier of the item.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the title of the item.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the optional free-text description of the item.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the reminder instant of the item.
    pub fn reminder(&self) -> DateTime<Utc> {
        self.reminder
    }
}

impl From<todo::Model> for ToDo {
    fn from(model: todo::Model) -> Self {
        ToDo::new(model.id, model.title, model.description, model.reminder)
    }
}

/// Error type for TodoService operations.
#[derive(Debug, thiserror::Error)]
pub enum TodoServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a to-do item not found error.
    #[error("To-do item with ID {0} not found")]
    TodoNotFound(i64),
    /// More than one row matched a single identifier. The primary key
    /// guarantees this cannot happen; seeing it means storage is corrupted.
    #[error("Found multiple to-do rows with ID {0}")]
    AmbiguousId(i64),
}

/// Shared state handed to every request handler: the pooled database handle.
#[derive(Clone)]
pub struct TodoState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

pub struct TodoService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TodoService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TodoService {
        TodoService { db }
    }

    /// Creates a new to-do item in the database.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the item.
    /// * `description` - An optional free-text description.
    /// * `reminder` - The reminder instant, normalized to UTC.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `ToDo` with its storage-assigned
    /// identifier if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_todo(
        &self,
        title: String,
        description: Option<String>,
        reminder: DateTime<Utc>,
    ) -> Result<ToDo, TodoServiceError> {
        let active_model = todo::ActiveModel {
            title: ActiveValue::Set(title),
            description: ActiveValue::Set(description),
            reminder: ActiveValue::Set(reminder),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(ToDo::from(created_model))
    }

    /// Retrieves a to-do item by its ID.
    ///
    /// Reads every row matching the identifier rather than stopping at the
    /// first, so a uniqueness violation in storage surfaces as
    /// `AmbiguousId` instead of being silently masked.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the item to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ToDo` if exactly one row matched, or an
    /// error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_todo_by_id(&self, id: i64) -> Result<ToDo, TodoServiceError> {
        let mut models = todo::Entity::find()
            .filter(todo::Column::Id.eq(id))
            .all(self.db)
            .await?;
        match models.len() {
            0 => Err(TodoServiceError::TodoNotFound(id)),
            1 => Ok(ToDo::from(models.remove(0))),
            _ => Err(TodoServiceError::AmbiguousId(id)),
        }
    }

    /// Overwrites title, description, and reminder of the item matching the
    /// identifier. All three fields are replaced unconditionally in a single
    /// UPDATE statement; there is no partial-field update.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the item to update.
    /// * `title` - The new title.
    /// * `description` - The new optional description.
    /// * `reminder` - The new reminder instant.
    ///
    /// # Returns
    ///
    /// A `Result` containing the affected row count if successful, or an
    /// error otherwise. Zero affected rows is reported as `TodoNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn update_todo(
        &self,
        id: i64,
        title: String,
        description: Option<String>,
        reminder: DateTime<Utc>,
    ) -> Result<u64, TodoServiceError> {
        let result = todo::Entity::update_many()
            .col_expr(todo::Column::Title, Expr::value(title))
            .col_expr(todo::Column::Description, Expr::value(description))
            .col_expr(todo::Column::Reminder, Expr::value(reminder))
            .filter(todo::Column::Id.eq(id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TodoServiceError::TodoNotFound(id));
        }
        Ok(result.rows_affected)
    }

    /// Deletes a to-do item by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the item to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the removed row count if successful, or an
    /// error otherwise. Zero removed rows is reported as `TodoNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_todo_by_id(&self, id: i64) -> Result<u64, TodoServiceError> {
        let result = todo::Entity::delete_by_id(id).exec(self.db).await?;

        if result.rows_affected == 0 {
            return Err(TodoServiceError::TodoNotFound(id));
        }
        Ok(result.rows_affected)
    }

    /// Retrieves all to-do items from the database, in whatever order the
    /// storage engine returns them.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `ToDo` if successful, or an error
    /// otherwise. An empty table yields an empty vector.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_todos(&self) -> Result<Vec<ToDo>, TodoServiceError> {
        let todos = todo::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(ToDo::from)
            .collect();
        Ok(todos)
    }
}
