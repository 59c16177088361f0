use async_trait::async_trait;
use entity::employees::{self, Entity as Employees};
use sea_orm::{ActiveValue::Set, EntityTrait, sea_query::OnConflict};
use tracing::debug;
use uuid::Uuid;

use crate::{DbPool, DbResult};

/// Persistence operations over the `Employee` collection.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Insert when `id` is empty (assigning one), otherwise overwrite the
    /// record stored under `id`, creating it if needed.
    async fn save(&self, record: employees::Model) -> DbResult<employees::Model>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<employees::Model>>;

    /// Every stored record. Ordering is whatever the backend returns.
    async fn find_all(&self) -> DbResult<Vec<employees::Model>>;

    /// Missing ids are not an error.
    async fn delete_by_id(&self, id: &str) -> DbResult<()>;
}

/// [`EmployeeStore`] backed by a sea-orm connection pool.
#[derive(Clone, Debug)]
pub struct EmployeeRepository {
    pool: DbPool,
}

impl EmployeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn save(&self, mut record: employees::Model) -> DbResult<employees::Model> {
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        let active = employees::ActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            email: Set(record.email.clone()),
            department: Set(record.department.clone()),
        };
        Employees::insert(active)
            .on_conflict(
                OnConflict::column(employees::Column::Id)
                    .update_columns([
                        employees::Column::Name,
                        employees::Column::Email,
                        employees::Column::Department,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<employees::Model>> {
        Ok(Employees::find_by_id(id.to_owned()).one(&self.pool).await?)
    }

    async fn find_all(&self) -> DbResult<Vec<employees::Model>> {
        Ok(Employees::find().all(&self.pool).await?)
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<()> {
        let res = Employees::delete_by_id(id.to_owned())
            .exec(&self.pool)
            .await?;
        debug!(employee_id = id, rows = res.rows_affected, "employee delete issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    async fn repository() -> EmployeeRepository {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        EmployeeRepository::new(pool)
    }

    fn unsaved(name: &str) -> employees::Model {
        employees::Model {
            id: String::new(),
            name: name.into(),
            email: format!("{}@example.test", name.to_lowercase()),
            department: "Eng".into(),
        }
    }

    #[tokio::test]
    async fn save_assigns_id_on_insert() {
        let repo = repository().await;
        let saved = repo.save(unsaved("Ada")).await.unwrap();
        assert!(!saved.id.is_empty());

        let found = repo.find_by_id(&saved.id).await.unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn save_with_id_overwrites() {
        let repo = repository().await;
        let mut saved = repo.save(unsaved("Ada")).await.unwrap();
        saved.department = "Research".into();
        let again = repo.save(saved.clone()).await.unwrap();
        assert_eq!(again.id, saved.id);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all, vec![saved]);
    }

    #[tokio::test]
    async fn save_with_unknown_id_inserts_under_that_id() {
        let repo = repository().await;
        let mut record = unsaved("Grace");
        record.id = "fixed-id".into();
        repo.save(record.clone()).await.unwrap();
        assert_eq!(repo.find_by_id("fixed-id").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn find_by_id_misses_quietly() {
        let repo = repository().await;
        assert_eq!(repo.find_by_id("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = repository().await;
        let saved = repo.save(unsaved("Ada")).await.unwrap();
        repo.delete_by_id(&saved.id).await.unwrap();
        repo.delete_by_id(&saved.id).await.unwrap();
        assert_eq!(repo.find_by_id(&saved.id).await.unwrap(), None);
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
