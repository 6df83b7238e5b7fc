use async_trait::async_trait;
use skylane_core::booking::User;
use skylane_core::repository::{RepoError, UserRepository};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

pub struct PostgresUserRepository {
    pub pool: sqlx::PgPool,
}

fn user_from_row(row: &PgRow) -> Result<User, RepoError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        points: row.try_get("points")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query("SELECT id, email, name, points FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_member_ref(&self, member_ref: &str) -> Result<Option<User>, RepoError> {
        // A member reference is an account id or an email; id wins when both
        // could match.
        let row = if let Ok(id) = Uuid::parse_str(member_ref) {
            sqlx::query("SELECT id, email, name, points FROM users WHERE id = $1 OR email = $2")
                .bind(id)
                .bind(member_ref)
                .fetch_optional(&self.pool)
                .await?
        } else {
            sqlx::query("SELECT id, email, name, points FROM users WHERE email = $1")
                .bind(member_ref)
                .fetch_optional(&self.pool)
                .await?
        };
        row.as_ref().map(user_from_row).transpose()
    }
}
