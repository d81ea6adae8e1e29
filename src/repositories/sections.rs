use sqlx::PgPool;

use crate::db::models::Section;

const COLUMNS: &str = "id, title, description, owner_id, is_public, created_at, updated_at";

pub(crate) struct CreateSection<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) owner_id: &'a str,
    pub(crate) is_public: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateSection {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_public: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSection<'_>,
) -> Result<Section, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "INSERT INTO sections (
            id, title, description, owner_id, is_public, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.owner_id)
    .bind(params.is_public)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!("SELECT {COLUMNS} FROM sections WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Section, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!("SELECT {COLUMNS} FROM sections WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Sections visible to the viewer: their own plus public ones.
/// An anonymous viewer sees public sections only.
pub(crate) async fn list_visible(
    pool: &PgPool,
    viewer_id: Option<&str>,
) -> Result<Vec<Section>, sqlx::Error> {
    match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<_, Section>(&format!(
                "SELECT {COLUMNS} FROM sections
                 WHERE is_public = TRUE OR owner_id = $1
                 ORDER BY created_at, id",
            ))
            .bind(viewer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Section>(&format!(
                "SELECT {COLUMNS} FROM sections
                 WHERE is_public = TRUE
                 ORDER BY created_at, id",
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateSection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE sections SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            is_public = COALESCE($3, is_public),
            updated_at = $4
         WHERE id = $5",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.is_public)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sections WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
