use sqlx::PgPool;

use crate::db::models::Material;

const COLUMNS: &str =
    "id, section_id, owner_id, title, content, is_public, created_at, updated_at";

pub(crate) struct CreateMaterial<'a> {
    pub(crate) id: &'a str,
    pub(crate) section_id: &'a str,
    pub(crate) owner_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) is_public: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateMaterial {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) is_public: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMaterial<'_>,
) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "INSERT INTO materials (
            id, section_id, owner_id, title, content, is_public, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.section_id)
    .bind(params.owner_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.is_public)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {COLUMNS} FROM materials WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {COLUMNS} FROM materials WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_visible(
    pool: &PgPool,
    viewer_id: Option<&str>,
) -> Result<Vec<Material>, sqlx::Error> {
    match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<_, Material>(&format!(
                "SELECT {COLUMNS} FROM materials
                 WHERE is_public = TRUE OR owner_id = $1
                 ORDER BY created_at, id",
            ))
            .bind(viewer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Material>(&format!(
                "SELECT {COLUMNS} FROM materials
                 WHERE is_public = TRUE
                 ORDER BY created_at, id",
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn list_by_section_ids(
    pool: &PgPool,
    section_ids: &[String],
) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {COLUMNS} FROM materials
         WHERE section_id = ANY($1)
         ORDER BY created_at, id",
    ))
    .bind(section_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateMaterial,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE materials SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            is_public = COALESCE($3, is_public),
            updated_at = $4
         WHERE id = $5",
    )
    .bind(params.title)
    .bind(params.content)
    .bind(params.is_public)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
