use sqlx::PgPool;

use crate::db::models::Exam;

const COLUMNS: &str =
    "id, material_id, owner_id, title, description, is_public, created_at, updated_at";

const QUALIFIED_COLUMNS: &str = "\
    e.id, e.material_id, e.owner_id, e.title, e.description, e.is_public, \
    e.created_at, e.updated_at";

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) material_id: &'a str,
    pub(crate) owner_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) is_public: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateExam {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) is_public: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, material_id, owner_id, title, description, is_public, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.material_id)
    .bind(params.owner_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.is_public)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Visibility for lists follows the owning material: the viewer sees exams
/// whose material they own, plus public exams.
pub(crate) async fn list_visible(
    pool: &PgPool,
    viewer_id: Option<&str>,
) -> Result<Vec<Exam>, sqlx::Error> {
    match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<_, Exam>(&format!(
                "SELECT {QUALIFIED_COLUMNS} FROM exams e
                 JOIN materials m ON m.id = e.material_id
                 WHERE e.is_public = TRUE OR m.owner_id = $1
                 ORDER BY e.created_at, e.id",
            ))
            .bind(viewer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Exam>(&format!(
                "SELECT {COLUMNS} FROM exams
                 WHERE is_public = TRUE
                 ORDER BY created_at, id",
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateExam) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exams SET
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
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
