use sqlx::PgPool;

use crate::db::models::Answer;

const COLUMNS: &str = "id, question_id, text, is_correct, created_at";

const QUALIFIED_COLUMNS: &str = "a.id, a.question_id, a.text, a.is_correct, a.created_at";

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) question_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) is_correct: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateAnswer {
    pub(crate) text: Option<String>,
    pub(crate) is_correct: Option<bool>,
}

pub(crate) async fn create(pool: &PgPool, params: CreateAnswer<'_>) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, question_id, text, is_correct, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question_id)
    .bind(params.text)
    .bind(params.is_correct)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Owner resolved through answer -> question -> exam -> material.
pub(crate) async fn find_effective_owner(
    pool: &PgPool,
    answer_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT m.owner_id FROM answers a
         JOIN questions q ON q.id = a.question_id
         JOIN exams e ON e.id = q.exam_id
         JOIN materials m ON m.id = e.material_id
         WHERE a.id = $1",
    )
    .bind(answer_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_visible(
    pool: &PgPool,
    viewer_id: Option<&str>,
) -> Result<Vec<Answer>, sqlx::Error> {
    match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<_, Answer>(&format!(
                "SELECT {QUALIFIED_COLUMNS} FROM answers a
                 JOIN questions q ON q.id = a.question_id
                 JOIN exams e ON e.id = q.exam_id
                 JOIN materials m ON m.id = e.material_id
                 WHERE e.is_public = TRUE OR m.owner_id = $1
                 ORDER BY a.created_at, a.id",
            ))
            .bind(viewer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Answer>(&format!(
                "SELECT {QUALIFIED_COLUMNS} FROM answers a
                 JOIN questions q ON q.id = a.question_id
                 JOIN exams e ON e.id = q.exam_id
                 WHERE e.is_public = TRUE
                 ORDER BY a.created_at, a.id",
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn list_by_question_ids(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers
         WHERE question_id = ANY($1)
         ORDER BY created_at, id",
    ))
    .bind(question_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateAnswer,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE answers SET
            text = COALESCE($1, text),
            is_correct = COALESCE($2, is_correct)
         WHERE id = $3",
    )
    .bind(params.text)
    .bind(params.is_correct)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM answers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
