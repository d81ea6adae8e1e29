use sqlx::{FromRow, PgPool};

use crate::db::models::Question;

const COLUMNS: &str = "id, exam_id, text, is_multiple_choice, created_at";

const QUALIFIED_COLUMNS: &str = "q.id, q.exam_id, q.text, q.is_multiple_choice, q.created_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) is_multiple_choice: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateQuestion {
    pub(crate) text: Option<String>,
    pub(crate) is_multiple_choice: Option<bool>,
}

/// One row per question of an exam, paired with the id of its first correct
/// answer in insertion order, when one exists.
#[derive(Debug, FromRow)]
pub(crate) struct ScoringKey {
    pub(crate) question_id: String,
    pub(crate) correct_answer_id: Option<String>,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, exam_id, text, is_multiple_choice, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.text)
    .bind(params.is_multiple_choice)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Owner resolved through the ancestor chain question -> exam -> material.
pub(crate) async fn find_effective_owner(
    pool: &PgPool,
    question_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT m.owner_id FROM questions q
         JOIN exams e ON e.id = q.exam_id
         JOIN materials m ON m.id = e.material_id
         WHERE q.id = $1",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

/// Question visibility follows the parent exam: public exam, or an exam whose
/// material the viewer owns.
pub(crate) async fn list_visible(
    pool: &PgPool,
    viewer_id: Option<&str>,
) -> Result<Vec<Question>, sqlx::Error> {
    match viewer_id {
        Some(viewer_id) => {
            sqlx::query_as::<_, Question>(&format!(
                "SELECT {QUALIFIED_COLUMNS} FROM questions q
                 JOIN exams e ON e.id = q.exam_id
                 JOIN materials m ON m.id = e.material_id
                 WHERE e.is_public = TRUE OR m.owner_id = $1
                 ORDER BY q.created_at, q.id",
            ))
            .bind(viewer_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Question>(&format!(
                "SELECT {QUALIFIED_COLUMNS} FROM questions q
                 JOIN exams e ON e.id = q.exam_id
                 WHERE e.is_public = TRUE
                 ORDER BY q.created_at, q.id",
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn list_by_exam_ids(
    pool: &PgPool,
    exam_ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions
         WHERE exam_id = ANY($1)
         ORDER BY created_at, id",
    ))
    .bind(exam_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn scoring_keys(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<ScoringKey>, sqlx::Error> {
    sqlx::query_as::<_, ScoringKey>(
        "SELECT q.id AS question_id,
                (SELECT a.id FROM answers a
                 WHERE a.question_id = q.id AND a.is_correct = TRUE
                 ORDER BY a.created_at, a.id
                 LIMIT 1) AS correct_answer_id
         FROM questions q
         WHERE q.exam_id = $1
         ORDER BY q.created_at, q.id",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateQuestion,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE questions SET
            text = COALESCE($1, text),
            is_multiple_choice = COALESCE($2, is_multiple_choice)
         WHERE id = $3",
    )
    .bind(params.text)
    .bind(params.is_multiple_choice)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
