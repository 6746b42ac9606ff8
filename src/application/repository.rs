//! SQLite-backed application store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{ApplicantDetails, Application, ApplicationStatus, NewApplication, ReviewUpdate};
use crate::db::{ApplicationStore, DbPool};
use crate::{IntakeError, Result};

const SELECT_COLUMNS: &str = "SELECT id, created_at, last_name, middle_name, first_name, sex,
        birth_date, phone, email, address, institution, field_of_study, level, academic_year,
        tools, tool_proficiency, motivation, skills, resume_path, portfolio_path, status, notes
     FROM applications";

/// SQLite-backed [`ApplicationStore`].
#[derive(Clone)]
pub struct SqliteApplicationStore {
    pool: DbPool,
}

impl SqliteApplicationStore {
    /// Create a store on the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for SqliteApplicationStore {
    async fn insert(&self, new_application: &NewApplication) -> Result<Application> {
        let a = &new_application.applicant;
        let tools = serde_json::to_string(&a.tools)
            .map_err(|e| IntakeError::Database(format!("tools encoding failed: {e}")))?;

        sqlx::query(
            "INSERT INTO applications (
                id, created_at, last_name, middle_name, first_name, sex, birth_date, phone,
                email, address, institution, field_of_study, level, academic_year, tools,
                tool_proficiency, motivation, skills, resume_path, portfolio_path, status
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new_application.id.to_string())
        .bind(Utc::now())
        .bind(&a.last_name)
        .bind(&a.middle_name)
        .bind(&a.first_name)
        .bind(&a.sex)
        .bind(&a.birth_date)
        .bind(&a.phone)
        .bind(&a.email)
        .bind(&a.address)
        .bind(&a.institution)
        .bind(&a.field_of_study)
        .bind(&a.level)
        .bind(&a.academic_year)
        .bind(tools)
        .bind(&a.tool_proficiency)
        .bind(&a.motivation)
        .bind(&a.skills)
        .bind(&new_application.resume_path)
        .bind(&new_application.portfolio_path)
        .bind(ApplicationStatus::Received.as_str())
        .execute(&self.pool)
        .await?;

        self.get(new_application.id)
            .await?
            .ok_or_else(|| IntakeError::NotFound("application".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(ApplicationRow::into_application).transpose()
    }

    async fn list_recent(&self) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ApplicationRow::into_application).collect()
    }

    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<bool> {
        let result = sqlx::query("UPDATE applications SET status = ?, notes = ? WHERE id = ?")
            .bind(update.status.as_str())
            .bind(&update.notes)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Internal struct for mapping database rows to Application.
#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    created_at: DateTime<Utc>,
    last_name: String,
    middle_name: String,
    first_name: String,
    sex: String,
    birth_date: String,
    phone: String,
    email: String,
    address: Option<String>,
    institution: String,
    field_of_study: String,
    level: String,
    academic_year: Option<String>,
    tools: String,
    tool_proficiency: Option<String>,
    motivation: Option<String>,
    skills: Option<String>,
    resume_path: String,
    portfolio_path: Option<String>,
    status: String,
    notes: Option<String>,
}

impl ApplicationRow {
    fn into_application(self) -> Result<Application> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| IntakeError::Database(format!("bad application id {}: {e}", self.id)))?;
        let status = self.status.parse().map_err(IntakeError::Database)?;

        Ok(Application {
            id,
            created_at: self.created_at,
            applicant: ApplicantDetails {
                last_name: self.last_name,
                middle_name: self.middle_name,
                first_name: self.first_name,
                sex: self.sex,
                birth_date: self.birth_date,
                phone: self.phone,
                email: self.email,
                address: self.address,
                institution: self.institution,
                field_of_study: self.field_of_study,
                level: self.level,
                academic_year: self.academic_year,
                tools: serde_json::from_str(&self.tools).unwrap_or_default(),
                tool_proficiency: self.tool_proficiency,
                motivation: self.motivation,
                skills: self.skills,
            },
            resume_path: self.resume_path,
            portfolio_path: self.portfolio_path,
            status,
            notes: self.notes,
        })
    }
}
