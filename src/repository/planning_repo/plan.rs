// ==========================================
// DayPlanRepository - Plannings journaliers
// ==========================================
// Identité métier: (site_id, date) unique. Le changement de statut est
// protégé par verrou optimiste (colonne revision).
// ==========================================

use crate::domain::planning::DayPlan;
use crate::domain::types::PlanStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_date, parse_datetime, DATETIME_FMT, DATE_FMT};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct DayPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DayPlanRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, plan: &DayPlan) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO day_plan (
                plan_id, site_id, date, status, revision, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &plan.plan_id,
                &plan.site_id,
                plan.date.format(DATE_FMT).to_string(),
                plan.status.to_db_str(),
                plan.revision,
                plan.created_at.format(DATETIME_FMT).to_string(),
                plan.updated_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        Ok(plan.plan_id.clone())
    }

    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<DayPlan>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT plan_id, site_id, date, status, revision, created_at, updated_at
               FROM day_plan WHERE plan_id = ?"#,
            params![plan_id],
            Self::map_row,
        ) {
            Ok(plan) => Ok(Some(plan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_site_and_date(
        &self,
        site_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayPlan>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT plan_id, site_id, date, status, revision, created_at, updated_at
               FROM day_plan WHERE site_id = ? AND date = ?"#,
            params![site_id, date.format(DATE_FMT).to_string()],
            Self::map_row,
        ) {
            Ok(plan) => Ok(Some(plan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Retourne le planning (site, date), en le créant en DRAFT s'il
    /// n'existe pas. L'insertion et la relecture partagent la même
    /// transaction.
    pub fn find_or_create_draft(
        &self,
        site_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> RepositoryResult<DayPlan> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let date_str = date.format(DATE_FMT).to_string();
        let existing = tx
            .query_row(
                r#"SELECT plan_id, site_id, date, status, revision, created_at, updated_at
                   FROM day_plan WHERE site_id = ? AND date = ?"#,
                params![site_id, &date_str],
                Self::map_row,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        if let Some(plan) = existing {
            tx.commit()?;
            return Ok(plan);
        }

        let plan = DayPlan {
            plan_id: Uuid::new_v4().to_string(),
            site_id: site_id.to_string(),
            date,
            status: PlanStatus::Draft,
            revision: 0,
            created_at: now,
            updated_at: now,
        };

        tx.execute(
            r#"INSERT INTO day_plan (
                plan_id, site_id, date, status, revision, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &plan.plan_id,
                &plan.site_id,
                &date_str,
                plan.status.to_db_str(),
                plan.revision,
                now.format(DATETIME_FMT).to_string(),
                now.format(DATETIME_FMT).to_string(),
            ],
        )?;

        tx.commit()?;
        Ok(plan)
    }

    /// Change le statut avec contrôle de verrou optimiste.
    ///
    /// # Erreurs
    /// - `OptimisticLockFailure`: revision dépassée (mise à jour concurrente)
    /// - `NotFound`: plan_id inexistant
    pub fn update_status(
        &self,
        plan_id: &str,
        status: PlanStatus,
        expected_revision: i32,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            r#"UPDATE day_plan
               SET status = ?, revision = revision + 1, updated_at = ?
               WHERE plan_id = ? AND revision = ?"#,
            params![
                status.to_db_str(),
                now.format(DATETIME_FMT).to_string(),
                plan_id,
                expected_revision,
            ],
        )?;

        if rows_affected == 0 {
            let actual: Result<i32, _> = conn.query_row(
                "SELECT revision FROM day_plan WHERE plan_id = ?",
                params![plan_id],
                |row| row.get(0),
            );

            return match actual {
                Ok(actual_revision) => Err(RepositoryError::OptimisticLockFailure {
                    plan_id: plan_id.to_string(),
                    expected: expected_revision,
                    actual: actual_revision,
                }),
                Err(_) => Err(RepositoryError::NotFound {
                    entity: "DayPlan".to_string(),
                    id: plan_id.to_string(),
                }),
            };
        }

        Ok(())
    }

    pub fn list_by_site_range(
        &self,
        site_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DayPlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT plan_id, site_id, date, status, revision, created_at, updated_at
               FROM day_plan
               WHERE site_id = ? AND date >= ? AND date <= ?
               ORDER BY date"#,
        )?;

        let plans = stmt
            .query_map(
                params![
                    site_id,
                    start.format(DATE_FMT).to_string(),
                    end.format(DATE_FMT).to_string()
                ],
                Self::map_row,
            )?
            .collect::<Result<Vec<DayPlan>, _>>()?;

        Ok(plans)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<DayPlan> {
        let date_raw: String = row.get(2)?;
        let status_raw: String = row.get(3)?;
        let status = PlanStatus::from_db_str(&status_raw)
            .ok_or_else(|| bad_enum(3, "statut de planning", &status_raw))?;
        let created_raw: String = row.get(5)?;
        let updated_raw: String = row.get(6)?;

        Ok(DayPlan {
            plan_id: row.get(0)?,
            site_id: row.get(1)?,
            date: parse_date(2, &date_raw)?,
            status,
            revision: row.get(4)?,
            created_at: parse_datetime(5, &created_raw)?,
            updated_at: parse_datetime(6, &updated_raw)?,
        })
    }
}
