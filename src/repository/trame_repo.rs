// ==========================================
// TrameRepository - Trames récurrentes et leurs affectations
// ==========================================

use crate::domain::trame::{TrameAffectation, TrameModele, TrameWithAffectations};
use crate::domain::types::{Period, StaffRole, WeekDay, WeekParity};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_date, DATE_FMT};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct TrameRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TrameRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, trame: &TrameModele) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO trame_modele (
                trame_id, site_id, name, week_parity, is_active,
                effective_from, effective_until
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &trame.trame_id,
                &trame.site_id,
                &trame.name,
                trame.week_parity.to_db_str(),
                trame.is_active as i32,
                trame.effective_from.map(|d| d.format(DATE_FMT).to_string()),
                trame.effective_until.map(|d| d.format(DATE_FMT).to_string()),
            ],
        )?;

        Ok(trame.trame_id.clone())
    }

    pub fn add_affectation(&self, affectation: &TrameAffectation) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO trame_affectation (
                affectation_id, trame_id, day_of_week, week_parity, period,
                room_id, surgeon_id, staff_id, staff_role,
                is_primary_anesthetist, expected_specialty, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &affectation.affectation_id,
                &affectation.trame_id,
                affectation.day_of_week.to_db_str(),
                affectation.week_parity.to_db_str(),
                affectation.period.to_db_str(),
                &affectation.room_id,
                &affectation.surgeon_id,
                &affectation.staff_id,
                affectation.staff_role.map(|r| r.to_db_str()),
                affectation.is_primary_anesthetist as i32,
                &affectation.expected_specialty,
                affectation.is_active as i32,
            ],
        )?;

        Ok(affectation.affectation_id.clone())
    }

    /// Charge les trames actives demandées avec leurs affectations,
    /// dans l'ordre des IDs fournis (la première trame gagne les
    /// créneaux disputés).
    pub fn load_active_with_affectations(
        &self,
        trame_ids: &[String],
    ) -> RepositoryResult<Vec<TrameWithAffectations>> {
        let mut out = Vec::with_capacity(trame_ids.len());

        for trame_id in trame_ids {
            let Some(trame) = self.find_by_id(trame_id)? else {
                continue;
            };
            if !trame.is_active {
                continue;
            }
            let affectations = self.list_affectations(trame_id)?;
            out.push(TrameWithAffectations {
                trame,
                affectations,
            });
        }

        Ok(out)
    }

    pub fn find_by_id(&self, trame_id: &str) -> RepositoryResult<Option<TrameModele>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT trame_id, site_id, name, week_parity, is_active,
                      effective_from, effective_until
               FROM trame_modele WHERE trame_id = ?"#,
            params![trame_id],
            Self::map_trame_row,
        ) {
            Ok(trame) => Ok(Some(trame)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_affectations(&self, trame_id: &str) -> RepositoryResult<Vec<TrameAffectation>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT affectation_id, trame_id, day_of_week, week_parity, period,
                      room_id, surgeon_id, staff_id, staff_role,
                      is_primary_anesthetist, expected_specialty, is_active
               FROM trame_affectation WHERE trame_id = ?
               ORDER BY affectation_id"#,
        )?;

        let affectations = stmt
            .query_map(params![trame_id], Self::map_affectation_row)?
            .collect::<Result<Vec<TrameAffectation>, _>>()?;

        Ok(affectations)
    }

    fn map_trame_row(row: &rusqlite::Row) -> rusqlite::Result<TrameModele> {
        let parity_raw: String = row.get(3)?;
        let week_parity = WeekParity::from_db_str(&parity_raw)
            .ok_or_else(|| bad_enum(3, "parité de semaine", &parity_raw))?;
        let from_raw: Option<String> = row.get(5)?;
        let until_raw: Option<String> = row.get(6)?;

        Ok(TrameModele {
            trame_id: row.get(0)?,
            site_id: row.get(1)?,
            name: row.get(2)?,
            week_parity,
            is_active: row.get::<_, i32>(4)? != 0,
            effective_from: from_raw.as_deref().map(|s| parse_date(5, s)).transpose()?,
            effective_until: until_raw.as_deref().map(|s| parse_date(6, s)).transpose()?,
        })
    }

    fn map_affectation_row(row: &rusqlite::Row) -> rusqlite::Result<TrameAffectation> {
        let day_raw: String = row.get(2)?;
        let day_of_week = WeekDay::from_db_str(&day_raw)
            .ok_or_else(|| bad_enum(2, "jour de semaine", &day_raw))?;
        let parity_raw: String = row.get(3)?;
        let week_parity = WeekParity::from_db_str(&parity_raw)
            .ok_or_else(|| bad_enum(3, "parité de semaine", &parity_raw))?;
        let period_raw: String = row.get(4)?;
        let period =
            Period::from_db_str(&period_raw).ok_or_else(|| bad_enum(4, "période", &period_raw))?;
        let role_raw: Option<String> = row.get(8)?;
        let staff_role = role_raw
            .as_deref()
            .map(|s| StaffRole::from_db_str(s).ok_or_else(|| bad_enum(8, "rôle", s)))
            .transpose()?;

        Ok(TrameAffectation {
            affectation_id: row.get(0)?,
            trame_id: row.get(1)?,
            day_of_week,
            week_parity,
            period,
            room_id: row.get(5)?,
            surgeon_id: row.get(6)?,
            staff_id: row.get(7)?,
            staff_role,
            is_primary_anesthetist: row.get::<_, i32>(9)? != 0,
            expected_specialty: row.get(10)?,
            is_active: row.get::<_, i32>(11)? != 0,
        })
    }
}
