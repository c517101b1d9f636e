// ==========================================
// Planification bloc opératoire - Repositories personnel
// ==========================================
// Personnel d'anesthésie, chirurgiens, absences, incompatibilités.
// ==========================================

use crate::domain::personnel::{Absence, Incompatibility, PersonRef, StaffMember, Surgeon};
use crate::domain::types::{AbsenceStatus, IncompatibilityLevel, StaffRole};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_date, DATE_FMT};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// StaffMemberRepository
// ==========================================
pub struct StaffMemberRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffMemberRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, member: &StaffMember) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO staff_member (
                staff_id, first_name, last_name, role,
                can_supervise_ophtalmo, can_supervise_endo, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &member.staff_id,
                &member.first_name,
                &member.last_name,
                member.role.to_db_str(),
                member.can_supervise_ophtalmo as i32,
                member.can_supervise_endo as i32,
                member.is_active as i32,
            ],
        )?;

        Ok(member.staff_id.clone())
    }

    pub fn find_by_id(&self, staff_id: &str) -> RepositoryResult<Option<StaffMember>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT staff_id, first_name, last_name, role,
                      can_supervise_ophtalmo, can_supervise_endo, is_active
               FROM staff_member WHERE staff_id = ?"#,
            params![staff_id],
            Self::map_row,
        ) {
            Ok(member) => Ok(Some(member)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_active(&self) -> RepositoryResult<Vec<StaffMember>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT staff_id, first_name, last_name, role,
                      can_supervise_ophtalmo, can_supervise_endo, is_active
               FROM staff_member WHERE is_active = 1 ORDER BY last_name, first_name"#,
        )?;

        let members = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<StaffMember>, _>>()?;

        Ok(members)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<StaffMember> {
        let role_raw: String = row.get(3)?;
        let role =
            StaffRole::from_db_str(&role_raw).ok_or_else(|| bad_enum(3, "rôle", &role_raw))?;

        Ok(StaffMember {
            staff_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            role,
            can_supervise_ophtalmo: row.get::<_, i32>(4)? != 0,
            can_supervise_endo: row.get::<_, i32>(5)? != 0,
            is_active: row.get::<_, i32>(6)? != 0,
        })
    }
}

// ==========================================
// SurgeonRepository
// ==========================================
pub struct SurgeonRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SurgeonRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, surgeon: &Surgeon) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO surgeon (surgeon_id, first_name, last_name, specialty, is_active)
               VALUES (?, ?, ?, ?, ?)"#,
            params![
                &surgeon.surgeon_id,
                &surgeon.first_name,
                &surgeon.last_name,
                &surgeon.specialty,
                surgeon.is_active as i32,
            ],
        )?;

        Ok(surgeon.surgeon_id.clone())
    }

    pub fn find_by_id(&self, surgeon_id: &str) -> RepositoryResult<Option<Surgeon>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT surgeon_id, first_name, last_name, specialty, is_active
               FROM surgeon WHERE surgeon_id = ?"#,
            params![surgeon_id],
            |row| {
                Ok(Surgeon {
                    surgeon_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    specialty: row.get(3)?,
                    is_active: row.get::<_, i32>(4)? != 0,
                })
            },
        ) {
            Ok(surgeon) => Ok(Some(surgeon)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ==========================================
// AbsenceRepository
// ==========================================
pub struct AbsenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AbsenceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, absence: &Absence) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO absence (
                absence_id, person_kind, person_id, start_date, end_date, status, reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &absence.absence_id,
                absence.person.kind_db_str(),
                absence.person.id(),
                absence.start_date.format(DATE_FMT).to_string(),
                absence.end_date.format(DATE_FMT).to_string(),
                absence.status.to_db_str(),
                &absence.reason,
            ],
        )?;

        Ok(absence.absence_id.clone())
    }

    /// Absences approuvées couvrant la date (bornes incluses).
    pub fn list_binding_on(&self, date: NaiveDate) -> RepositoryResult<Vec<Absence>> {
        let date_str = date.format(DATE_FMT).to_string();
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT absence_id, person_kind, person_id, start_date, end_date, status, reason
               FROM absence
               WHERE status = 'APPROVED' AND start_date <= ? AND end_date >= ?"#,
        )?;

        let absences = stmt
            .query_map(params![&date_str, &date_str], Self::map_row)?
            .collect::<Result<Vec<Absence>, _>>()?;

        Ok(absences)
    }

    /// Absences approuvées chevauchant la plage [start, end].
    pub fn list_approved_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Absence>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT absence_id, person_kind, person_id, start_date, end_date, status, reason
               FROM absence
               WHERE status = 'APPROVED' AND start_date <= ? AND end_date >= ?"#,
        )?;

        let absences = stmt
            .query_map(
                params![
                    end.format(DATE_FMT).to_string(),
                    start.format(DATE_FMT).to_string()
                ],
                Self::map_row,
            )?
            .collect::<Result<Vec<Absence>, _>>()?;

        Ok(absences)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Absence> {
        let kind_raw: String = row.get(1)?;
        let person_id: String = row.get(2)?;
        let person = PersonRef::from_parts(&kind_raw, person_id)
            .ok_or_else(|| bad_enum(1, "type de personne", &kind_raw))?;
        let start_raw: String = row.get(3)?;
        let end_raw: String = row.get(4)?;
        let status_raw: String = row.get(5)?;
        let status = AbsenceStatus::from_db_str(&status_raw)
            .ok_or_else(|| bad_enum(5, "statut d'absence", &status_raw))?;

        Ok(Absence {
            absence_id: row.get(0)?,
            person,
            start_date: parse_date(3, &start_raw)?,
            end_date: parse_date(4, &end_raw)?,
            status,
            reason: row.get(6)?,
        })
    }
}

// ==========================================
// IncompatibilityRepository
// ==========================================
pub struct IncompatibilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IncompatibilityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn create(&self, incompatibility: &Incompatibility) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO incompatibility (
                incompatibility_id, person_a_kind, person_a_id,
                person_b_kind, person_b_id, level, valid_from, valid_until
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &incompatibility.incompatibility_id,
                incompatibility.person_a.kind_db_str(),
                incompatibility.person_a.id(),
                incompatibility.person_b.kind_db_str(),
                incompatibility.person_b.id(),
                incompatibility.level.to_db_str(),
                incompatibility
                    .valid_from
                    .map(|d| d.format(DATE_FMT).to_string()),
                incompatibility
                    .valid_until
                    .map(|d| d.format(DATE_FMT).to_string()),
            ],
        )?;

        Ok(incompatibility.incompatibility_id.clone())
    }

    /// Incompatibilités en vigueur à la date (fenêtre de validité incluse
    /// ou absente).
    pub fn list_valid_on(&self, date: NaiveDate) -> RepositoryResult<Vec<Incompatibility>> {
        let date_str = date.format(DATE_FMT).to_string();
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT incompatibility_id, person_a_kind, person_a_id,
                      person_b_kind, person_b_id, level, valid_from, valid_until
               FROM incompatibility
               WHERE (valid_from IS NULL OR valid_from <= ?)
                 AND (valid_until IS NULL OR valid_until >= ?)"#,
        )?;

        let incompatibilities = stmt
            .query_map(params![&date_str, &date_str], Self::map_row)?
            .collect::<Result<Vec<Incompatibility>, _>>()?;

        Ok(incompatibilities)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Incompatibility> {
        let a_kind: String = row.get(1)?;
        let a_id: String = row.get(2)?;
        let b_kind: String = row.get(3)?;
        let b_id: String = row.get(4)?;
        let level_raw: String = row.get(5)?;

        let person_a = PersonRef::from_parts(&a_kind, a_id)
            .ok_or_else(|| bad_enum(1, "type de personne", &a_kind))?;
        let person_b = PersonRef::from_parts(&b_kind, b_id)
            .ok_or_else(|| bad_enum(3, "type de personne", &b_kind))?;
        let level = IncompatibilityLevel::from_db_str(&level_raw)
            .ok_or_else(|| bad_enum(5, "niveau d'incompatibilité", &level_raw))?;

        let valid_from: Option<String> = row.get(6)?;
        let valid_until: Option<String> = row.get(7)?;

        Ok(Incompatibility {
            incompatibility_id: row.get(0)?,
            person_a,
            person_b,
            level,
            valid_from: valid_from.as_deref().map(|s| parse_date(6, s)).transpose()?,
            valid_until: valid_until
                .as_deref()
                .map(|s| parse_date(7, s))
                .transpose()?,
        })
    }
}
