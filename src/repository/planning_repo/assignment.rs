// ==========================================
// RoomAssignmentRepository - Occupations de salles et personnel
// ==========================================

use crate::domain::planning::{RoomAssignment, StaffAssignment};
use crate::domain::types::{Period, StaffRole};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_datetime, DATETIME_FMT};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct RoomAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomAssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, assignment: &RoomAssignment) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, assignment)?;
        Ok(assignment.assignment_id.clone())
    }

    /// Insertion sur une connexion/transaction déjà détenue.
    pub(crate) fn insert_with(
        conn: &Connection,
        assignment: &RoomAssignment,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO room_assignment (
                assignment_id, plan_id, room_id, period, surgeon_id,
                expected_specialty, source_affectation_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &assignment.assignment_id,
                &assignment.plan_id,
                &assignment.room_id,
                assignment.period.to_db_str(),
                &assignment.surgeon_id,
                &assignment.expected_specialty,
                &assignment.source_affectation_id,
                assignment.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_staff(&self, staff: &StaffAssignment) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_staff_with(&conn, staff)?;
        Ok(staff.staff_assignment_id.clone())
    }

    pub(crate) fn insert_staff_with(
        conn: &Connection,
        staff: &StaffAssignment,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO staff_assignment (
                staff_assignment_id, assignment_id, staff_id, role, is_primary_anesthetist
            ) VALUES (?, ?, ?, ?, ?)"#,
            params![
                &staff.staff_assignment_id,
                &staff.assignment_id,
                &staff.staff_id,
                staff.role.to_db_str(),
                staff.is_primary_anesthetist as i32,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, assignment_id: &str) -> RepositoryResult<Option<RoomAssignment>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT assignment_id, plan_id, room_id, period, surgeon_id,
                      expected_specialty, source_affectation_id, created_at
               FROM room_assignment WHERE assignment_id = ?"#,
            params![assignment_id],
            Self::map_row,
        ) {
            Ok(assignment) => Ok(Some(assignment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<RoomAssignment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT assignment_id, plan_id, room_id, period, surgeon_id,
                      expected_specialty, source_affectation_id, created_at
               FROM room_assignment WHERE plan_id = ? ORDER BY room_id, period"#,
        )?;

        let assignments = stmt
            .query_map(params![plan_id], Self::map_row)?
            .collect::<Result<Vec<RoomAssignment>, _>>()?;

        Ok(assignments)
    }

    pub fn find_staff_by_id(
        &self,
        staff_assignment_id: &str,
    ) -> RepositoryResult<Option<StaffAssignment>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT staff_assignment_id, assignment_id, staff_id, role, is_primary_anesthetist
               FROM staff_assignment WHERE staff_assignment_id = ?"#,
            params![staff_assignment_id],
            Self::map_staff_row,
        ) {
            Ok(staff) => Ok(Some(staff)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Affectation existante d'un membre dans une salle (pour upsert).
    pub fn find_staff_in_assignment(
        &self,
        assignment_id: &str,
        staff_id: &str,
    ) -> RepositoryResult<Option<StaffAssignment>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT staff_assignment_id, assignment_id, staff_id, role, is_primary_anesthetist
               FROM staff_assignment WHERE assignment_id = ? AND staff_id = ?"#,
            params![assignment_id, staff_id],
            Self::map_staff_row,
        ) {
            Ok(staff) => Ok(Some(staff)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_staff_by_assignment(
        &self,
        assignment_id: &str,
    ) -> RepositoryResult<Vec<StaffAssignment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT staff_assignment_id, assignment_id, staff_id, role, is_primary_anesthetist
               FROM staff_assignment WHERE assignment_id = ?"#,
        )?;

        let staff = stmt
            .query_map(params![assignment_id], Self::map_staff_row)?
            .collect::<Result<Vec<StaffAssignment>, _>>()?;

        Ok(staff)
    }

    /// Personnel de toutes les salles d'un planning.
    pub fn list_staff_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<StaffAssignment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT s.staff_assignment_id, s.assignment_id, s.staff_id, s.role,
                      s.is_primary_anesthetist
               FROM staff_assignment s
               JOIN room_assignment r ON r.assignment_id = s.assignment_id
               WHERE r.plan_id = ?"#,
        )?;

        let staff = stmt
            .query_map(params![plan_id], Self::map_staff_row)?
            .collect::<Result<Vec<StaffAssignment>, _>>()?;

        Ok(staff)
    }

    pub fn update_staff(
        &self,
        staff_assignment_id: &str,
        role: StaffRole,
        is_primary_anesthetist: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE staff_assignment SET role = ?, is_primary_anesthetist = ?
               WHERE staff_assignment_id = ?"#,
            params![
                role.to_db_str(),
                is_primary_anesthetist as i32,
                staff_assignment_id
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StaffAssignment".to_string(),
                id: staff_assignment_id.to_string(),
            });
        }

        Ok(())
    }

    pub fn delete_staff(&self, staff_assignment_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            "DELETE FROM staff_assignment WHERE staff_assignment_id = ?",
            params![staff_assignment_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StaffAssignment".to_string(),
                id: staff_assignment_id.to_string(),
            });
        }

        Ok(())
    }

    /// Purge toutes les occupations (salles + personnel) d'un planning,
    /// dans une même transaction. Utilisé avant régénération.
    pub fn clear_for_plan(&self, plan_id: &str) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"DELETE FROM staff_assignment
               WHERE assignment_id IN
                   (SELECT assignment_id FROM room_assignment WHERE plan_id = ?)"#,
            params![plan_id],
        )?;
        tx.execute(
            "DELETE FROM room_assignment WHERE plan_id = ?",
            params![plan_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<RoomAssignment> {
        let period_raw: String = row.get(3)?;
        let period =
            Period::from_db_str(&period_raw).ok_or_else(|| bad_enum(3, "période", &period_raw))?;
        let created_raw: String = row.get(7)?;

        Ok(RoomAssignment {
            assignment_id: row.get(0)?,
            plan_id: row.get(1)?,
            room_id: row.get(2)?,
            period,
            surgeon_id: row.get(4)?,
            expected_specialty: row.get(5)?,
            source_affectation_id: row.get(6)?,
            created_at: parse_datetime(7, &created_raw)?,
        })
    }

    fn map_staff_row(row: &rusqlite::Row) -> rusqlite::Result<StaffAssignment> {
        let role_raw: String = row.get(3)?;
        let role =
            StaffRole::from_db_str(&role_raw).ok_or_else(|| bad_enum(3, "rôle", &role_raw))?;

        Ok(StaffAssignment {
            staff_assignment_id: row.get(0)?,
            assignment_id: row.get(1)?,
            staff_id: row.get(2)?,
            role,
            is_primary_anesthetist: row.get::<_, i32>(4)? != 0,
        })
    }
}
