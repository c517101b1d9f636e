// ==========================================
// ConflictRepository - Conflits persistés
// ==========================================
// Le recalcul ne supprime jamais aveuglément les conflits existants:
// le rapprochement par clé (type + cibles) conserve les métadonnées de
// résolution des conflits toujours présents.
// ==========================================

use crate::domain::planning::{Conflict, ConflictDraft};
use crate::domain::types::{ConflictSeverity, ConflictType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_datetime, DATETIME_FMT};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct ConflictRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ConflictRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, conflict_id: &str) -> RepositoryResult<Option<Conflict>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            &format!("{} WHERE conflict_id = ?", SELECT_BASE),
            params![conflict_id],
            Self::map_row,
        ) {
            Ok(conflict) => Ok(Some(conflict)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<Conflict>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare(&format!("{} WHERE plan_id = ? ORDER BY created_at", SELECT_BASE))?;

        let conflicts = stmt
            .query_map(params![plan_id], Self::map_row)?
            .collect::<Result<Vec<Conflict>, _>>()?;

        Ok(conflicts)
    }

    /// Existe-t-il un conflit bloquant (ERROR, non résolu, non forcé) ?
    pub fn has_blocking(&self, plan_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM planning_conflict
               WHERE plan_id = ? AND severity = 'ERROR'
                 AND is_resolved = 0 AND is_force_resolved = 0"#,
            params![plan_id],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Insère un lot de conflits tels quels (génération de trames).
    pub fn insert_drafts(
        &self,
        plan_id: &str,
        drafts: &[ConflictDraft],
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for draft in drafts {
            Self::insert_draft_with(&tx, plan_id, draft, now)?;
        }

        tx.commit()?;
        Ok(drafts.len())
    }

    /// Rapproche le jeu de conflits recalculé avec l'existant, dans une
    /// même transaction:
    /// - un conflit existant dont la clé (type + cibles) se retrouve dans
    ///   le lot recalculé est conservé tel quel (métadonnées de résolution
    ///   comprises);
    /// - un conflit existant sans équivalent recalculé est supprimé, sauf
    ///   les conflits appartenant au générateur (TRAME_OVERLAP_WARNING),
    ///   que les règles ne réémettent pas;
    /// - un conflit recalculé sans équivalent existant est inséré. Les
    ///   doublons de clé au sein du lot sont tolérés et dédoublonnés.
    pub fn reconcile(
        &self,
        plan_id: &str,
        drafts: &[ConflictDraft],
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: Vec<Conflict> = {
            let mut stmt = tx.prepare(&format!("{} WHERE plan_id = ?", SELECT_BASE))?;
            let rows = stmt
                .query_map(params![plan_id], Self::map_row)?
                .collect::<Result<Vec<Conflict>, _>>()?;
            rows
        };

        let draft_keys: HashSet<_> = drafts.iter().map(|d| d.identity_key()).collect();
        let existing_keys: HashSet<_> = existing.iter().map(|c| c.identity_key()).collect();

        // 1. Suppression des conflits périmés
        for stale in existing.iter().filter(|c| {
            c.kind != ConflictType::TrameOverlapWarning && !draft_keys.contains(&c.identity_key())
        }) {
            tx.execute(
                "DELETE FROM planning_conflict WHERE conflict_id = ?",
                params![&stale.conflict_id],
            )?;
        }

        // 2. Insertion des nouveaux conflits (clés inédites uniquement)
        let mut inserted: HashSet<_> = existing_keys;
        for draft in drafts {
            let key = draft.identity_key();
            if inserted.contains(&key) {
                continue;
            }
            Self::insert_draft_with(&tx, plan_id, draft, now)?;
            inserted.insert(key);
        }

        tx.commit()?;
        Ok(())
    }

    pub fn clear_for_plan(&self, plan_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "DELETE FROM planning_conflict WHERE plan_id = ?",
            params![plan_id],
        )?;

        Ok(())
    }

    /// Marque un conflit comme résolu.
    pub fn mark_resolved(
        &self,
        conflict_id: &str,
        actor: &str,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE planning_conflict
               SET is_resolved = 1, resolved_by = ?, resolved_at = ?, resolution_notes = ?
               WHERE conflict_id = ?"#,
            params![
                actor,
                now.format(DATETIME_FMT).to_string(),
                notes,
                conflict_id
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Conflict".to_string(),
                id: conflict_id.to_string(),
            });
        }

        Ok(())
    }

    /// Marque un conflit ERROR comme résolu de force (les deux drapeaux
    /// sont posés).
    pub fn mark_force_resolved(
        &self,
        conflict_id: &str,
        actor: &str,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let now_str = now.format(DATETIME_FMT).to_string();
        let rows = conn.execute(
            r#"UPDATE planning_conflict
               SET is_resolved = 1, resolved_by = ?, resolved_at = ?, resolution_notes = ?,
                   is_force_resolved = 1, force_resolved_by = ?, force_resolved_at = ?
               WHERE conflict_id = ?"#,
            params![actor, &now_str, notes, actor, &now_str, conflict_id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Conflict".to_string(),
                id: conflict_id.to_string(),
            });
        }

        Ok(())
    }

    fn insert_draft_with(
        conn: &Connection,
        plan_id: &str,
        draft: &ConflictDraft,
        now: NaiveDateTime,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO planning_conflict (
                conflict_id, plan_id, assignment_id, staff_assignment_id,
                staff_id, surgeon_id, kind, severity, message,
                is_resolved, is_force_resolved, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?)"#,
            params![
                Uuid::new_v4().to_string(),
                plan_id,
                &draft.assignment_id,
                &draft.staff_assignment_id,
                &draft.staff_id,
                &draft.surgeon_id,
                draft.kind.to_db_str(),
                draft.severity.to_db_str(),
                &draft.message,
                now.format(DATETIME_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Conflict> {
        let kind_raw: String = row.get(6)?;
        let kind = ConflictType::from_db_str(&kind_raw)
            .ok_or_else(|| bad_enum(6, "type de conflit", &kind_raw))?;
        let severity_raw: String = row.get(7)?;
        let severity = ConflictSeverity::from_db_str(&severity_raw)
            .ok_or_else(|| bad_enum(7, "sévérité", &severity_raw))?;

        let resolved_at: Option<String> = row.get(11)?;
        let force_resolved_at: Option<String> = row.get(15)?;
        let created_raw: String = row.get(16)?;

        Ok(Conflict {
            conflict_id: row.get(0)?,
            plan_id: row.get(1)?,
            assignment_id: row.get(2)?,
            staff_assignment_id: row.get(3)?,
            staff_id: row.get(4)?,
            surgeon_id: row.get(5)?,
            kind,
            severity,
            message: row.get(8)?,
            is_resolved: row.get::<_, i32>(9)? != 0,
            resolved_by: row.get(10)?,
            resolved_at: resolved_at
                .as_deref()
                .map(|s| parse_datetime(11, s))
                .transpose()?,
            resolution_notes: row.get(12)?,
            is_force_resolved: row.get::<_, i32>(13)? != 0,
            force_resolved_by: row.get(14)?,
            force_resolved_at: force_resolved_at
                .as_deref()
                .map(|s| parse_datetime(15, s))
                .transpose()?,
            created_at: parse_datetime(16, &created_raw)?,
        })
    }
}

const SELECT_BASE: &str = r#"SELECT conflict_id, plan_id, assignment_id, staff_assignment_id,
       staff_id, surgeon_id, kind, severity, message,
       is_resolved, resolved_by, resolved_at, resolution_notes,
       is_force_resolved, force_resolved_by, force_resolved_at, created_at
FROM planning_conflict"#;
