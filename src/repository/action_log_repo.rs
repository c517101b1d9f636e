// ==========================================
// ActionLogRepository - Journal des opérations
// ==========================================
// Toute écriture de la couche API est journalisée.
// ==========================================

use crate::domain::action_log::{ActionKind, ActionLog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{bad_enum, parse_datetime, DATETIME_FMT};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn append(&self, entry: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO action_log (
                action_id, plan_id, action_type, actor, detail, payload_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &entry.action_id,
                &entry.plan_id,
                entry.action.to_db_str(),
                &entry.actor,
                &entry.detail,
                entry.payload_json.as_ref().map(|v| v.to_string()),
                entry.created_at.format(DATETIME_FMT).to_string(),
            ],
        )?;

        Ok(entry.action_id.clone())
    }

    pub fn list_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT action_id, plan_id, action_type, actor, detail, payload_json, created_at
               FROM action_log WHERE plan_id = ? ORDER BY created_at"#,
        )?;

        let entries = stmt
            .query_map(params![plan_id], Self::map_row)?
            .collect::<Result<Vec<ActionLog>, _>>()?;

        Ok(entries)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ActionLog> {
        let action_raw: String = row.get(2)?;
        let action = ActionKind::from_db_str(&action_raw)
            .ok_or_else(|| bad_enum(2, "type d'opération", &action_raw))?;
        let payload_raw: Option<String> = row.get(5)?;
        let created_raw: String = row.get(6)?;

        Ok(ActionLog {
            action_id: row.get(0)?,
            plan_id: row.get(1)?,
            action,
            actor: row.get(3)?,
            detail: row.get(4)?,
            payload_json: payload_raw.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: parse_datetime(6, &created_raw)?,
        })
    }
}
