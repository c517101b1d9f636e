// ==========================================
// Planification bloc opératoire - Initialisation SQLite
// ==========================================
// Objectifs:
// - Unifier le comportement PRAGMA de toutes les connexions (clés
//   étrangères, busy_timeout) au lieu de le laisser à chaque module
// - Créer le schéma de manière idempotente (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// busy_timeout par défaut (millisecondes)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Version de schéma attendue par le code courant.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Applique les PRAGMA unifiés à une connexion SQLite.
///
/// Remarques:
/// - foreign_keys doit être activé sur chaque connexion
/// - busy_timeout doit être configuré sur chaque connexion
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Ouvre une connexion SQLite avec la configuration unifiée.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Lit la version de schéma (None si la table n'existe pas encore).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Crée l'intégralité du schéma de manière idempotente et enregistre la
/// version courante.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS site (
            site_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            timezone TEXT NOT NULL DEFAULT 'Europe/Paris',
            color_code TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS sector (
            sector_id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL REFERENCES site(site_id),
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'STANDARD',
            color_code TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            rules_json TEXT
        );

        CREATE TABLE IF NOT EXISTS operating_room (
            room_id TEXT PRIMARY KEY,
            sector_id TEXT REFERENCES sector(sector_id),
            name TEXT NOT NULL,
            number INTEGER NOT NULL,
            kind TEXT NOT NULL DEFAULT 'STANDARD',
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS staff_member (
            staff_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            can_supervise_ophtalmo INTEGER NOT NULL DEFAULT 0,
            can_supervise_endo INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS surgeon (
            surgeon_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            specialty TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS absence (
            absence_id TEXT PRIMARY KEY,
            person_kind TEXT NOT NULL,
            person_id TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            reason TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_absence_person
            ON absence(person_kind, person_id);
        CREATE INDEX IF NOT EXISTS idx_absence_dates
            ON absence(start_date, end_date);

        CREATE TABLE IF NOT EXISTS incompatibility (
            incompatibility_id TEXT PRIMARY KEY,
            person_a_kind TEXT NOT NULL,
            person_a_id TEXT NOT NULL,
            person_b_kind TEXT NOT NULL,
            person_b_id TEXT NOT NULL,
            level TEXT NOT NULL,
            valid_from TEXT,
            valid_until TEXT
        );

        CREATE TABLE IF NOT EXISTS day_plan (
            plan_id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL REFERENCES site(site_id),
            date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(site_id, date)
        );

        CREATE TABLE IF NOT EXISTS room_assignment (
            assignment_id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL REFERENCES day_plan(plan_id) ON DELETE CASCADE,
            room_id TEXT NOT NULL REFERENCES operating_room(room_id),
            period TEXT NOT NULL,
            surgeon_id TEXT REFERENCES surgeon(surgeon_id),
            expected_specialty TEXT,
            source_affectation_id TEXT,
            created_at TEXT NOT NULL,
            UNIQUE(plan_id, room_id, period)
        );
        CREATE INDEX IF NOT EXISTS idx_room_assignment_plan
            ON room_assignment(plan_id);

        CREATE TABLE IF NOT EXISTS staff_assignment (
            staff_assignment_id TEXT PRIMARY KEY,
            assignment_id TEXT NOT NULL REFERENCES room_assignment(assignment_id) ON DELETE CASCADE,
            staff_id TEXT NOT NULL REFERENCES staff_member(staff_id),
            role TEXT NOT NULL,
            is_primary_anesthetist INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_staff_assignment_parent
            ON staff_assignment(assignment_id);

        CREATE TABLE IF NOT EXISTS planning_conflict (
            conflict_id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL REFERENCES day_plan(plan_id) ON DELETE CASCADE,
            assignment_id TEXT,
            staff_assignment_id TEXT,
            staff_id TEXT,
            surgeon_id TEXT,
            kind TEXT NOT NULL,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            is_resolved INTEGER NOT NULL DEFAULT 0,
            resolved_by TEXT,
            resolved_at TEXT,
            resolution_notes TEXT,
            is_force_resolved INTEGER NOT NULL DEFAULT 0,
            force_resolved_by TEXT,
            force_resolved_at TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_planning_conflict_plan
            ON planning_conflict(plan_id);

        CREATE TABLE IF NOT EXISTS trame_modele (
            trame_id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL REFERENCES site(site_id),
            name TEXT NOT NULL,
            week_parity TEXT NOT NULL DEFAULT 'ALL',
            is_active INTEGER NOT NULL DEFAULT 1,
            effective_from TEXT,
            effective_until TEXT
        );

        CREATE TABLE IF NOT EXISTS trame_affectation (
            affectation_id TEXT PRIMARY KEY,
            trame_id TEXT NOT NULL REFERENCES trame_modele(trame_id) ON DELETE CASCADE,
            day_of_week TEXT NOT NULL,
            week_parity TEXT NOT NULL DEFAULT 'ALL',
            period TEXT NOT NULL,
            room_id TEXT NOT NULL REFERENCES operating_room(room_id),
            surgeon_id TEXT,
            staff_id TEXT,
            staff_role TEXT,
            is_primary_anesthetist INTEGER NOT NULL DEFAULT 0,
            expected_specialty TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        );
        CREATE INDEX IF NOT EXISTS idx_trame_affectation_trame
            ON trame_affectation(trame_id);

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            plan_id TEXT,
            action_type TEXT NOT NULL,
            actor TEXT NOT NULL,
            detail TEXT,
            payload_json TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_action_log_plan
            ON action_log(plan_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
