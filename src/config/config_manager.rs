// ==========================================
// Planification bloc opératoire - Gestionnaire de configuration
// ==========================================
// Rôle: lecture et surcharge des réglages du bloc.
// Stockage: table config_kv (clé-valeur + portée)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::snapshot::SupervisionLimits;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// Clés de configuration connues.
pub mod config_keys {
    /// Nombre maximal de salles en anesthésiste principal par MAR.
    pub const MAX_PRIMARY: &str = "supervision/max_primary";
    /// Budget global de salles supervisées par MAR.
    pub const MAX_GLOBAL_SUPERVISION: &str = "supervision/max_global";
    /// Budget de salles d'endoscopie supervisées par MAR.
    pub const MAX_ENDO_SUPERVISION: &str = "supervision/max_endo";
    /// Budget de salles d'ophtalmologie supervisées par MAR.
    pub const MAX_OPHTALMO_SUPERVISION: &str = "supervision/max_ophtalmo";
    /// Langue des messages (fr / en).
    pub const LOCALE: &str = "i18n/locale";
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Ouvre un gestionnaire sur un fichier de base.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Construit un gestionnaire sur une connexion partagée.
    ///
    /// Les PRAGMA unifiés sont réappliqués (opération idempotente).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("verrou de connexion indisponible: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Lit une valeur de configuration (portée globale).
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("verrou de connexion indisponible: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Écrit une valeur de configuration (portée globale).
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("verrou de connexion indisponible: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// Bornes de supervision MAR en vigueur.
    ///
    /// Les clés absentes ou illisibles retombent sur les valeurs par
    /// défaut du bloc.
    pub fn supervision_limits(&self) -> SupervisionLimits {
        let defaults = SupervisionLimits::default();

        SupervisionLimits {
            max_primary: self.read_u32(config_keys::MAX_PRIMARY, defaults.max_primary),
            max_global_supervision: self.read_u32(
                config_keys::MAX_GLOBAL_SUPERVISION,
                defaults.max_global_supervision,
            ),
            max_endo_supervision: self.read_u32(
                config_keys::MAX_ENDO_SUPERVISION,
                defaults.max_endo_supervision,
            ),
            max_ophtalmo_supervision: self.read_u32(
                config_keys::MAX_OPHTALMO_SUPERVISION,
                defaults.max_ophtalmo_supervision,
            ),
        }
    }

    fn read_u32(&self, key: &str, default: u32) -> u32 {
        match self.get_global_config_value(key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn manager_in_memory() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let manager = manager_in_memory();
        let limits = manager.supervision_limits();
        assert_eq!(limits, SupervisionLimits::default());
    }

    #[test]
    fn test_override_roundtrip() {
        let manager = manager_in_memory();
        manager
            .set_global_config_value(config_keys::MAX_GLOBAL_SUPERVISION, "4")
            .unwrap();

        let limits = manager.supervision_limits();
        assert_eq!(limits.max_global_supervision, 4);
        assert_eq!(limits.max_primary, 1);
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        let manager = manager_in_memory();
        manager
            .set_global_config_value(config_keys::MAX_ENDO_SUPERVISION, "beaucoup")
            .unwrap();

        let limits = manager.supervision_limits();
        assert_eq!(limits.max_endo_supervision, 2);
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let manager = manager_in_memory();
        manager
            .set_global_config_value(config_keys::MAX_PRIMARY, "2")
            .unwrap();
        manager
            .set_global_config_value(config_keys::MAX_PRIMARY, "3")
            .unwrap();

        assert_eq!(
            manager
                .get_global_config_value(config_keys::MAX_PRIMARY)
                .unwrap(),
            Some("3".to_string())
        );
    }
}
