// ==========================================
// Planification bloc opératoire - État applicatif
// ==========================================
// Rôle: construire et partager les instances d'API sur une connexion
// SQLite commune.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{GenerationApi, PlanningApi, ValidationApi};
use crate::clock::{Clock, SystemClock};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::{RoleMatrix, TrameExpansionEngine, ValidationEngine};
use crate::engine::workflow::AuthorizationPort;
use crate::repository::{
    AbsenceRepository, ActionLogRepository, ConflictRepository, DayPlanRepository,
    IncompatibilityRepository, OperatingRoomRepository, RoomAssignmentRepository,
    SectorRepository, SiteRepository, StaffMemberRepository, SurgeonRepository, TrameRepository,
};

/// État applicatif
///
/// Contient les APIs et les repositories de référence partagés.
pub struct AppState {
    /// Chemin du fichier de base
    pub db_path: String,

    /// API de validation
    pub validation_api: Arc<ValidationApi>,

    /// API du cycle de vie des plannings
    pub planning_api: Arc<PlanningApi>,

    /// API de génération depuis les trames
    pub generation_api: Arc<GenerationApi>,

    /// Repositories de référence (administration des données)
    pub site_repo: Arc<SiteRepository>,
    pub sector_repo: Arc<SectorRepository>,
    pub room_repo: Arc<OperatingRoomRepository>,
    pub staff_repo: Arc<StaffMemberRepository>,
    pub surgeon_repo: Arc<SurgeonRepository>,
    pub absence_repo: Arc<AbsenceRepository>,
    pub incompatibility_repo: Arc<IncompatibilityRepository>,
    pub trame_repo: Arc<TrameRepository>,
    pub day_plan_repo: Arc<DayPlanRepository>,
    pub conflict_repo: Arc<ConflictRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// Construit l'état applicatif avec l'horloge système et la matrice
    /// de rôles par défaut.
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_components(db_path, Arc::new(SystemClock), Arc::new(RoleMatrix::new()))
    }

    /// Construit l'état applicatif avec une horloge et un port
    /// d'autorisation fournis (tests, intégrations).
    pub fn with_components(
        db_path: String,
        clock: Arc<dyn Clock>,
        authorization: Arc<dyn AuthorizationPort>,
    ) -> Result<Self, String> {
        tracing::info!("initialisation de l'état applicatif, base: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("ouverture de la base impossible: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("création du schéma impossible: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repositories
        // ==========================================
        let site_repo = Arc::new(SiteRepository::new(conn.clone()));
        let sector_repo = Arc::new(SectorRepository::new(conn.clone()));
        let room_repo = Arc::new(OperatingRoomRepository::new(conn.clone()));
        let staff_repo = Arc::new(StaffMemberRepository::new(conn.clone()));
        let surgeon_repo = Arc::new(SurgeonRepository::new(conn.clone()));
        let absence_repo = Arc::new(AbsenceRepository::new(conn.clone()));
        let incompatibility_repo = Arc::new(IncompatibilityRepository::new(conn.clone()));
        let trame_repo = Arc::new(TrameRepository::new(conn.clone()));
        let day_plan_repo = Arc::new(DayPlanRepository::new(conn.clone()));
        let assignment_repo = Arc::new(RoomAssignmentRepository::new(conn.clone()));
        let conflict_repo = Arc::new(ConflictRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // ==========================================
        // Configuration et moteurs
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("gestionnaire de configuration: {}", e))?,
        );
        let validation_engine = Arc::new(ValidationEngine::new());
        let expansion_engine = Arc::new(TrameExpansionEngine::new());

        // ==========================================
        // APIs
        // ==========================================
        let validation_api = Arc::new(ValidationApi::new(
            day_plan_repo.clone(),
            assignment_repo.clone(),
            conflict_repo.clone(),
            room_repo.clone(),
            sector_repo.clone(),
            staff_repo.clone(),
            surgeon_repo.clone(),
            absence_repo.clone(),
            incompatibility_repo.clone(),
            action_log_repo.clone(),
            config_manager,
            validation_engine,
            clock.clone(),
        ));

        let planning_api = Arc::new(PlanningApi::new(
            day_plan_repo.clone(),
            assignment_repo.clone(),
            conflict_repo.clone(),
            staff_repo.clone(),
            action_log_repo.clone(),
            validation_api.clone(),
            authorization,
            clock.clone(),
        ));

        let generation_api = Arc::new(GenerationApi::new(
            day_plan_repo.clone(),
            assignment_repo,
            conflict_repo.clone(),
            trame_repo.clone(),
            absence_repo.clone(),
            action_log_repo.clone(),
            validation_api.clone(),
            expansion_engine,
            clock,
        ));

        tracing::info!("état applicatif initialisé");

        Ok(Self {
            db_path,
            validation_api,
            planning_api,
            generation_api,
            site_repo,
            sector_repo,
            room_repo,
            staff_repo,
            surgeon_repo,
            absence_repo,
            incompatibility_repo,
            trame_repo,
            day_plan_repo,
            conflict_repo,
            action_log_repo,
        })
    }
}

/// Chemin de base par défaut.
///
/// Priorité: variable d'environnement BLOC_PLANNING_DB_PATH, puis le
/// répertoire de données utilisateur, puis le répertoire courant.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("BLOC_PLANNING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./bloc_planning.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("bloc-planning");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("bloc_planning.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // AppState::new() exige un fichier de base réel; voir les tests
    // d'intégration.
}
