// ==========================================
// Planification bloc opératoire - Bibliothèque centrale
// ==========================================
// Moteur de validation des conflits de planning, générateur d'expansion
// de trames et machine à états des statuts, sur stockage SQLite.
// Positionnement: aide à la décision (contrôle final humain).
// ==========================================

// Initialisation de l'internationalisation
rust_i18n::i18n!("locales", fallback = "fr");

// ==========================================
// Déclaration des modules
// ==========================================

// Couche domaine - entités et types
pub mod domain;

// Couche repository - accès aux données
pub mod repository;

// Couche moteur - règles métier
pub mod engine;

// Couche API - opérations métier
pub mod api;

// Couche application - racine de composition
pub mod app;

// Couche configuration
pub mod config;

// Infrastructure base de données (connexions / PRAGMA / schéma)
pub mod db;

// Horloge injectable
pub mod clock;

// Journalisation
pub mod logging;

// Internationalisation
pub mod i18n;

// ==========================================
// Réexport des types centraux
// ==========================================

// Types de domaine
pub use domain::types::{
    AbsenceStatus, ActorRole, ConflictSeverity, ConflictType, HalfDay, IncompatibilityLevel,
    Period, PlanStatus, RoomKind, SectorCategory, StaffRole, WeekDay, WeekParity,
};

// Entités de domaine
pub use domain::{
    Absence, ActionLog, Conflict, ConflictDraft, DayPlan, Incompatibility, OperatingRoom,
    PersonRef, PlanningSnapshot, RoomAssignment, Sector, SectorRules, Site, StaffAssignment,
    StaffMember, SupervisionLimits, Surgeon, TrameAffectation, TrameModele,
    TrameWithAffectations, ValidationOutcome,
};

// Moteurs
pub use engine::{
    AuthorizationPort, RoleMatrix, StatusWorkflow, TrameExpansionEngine, ValidationEngine,
};

// APIs
pub use api::{Actor, ApiError, ApiResult, GenerationApi, PlanningApi, ValidationApi};

// ==========================================
// Constantes système
// ==========================================

// Version du système
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Nom du système
pub const APP_NAME: &str = "Planification bloc opératoire";
