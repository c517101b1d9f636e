// ==========================================
// Planification bloc opératoire - Couche repository
// ==========================================
// Rôle: accès aux données, requêtes paramétrées uniquement.
// Ligne rouge: aucune logique métier dans les repositories.
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod personnel_repo;
pub mod planning_repo;
pub mod sites_repo;
pub mod trame_repo;

// Réexport des repositories
pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use personnel_repo::{
    AbsenceRepository, IncompatibilityRepository, StaffMemberRepository, SurgeonRepository,
};
pub use planning_repo::{ConflictRepository, DayPlanRepository, RoomAssignmentRepository};
pub use sites_repo::{OperatingRoomRepository, SectorRepository, SiteRepository};
pub use trame_repo::TrameRepository;

use chrono::{NaiveDate, NaiveDateTime};

/// Format de stockage des dates.
pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
/// Format de stockage des horodatages.
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Erreur de conversion pour une variante inconnue lue en base.
pub(crate) fn bad_enum(idx: usize, what: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("{} inconnu: {}", what, raw).into(),
    )
}

/// Décode une date stockée au format DATE_FMT.
pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Décode un horodatage stocké au format DATETIME_FMT.
pub(crate) fn parse_datetime(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
