// ==========================================
// Planification bloc opératoire - Bibliothèque de règles
// ==========================================
// Chaque règle est un évaluateur pur: instantané immuable en entrée,
// liste de conflits en sortie. Les règles sont indépendantes, leurs
// sorties sont réunies sans court-circuit, et une relation manquante
// fait sauter la vérification concernée, jamais échouer la passe.
// Ligne rouge: les règles ne touchent ni la base ni aucun état global.
// ==========================================

pub mod absence;
pub mod anesthesia_presence;
pub mod contiguity;
pub mod double_booking;
pub mod incompatibility;
pub mod sector_policy;
pub mod supervision_load;
pub mod surgeon_coverage;

pub use absence::AbsenceRule;
pub use anesthesia_presence::AnesthesiaPresenceRule;
pub use contiguity::ContiguityRule;
pub use double_booking::DoubleBookingRule;
pub use incompatibility::IncompatibilityRule;
pub use sector_policy::SectorPolicyRule;
pub use supervision_load::SupervisionLoadRule;
pub use surgeon_coverage::SurgeonCoverageRule;

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;

/// Évaluateur d'une famille de règles.
pub trait Rule: Send + Sync {
    /// Code court de la famille, pour la journalisation.
    fn code(&self) -> &'static str;

    /// Évalue l'instantané et retourne les conflits constatés.
    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft>;
}
