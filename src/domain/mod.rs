// ==========================================
// Planification bloc opératoire - Couche domaine
// ==========================================
// Rôle: entités, types fermés et objets-valeurs du planning.
// Ligne rouge: aucun accès aux données, aucune logique de moteur.
// ==========================================

pub mod action_log;
pub mod personnel;
pub mod planning;
pub mod sites;
pub mod snapshot;
pub mod trame;
pub mod types;

// Réexport des types centraux
pub use action_log::{ActionKind, ActionLog};
pub use personnel::{Absence, Incompatibility, PersonRef, StaffMember, Surgeon};
pub use planning::{
    Conflict, ConflictDraft, ConflictKey, DayPlan, RoomAssignment, StaffAssignment,
    ValidationOutcome,
};
pub use sites::{OperatingRoom, Sector, SectorRules, Site};
pub use snapshot::{
    PlanningSnapshot, RoomAssignmentView, StaffAssignmentView, SupervisionLimits,
};
pub use trame::{TrameAffectation, TrameModele, TrameWithAffectations};
pub use types::{
    AbsenceStatus, ActorRole, ConflictSeverity, ConflictType, HalfDay, IncompatibilityLevel,
    Period, PlanStatus, RoomKind, SectorCategory, StaffRole, WeekDay, WeekParity,
};
