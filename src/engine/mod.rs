// ==========================================
// Planification bloc opératoire - Couche moteur
// ==========================================
// Rôle: règles métier pures sur des instantanés immuables.
// Ligne rouge: les moteurs ne touchent pas la base; toute sortie de
// règle porte un message explicite.
// ==========================================

pub mod rules;
pub mod trame_expansion;
pub mod validation;
pub mod workflow;

// Réexport des moteurs
pub use rules::{
    AbsenceRule, AnesthesiaPresenceRule, ContiguityRule, DoubleBookingRule, IncompatibilityRule,
    Rule, SectorPolicyRule, SupervisionLoadRule, SurgeonCoverageRule,
};
pub use trame_expansion::{DayExpansion, RoomSlot, StaffSlot, TrameExpansionEngine, TrameOverlap};
pub use validation::ValidationEngine;
pub use workflow::{AuthorizationPort, RoleMatrix, StatusWorkflow, TransitionRule, TRANSITIONS};
