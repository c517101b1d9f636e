// ==========================================
// Planification bloc opératoire - Journal des opérations
// ==========================================
// Toute opération mutante de l'API est tracée: génération, changement de
// statut, mutation d'affectation, résolution de conflit.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - Entrée du journal
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // ID de l'entrée
    pub plan_id: Option<String>,         // Planning concerné (si applicable)
    pub action: ActionKind,              // Type d'opération
    pub actor: String,                   // Acteur à l'origine
    pub detail: Option<String>,          // Description courte
    pub payload_json: Option<JsonValue>, // Paramètres de l'opération
    pub created_at: NaiveDateTime,       // Horodatage
}

// ==========================================
// ActionKind - Type d'opération
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    GeneratePlans,        // Génération depuis les trames
    ValidatePlan,         // Passe de validation
    ChangeStatus,         // Transition de statut
    UpsertStaffAssignment,// Ajout/mise à jour d'affectation de personnel
    RemoveStaffAssignment,// Retrait d'affectation de personnel
    ResolveConflict,      // Résolution d'un conflit
    ForceResolveConflict, // Résolution forcée d'un conflit ERROR
}

impl ActionKind {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GENERATE_PLANS" => Some(Self::GeneratePlans),
            "VALIDATE_PLAN" => Some(Self::ValidatePlan),
            "CHANGE_STATUS" => Some(Self::ChangeStatus),
            "UPSERT_STAFF_ASSIGNMENT" => Some(Self::UpsertStaffAssignment),
            "REMOVE_STAFF_ASSIGNMENT" => Some(Self::RemoveStaffAssignment),
            "RESOLVE_CONFLICT" => Some(Self::ResolveConflict),
            "FORCE_RESOLVE_CONFLICT" => Some(Self::ForceResolveConflict),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Self::GeneratePlans => "GENERATE_PLANS",
            Self::ValidatePlan => "VALIDATE_PLAN",
            Self::ChangeStatus => "CHANGE_STATUS",
            Self::UpsertStaffAssignment => "UPSERT_STAFF_ASSIGNMENT",
            Self::RemoveStaffAssignment => "REMOVE_STAFF_ASSIGNMENT",
            Self::ResolveConflict => "RESOLVE_CONFLICT",
            Self::ForceResolveConflict => "FORCE_RESOLVE_CONFLICT",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
