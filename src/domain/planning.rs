// ==========================================
// Planification bloc opératoire - Planning journalier
// ==========================================
// Unité de planification: un site, une date. Les conflits sont des
// observations recalculées à chaque passe de validation.
// ==========================================

use crate::domain::types::{ConflictSeverity, ConflictType, Period, PlanStatus, StaffRole};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// DayPlan - Planning journalier
// ==========================================
// Clé d'identité métier: (site_id, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub plan_id: String,           // ID du planning
    pub site_id: String,           // Site
    pub date: NaiveDate,           // Date planifiée
    pub status: PlanStatus,        // Statut du cycle de vie
    pub revision: i32,             // Verrou optimiste sur le statut
    pub created_at: NaiveDateTime, // Création
    pub updated_at: NaiveDateTime, // Dernière mise à jour
}

impl DayPlan {
    pub fn is_draft(&self) -> bool {
        self.status == PlanStatus::Draft
    }
}

// ==========================================
// RoomAssignment - Occupation d'une salle
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAssignment {
    pub assignment_id: String,                   // ID de l'affectation
    pub plan_id: String,                         // Planning parent
    pub room_id: String,                         // Salle occupée
    pub period: Period,                          // Période de vacation
    pub surgeon_id: Option<String>,              // Chirurgien prévu
    pub expected_specialty: Option<String>,      // Spécialité attendue
    pub source_affectation_id: Option<String>,   // Provenance trame
    pub created_at: NaiveDateTime,               // Création
}

// ==========================================
// StaffAssignment - Personnel affecté à une salle
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAssignment {
    pub staff_assignment_id: String, // ID
    pub assignment_id: String,       // Affectation de salle parente
    pub staff_id: String,            // Membre du personnel
    pub role: StaffRole,             // Rôle tenu dans la salle
    pub is_primary_anesthetist: bool,// Anesthésiste principal de la salle
}

// ==========================================
// Conflict - Conflit persisté
// ==========================================
// La résolution forcée implique la résolution simple; un conflit ERROR
// non résolu et non forcé bloque la promotion du planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,                  // ID du conflit
    pub plan_id: String,                      // Planning concerné
    pub assignment_id: Option<String>,        // Affectation de salle visée
    pub staff_assignment_id: Option<String>,  // Affectation de personnel visée
    pub staff_id: Option<String>,             // Membre du personnel visé
    pub surgeon_id: Option<String>,           // Chirurgien visé
    pub kind: ConflictType,                   // Type (liste fermée)
    pub severity: ConflictSeverity,           // Sévérité
    pub message: String,                      // Message lisible
    pub is_resolved: bool,                    // Résolu
    pub resolved_by: Option<String>,          // Résolu par
    pub resolved_at: Option<NaiveDateTime>,   // Résolu le
    pub resolution_notes: Option<String>,     // Notes de résolution
    pub is_force_resolved: bool,              // Résolution forcée
    pub force_resolved_by: Option<String>,    // Forcé par
    pub force_resolved_at: Option<NaiveDateTime>, // Forcé le
    pub created_at: NaiveDateTime,            // Première observation
}

impl Conflict {
    /// Un conflit bloque la promotion tant qu'il est ERROR, non résolu
    /// et non forcé.
    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Error && !self.is_resolved && !self.is_force_resolved
    }

    /// Clé d'identité pour le rapprochement entre deux passes de
    /// validation: type + cibles, indépendante de l'ID de ligne.
    pub fn identity_key(&self) -> ConflictKey {
        ConflictKey {
            kind: self.kind,
            assignment_id: self.assignment_id.clone(),
            staff_assignment_id: self.staff_assignment_id.clone(),
            staff_id: self.staff_id.clone(),
            surgeon_id: self.surgeon_id.clone(),
        }
    }
}

// ==========================================
// ConflictDraft - Conflit émis par une règle
// ==========================================
// Sortie pure des évaluateurs de règles; la persistance (ID, horodatage,
// rapprochement) appartient à la couche supérieure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictDraft {
    pub kind: ConflictType,
    pub severity: ConflictSeverity,
    pub message: String,
    pub assignment_id: Option<String>,
    pub staff_assignment_id: Option<String>,
    pub staff_id: Option<String>,
    pub surgeon_id: Option<String>,
}

impl ConflictDraft {
    pub fn identity_key(&self) -> ConflictKey {
        ConflictKey {
            kind: self.kind,
            assignment_id: self.assignment_id.clone(),
            staff_assignment_id: self.staff_assignment_id.clone(),
            staff_id: self.staff_id.clone(),
            surgeon_id: self.surgeon_id.clone(),
        }
    }
}

/// Clé de rapprochement d'un conflit entre deux passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConflictKey {
    pub kind: ConflictType,
    pub assignment_id: Option<String>,
    pub staff_assignment_id: Option<String>,
    pub staff_id: Option<String>,
    pub surgeon_id: Option<String>,
}

// ==========================================
// ValidationOutcome - Résultat d'une passe de validation
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Aucun conflit ERROR non résolu / non forcé.
    pub is_valid: bool,
    /// Ensemble complet des conflits du planning après la passe.
    pub conflicts: Vec<Conflict>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn conflict(severity: ConflictSeverity) -> Conflict {
        Conflict {
            conflict_id: "c1".into(),
            plan_id: "p1".into(),
            assignment_id: Some("ra1".into()),
            staff_assignment_id: None,
            staff_id: Some("s1".into()),
            surgeon_id: None,
            kind: ConflictType::PersonnelAbsent,
            severity,
            message: "test".into(),
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            is_force_resolved: false,
            force_resolved_by: None,
            force_resolved_at: None,
            created_at: NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_blocking_requires_unresolved_error() {
        let mut c = conflict(ConflictSeverity::Error);
        assert!(c.is_blocking());

        c.is_resolved = true;
        assert!(!c.is_blocking());

        let mut c = conflict(ConflictSeverity::Error);
        c.is_force_resolved = true;
        assert!(!c.is_blocking());

        let c = conflict(ConflictSeverity::Warning);
        assert!(!c.is_blocking());
    }

    #[test]
    fn test_identity_key_ignores_row_identity() {
        let a = conflict(ConflictSeverity::Error);
        let mut b = conflict(ConflictSeverity::Error);
        b.conflict_id = "autre".into();
        b.message = "autre message".into();
        assert_eq!(a.identity_key(), b.identity_key());

        b.staff_id = Some("s2".into());
        assert_ne!(a.identity_key(), b.identity_key());
    }
}
