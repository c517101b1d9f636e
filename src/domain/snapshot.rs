// ==========================================
// Planification bloc opératoire - Instantané de validation
// ==========================================
// Vue immuable et entièrement résolue d'un planning journalier, construite
// une seule fois avant l'évaluation des règles. Les relations absentes
// sont des Option explicites, vérifiées à l'entrée de chaque règle au lieu
// d'être re-testées en cascade dans les corps de règles.
// ==========================================

use crate::domain::personnel::{Incompatibility, PersonRef, StaffMember, Surgeon};
use crate::domain::planning::{RoomAssignment, StaffAssignment};
use crate::domain::sites::{OperatingRoom, Sector};
use crate::domain::types::{PlanStatus, StaffRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// SupervisionLimits - Bornes de supervision MAR
// ==========================================
// Valeurs par défaut du bloc; surchargées par la configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionLimits {
    pub max_primary: u32,             // Salles en anesthésiste principal
    pub max_global_supervision: u32,  // Salles supervisées toutes catégories
    pub max_endo_supervision: u32,    // Salles supervisées en endoscopie
    pub max_ophtalmo_supervision: u32,// Salles supervisées en ophtalmologie
}

impl Default for SupervisionLimits {
    fn default() -> Self {
        Self {
            max_primary: 1,
            max_global_supervision: 3,
            max_endo_supervision: 2,
            max_ophtalmo_supervision: 3,
        }
    }
}

// ==========================================
// StaffAssignmentView - Affectation de personnel résolue
// ==========================================
#[derive(Debug, Clone)]
pub struct StaffAssignmentView {
    pub assignment: StaffAssignment,
    /// Membre résolu; None si la fiche a disparu (la règle saute le cas).
    pub member: Option<StaffMember>,
}

impl StaffAssignmentView {
    pub fn person(&self) -> PersonRef {
        PersonRef::Staff(self.assignment.staff_id.clone())
    }

    pub fn display_name(&self) -> String {
        match &self.member {
            Some(m) => m.full_name(),
            None => self.assignment.staff_id.clone(),
        }
    }
}

// ==========================================
// RoomAssignmentView - Occupation de salle résolue
// ==========================================
#[derive(Debug, Clone)]
pub struct RoomAssignmentView {
    pub assignment: RoomAssignment,
    /// Salle résolue; None si la salle a disparu.
    pub room: Option<OperatingRoom>,
    /// Secteur résolu; None si la salle est hors secteur.
    pub sector: Option<Sector>,
    /// Chirurgien résolu; None si aucun chirurgien n'est prévu.
    pub surgeon: Option<Surgeon>,
    pub staff: Vec<StaffAssignmentView>,
}

impl RoomAssignmentView {
    /// Nom affichable de la salle (repli sur l'ID).
    pub fn room_label(&self) -> String {
        match &self.room {
            Some(r) => r.name.clone(),
            None => self.assignment.room_id.clone(),
        }
    }

    /// Affectations MAR de la salle.
    pub fn mar_staff(&self) -> impl Iterator<Item = &StaffAssignmentView> {
        self.staff
            .iter()
            .filter(|s| s.assignment.role == StaffRole::Mar)
    }

    /// Affectations IADE de la salle.
    pub fn iade_staff(&self) -> impl Iterator<Item = &StaffAssignmentView> {
        self.staff
            .iter()
            .filter(|s| s.assignment.role == StaffRole::Iade)
    }

    pub fn has_mar(&self) -> bool {
        self.mar_staff().next().is_some()
    }

    pub fn iade_count(&self) -> usize {
        self.iade_staff().count()
    }

    /// Toutes les personnes présentes dans la salle (chirurgien compris).
    pub fn persons(&self) -> Vec<PersonRef> {
        let mut out: Vec<PersonRef> = self.staff.iter().map(|s| s.person()).collect();
        if let Some(surgeon_id) = &self.assignment.surgeon_id {
            out.push(PersonRef::Surgeon(surgeon_id.clone()));
        }
        out
    }

    /// Les deux occupations sont-elles actives en même temps ?
    pub fn concurrent_with(&self, other: &RoomAssignmentView) -> bool {
        self.assignment.period.overlaps(other.assignment.period)
    }
}

// ==========================================
// PlanningSnapshot - Instantané complet d'un planning
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub plan_id: String,
    pub site_id: String,
    pub date: NaiveDate,
    pub status: PlanStatus,
    pub rooms: Vec<RoomAssignmentView>,
    /// Personnes sous absence approuvée couvrant la date.
    pub absent_persons: HashSet<PersonRef>,
    /// Incompatibilités en vigueur à la date.
    pub incompatibilities: Vec<Incompatibility>,
    /// Bornes de supervision en vigueur.
    pub limits: SupervisionLimits,
}

impl PlanningSnapshot {
    pub fn is_absent(&self, person: &PersonRef) -> bool {
        self.absent_persons.contains(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Period;
    use chrono::NaiveDate;

    fn room_view(period: Period) -> RoomAssignmentView {
        RoomAssignmentView {
            assignment: RoomAssignment {
                assignment_id: "ra1".into(),
                plan_id: "p1".into(),
                room_id: "r1".into(),
                period,
                surgeon_id: Some("c1".into()),
                expected_specialty: None,
                source_affectation_id: None,
                created_at: NaiveDate::from_ymd_opt(2025, 3, 10)
                    .unwrap()
                    .and_hms_opt(7, 0, 0)
                    .unwrap(),
            },
            room: None,
            sector: None,
            surgeon: None,
            staff: vec![],
        }
    }

    #[test]
    fn test_default_supervision_limits() {
        let limits = SupervisionLimits::default();
        assert_eq!(limits.max_primary, 1);
        assert_eq!(limits.max_global_supervision, 3);
        assert_eq!(limits.max_endo_supervision, 2);
        assert_eq!(limits.max_ophtalmo_supervision, 3);
    }

    #[test]
    fn test_persons_includes_surgeon() {
        let view = room_view(Period::Morning);
        assert_eq!(view.persons(), vec![PersonRef::Surgeon("c1".into())]);
    }

    #[test]
    fn test_concurrency_by_period() {
        let morning = room_view(Period::Morning);
        let afternoon = room_view(Period::Afternoon);
        let all_day = room_view(Period::AllDay);
        assert!(!morning.concurrent_with(&afternoon));
        assert!(morning.concurrent_with(&all_day));
        assert!(afternoon.concurrent_with(&all_day));
    }
}
