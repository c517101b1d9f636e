// ==========================================
// Règle double affectation - même personne, plusieurs salles
// ==========================================
// Regroupement par (demi-journée, personne); une personne présente dans
// au moins deux salles sur la même demi-journée est en double affectation.
// La supervision multi-salles d'un MAR non principal relève de la règle
// de charge de supervision, pas de la double affectation: seuls comptent
// les postes IADE et les postes MAR en anesthésiste principal.
// Sévérité: WARNING si l'une des salles impliquées est non opératoire
// (consultation, garde, astreinte), ERROR sinon.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::{PlanningSnapshot, RoomAssignmentView};
use crate::domain::types::{ConflictSeverity, ConflictType, HalfDay, StaffRole};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;
use std::collections::BTreeMap;

pub struct DoubleBookingRule;

impl DoubleBookingRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DoubleBookingRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for DoubleBookingRule {
    fn code(&self) -> &'static str {
        "double_affectation"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for half_day in [HalfDay::Morning, HalfDay::Afternoon] {
            // (staff_id) -> salles occupées sur la demi-journée
            let mut by_person: BTreeMap<&str, Vec<&RoomAssignmentView>> = BTreeMap::new();

            for view in &snapshot.rooms {
                if !view.assignment.period.half_days().contains(&half_day) {
                    continue;
                }
                for staff in &view.staff {
                    // Poste de supervision MAR: hors périmètre ici.
                    if staff.assignment.role == StaffRole::Mar
                        && !staff.assignment.is_primary_anesthetist
                    {
                        continue;
                    }
                    let rooms = by_person.entry(staff.assignment.staff_id.as_str()).or_default();
                    // Une même personne ne compte qu'une fois par salle.
                    if !rooms
                        .iter()
                        .any(|v| v.assignment.assignment_id == view.assignment.assignment_id)
                    {
                        rooms.push(view);
                    }
                }
            }

            for (staff_id, rooms) in by_person {
                if rooms.len() < 2 {
                    continue;
                }

                let softened = rooms
                    .iter()
                    .any(|v| v.room.as_ref().map(|r| r.is_non_operating()).unwrap_or(false));
                let severity = if softened {
                    ConflictSeverity::Warning
                } else {
                    ConflictSeverity::Error
                };

                let person_name = rooms
                    .iter()
                    .flat_map(|v| v.staff.iter())
                    .find(|s| s.assignment.staff_id == staff_id)
                    .map(|s| s.display_name())
                    .unwrap_or_else(|| staff_id.to_string());
                let count = rooms.len().to_string();
                let period = half_day.to_string();

                for view in rooms {
                    out.push(ConflictDraft {
                        kind: ConflictType::DoubleAffectationPersonnel,
                        severity,
                        message: t_with_args(
                            "conflicts.double_affectation",
                            &[
                                ("person", &person_name),
                                ("count", &count),
                                ("period", &period),
                            ],
                        ),
                        assignment_id: Some(view.assignment.assignment_id.clone()),
                        staff_assignment_id: None,
                        staff_id: Some(staff_id.to_string()),
                        surgeon_id: None,
                    });
                }
            }
        }

        out
    }
}
