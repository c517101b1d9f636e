// ==========================================
// Règle présence anesthésie - effectif minimal par salle
// ==========================================
// Une salle avec chirurgien et aucun personnel d'anesthésie (ni MAR ni
// IADE) est en défaut. Un secteur déclarant min_iade_per_room impose en
// plus son effectif IADE minimal à chaque salle occupée.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;
use crate::domain::types::{ConflictSeverity, ConflictType};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;

pub struct AnesthesiaPresenceRule;

impl AnesthesiaPresenceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnesthesiaPresenceRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AnesthesiaPresenceRule {
    fn code(&self) -> &'static str {
        "presence_anesthesie"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for view in &snapshot.rooms {
            // Chirurgien sans aucun personnel d'anesthésie
            if let Some(surgeon_id) = view.assignment.surgeon_id.as_ref() {
                if view.staff.is_empty() {
                    let surgeon_display = view
                        .surgeon
                        .as_ref()
                        .map(|s| s.full_name())
                        .unwrap_or_else(|| surgeon_id.clone());

                    out.push(ConflictDraft {
                        kind: ConflictType::MissingAnesthesiaStaff,
                        severity: ConflictSeverity::Error,
                        message: t_with_args(
                            "conflicts.missing_anesthesia_staff",
                            &[("room", &view.room_label()), ("surgeon", &surgeon_display)],
                        ),
                        assignment_id: Some(view.assignment.assignment_id.clone()),
                        staff_assignment_id: None,
                        staff_id: None,
                        surgeon_id: Some(surgeon_id.clone()),
                    });
                }
            }

            // Effectif IADE minimal du secteur
            let Some(min_iade) = view.sector.as_ref().and_then(|s| s.rules.min_iade_per_room)
            else {
                continue;
            };
            let iade_count = view.iade_count() as u32;
            if iade_count < min_iade {
                out.push(ConflictDraft {
                    kind: ConflictType::InsufficientIadeCount,
                    severity: ConflictSeverity::Error,
                    message: t_with_args(
                        "conflicts.insufficient_iade_count",
                        &[
                            ("room", &view.room_label()),
                            ("count", &iade_count.to_string()),
                            ("min", &min_iade.to_string()),
                        ],
                    ),
                    assignment_id: Some(view.assignment.assignment_id.clone()),
                    staff_assignment_id: None,
                    staff_id: None,
                    surgeon_id: None,
                });
            }
        }

        out
    }
}
