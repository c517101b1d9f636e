// ==========================================
// Règle incompatibilités - paires de personnes en conflit
// ==========================================
// Pour chaque paire non ordonnée d'occupations de salles actives sur la
// même période: chirurgien contre chirurgien, personnel contre personnel,
// et chirurgien de chaque salle contre personnel de l'autre.
// Niveau BLOQUANT -> ERROR, PREFERENTIEL -> WARNING (variante _PREF_),
// un conflit par affectation de chaque côté. L'auto-comparaison (même
// personne des deux côtés) est exclue.
// ==========================================

use crate::domain::personnel::PersonRef;
use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::{PlanningSnapshot, RoomAssignmentView, StaffAssignmentView};
use crate::domain::types::{ConflictSeverity, ConflictType, IncompatibilityLevel};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;

pub struct IncompatibilityRule;

impl IncompatibilityRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IncompatibilityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for IncompatibilityRule {
    fn code(&self) -> &'static str {
        "incompatibilite"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for (i, left) in snapshot.rooms.iter().enumerate() {
            for right in snapshot.rooms.iter().skip(i + 1) {
                if !left.concurrent_with(right) {
                    continue;
                }

                // (a) chirurgien contre chirurgien
                self.check_surgeons(snapshot, left, right, &mut out);

                // (b) personnel contre personnel
                for staff_left in &left.staff {
                    for staff_right in &right.staff {
                        self.check_staff_pair(snapshot, left, right, staff_left, staff_right, &mut out);
                    }
                }

                // (c) chirurgien de chaque salle contre personnel de l'autre
                self.check_surgeon_vs_staff(snapshot, left, right, &mut out);
                self.check_surgeon_vs_staff(snapshot, right, left, &mut out);
            }
        }

        out
    }
}

impl IncompatibilityRule {
    fn level_between(
        snapshot: &PlanningSnapshot,
        a: &PersonRef,
        b: &PersonRef,
    ) -> Option<IncompatibilityLevel> {
        if a == b {
            return None;
        }
        let mut found: Option<IncompatibilityLevel> = None;
        for inc in &snapshot.incompatibilities {
            if !inc.concerns(a, b) {
                continue;
            }
            // Le niveau bloquant l'emporte sur le préférentiel.
            if inc.level == IncompatibilityLevel::Blocking {
                return Some(IncompatibilityLevel::Blocking);
            }
            found = Some(inc.level);
        }
        found
    }

    fn check_surgeons(
        &self,
        snapshot: &PlanningSnapshot,
        left: &RoomAssignmentView,
        right: &RoomAssignmentView,
        out: &mut Vec<ConflictDraft>,
    ) {
        let (Some(surgeon_left), Some(surgeon_right)) = (
            left.assignment.surgeon_id.as_ref(),
            right.assignment.surgeon_id.as_ref(),
        ) else {
            return;
        };

        let ref_left = PersonRef::Surgeon(surgeon_left.clone());
        let ref_right = PersonRef::Surgeon(surgeon_right.clone());
        let Some(level) = Self::level_between(snapshot, &ref_left, &ref_right) else {
            return;
        };

        let (kind, severity, key) = match level {
            IncompatibilityLevel::Blocking => (
                ConflictType::SurgeonIncompatibility,
                ConflictSeverity::Error,
                "conflicts.surgeon_incompatibility",
            ),
            IncompatibilityLevel::Preferential => (
                ConflictType::SurgeonPrefIncompatibility,
                ConflictSeverity::Warning,
                "conflicts.surgeon_pref_incompatibility",
            ),
        };

        let name_left = surgeon_name(left, surgeon_left);
        let name_right = surgeon_name(right, surgeon_right);

        for (view, surgeon_id) in [(left, surgeon_left), (right, surgeon_right)] {
            out.push(ConflictDraft {
                kind,
                severity,
                message: t_with_args(
                    key,
                    &[
                        ("a", &name_left),
                        ("b", &name_right),
                        ("room", &view.room_label()),
                    ],
                ),
                assignment_id: Some(view.assignment.assignment_id.clone()),
                staff_assignment_id: None,
                staff_id: None,
                surgeon_id: Some(surgeon_id.clone()),
            });
        }
    }

    fn check_staff_pair(
        &self,
        snapshot: &PlanningSnapshot,
        left: &RoomAssignmentView,
        right: &RoomAssignmentView,
        staff_left: &StaffAssignmentView,
        staff_right: &StaffAssignmentView,
        out: &mut Vec<ConflictDraft>,
    ) {
        let Some(level) =
            Self::level_between(snapshot, &staff_left.person(), &staff_right.person())
        else {
            return;
        };

        let (kind, severity, key) = match level {
            IncompatibilityLevel::Blocking => (
                ConflictType::StaffIncompatibility,
                ConflictSeverity::Error,
                "conflicts.staff_incompatibility",
            ),
            IncompatibilityLevel::Preferential => (
                ConflictType::StaffPrefIncompatibility,
                ConflictSeverity::Warning,
                "conflicts.staff_pref_incompatibility",
            ),
        };

        let name_left = staff_left.display_name();
        let name_right = staff_right.display_name();

        for (view, staff) in [(left, staff_left), (right, staff_right)] {
            out.push(ConflictDraft {
                kind,
                severity,
                message: t_with_args(
                    key,
                    &[
                        ("a", &name_left),
                        ("b", &name_right),
                        ("room", &view.room_label()),
                    ],
                ),
                assignment_id: Some(view.assignment.assignment_id.clone()),
                staff_assignment_id: Some(staff.assignment.staff_assignment_id.clone()),
                staff_id: Some(staff.assignment.staff_id.clone()),
                surgeon_id: None,
            });
        }
    }

    /// Chirurgien de `surgeon_side` contre chaque membre du personnel de
    /// `staff_side`.
    fn check_surgeon_vs_staff(
        &self,
        snapshot: &PlanningSnapshot,
        surgeon_side: &RoomAssignmentView,
        staff_side: &RoomAssignmentView,
        out: &mut Vec<ConflictDraft>,
    ) {
        let Some(surgeon_id) = surgeon_side.assignment.surgeon_id.as_ref() else {
            return;
        };
        let surgeon_ref = PersonRef::Surgeon(surgeon_id.clone());

        for staff in &staff_side.staff {
            let Some(level) = Self::level_between(snapshot, &surgeon_ref, &staff.person()) else {
                continue;
            };

            let (kind, severity, key) = match level {
                IncompatibilityLevel::Blocking => (
                    ConflictType::SurgeonStaffIncompatibility,
                    ConflictSeverity::Error,
                    "conflicts.surgeon_staff_incompatibility",
                ),
                IncompatibilityLevel::Preferential => (
                    ConflictType::SurgeonStaffPrefIncompatibility,
                    ConflictSeverity::Warning,
                    "conflicts.surgeon_staff_pref_incompatibility",
                ),
            };

            let surgeon_display = surgeon_name(surgeon_side, surgeon_id);
            let staff_display = staff.display_name();

            // Côté chirurgien
            out.push(ConflictDraft {
                kind,
                severity,
                message: t_with_args(
                    key,
                    &[
                        ("a", &surgeon_display),
                        ("b", &staff_display),
                        ("room", &surgeon_side.room_label()),
                    ],
                ),
                assignment_id: Some(surgeon_side.assignment.assignment_id.clone()),
                staff_assignment_id: None,
                staff_id: None,
                surgeon_id: Some(surgeon_id.clone()),
            });
            // Côté personnel
            out.push(ConflictDraft {
                kind,
                severity,
                message: t_with_args(
                    key,
                    &[
                        ("a", &surgeon_display),
                        ("b", &staff_display),
                        ("room", &staff_side.room_label()),
                    ],
                ),
                assignment_id: Some(staff_side.assignment.assignment_id.clone()),
                staff_assignment_id: Some(staff.assignment.staff_assignment_id.clone()),
                staff_id: Some(staff.assignment.staff_id.clone()),
                surgeon_id: None,
            });
        }
    }
}

fn surgeon_name(view: &RoomAssignmentView, surgeon_id: &str) -> String {
    view.surgeon
        .as_ref()
        .map(|s| s.full_name())
        .unwrap_or_else(|| surgeon_id.to_string())
}
