// ==========================================
// Règle couverture MAR - chirurgien sans anesthésiste
// ==========================================
// Une salle avec chirurgien mais sans MAR affecté est en défaut de
// couverture d'anesthésie obligatoire.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;
use crate::domain::types::{ConflictSeverity, ConflictType};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;

pub struct SurgeonCoverageRule;

impl SurgeonCoverageRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SurgeonCoverageRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SurgeonCoverageRule {
    fn code(&self) -> &'static str {
        "couverture_mar"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for view in &snapshot.rooms {
            let Some(surgeon_id) = view.assignment.surgeon_id.as_ref() else {
                continue;
            };
            if view.has_mar() {
                continue;
            }

            let surgeon_display = view
                .surgeon
                .as_ref()
                .map(|s| s.full_name())
                .unwrap_or_else(|| surgeon_id.clone());

            out.push(ConflictDraft {
                kind: ConflictType::MissingMarForSurgeon,
                severity: ConflictSeverity::Error,
                message: t_with_args(
                    "conflicts.missing_mar_for_surgeon",
                    &[("room", &view.room_label()), ("surgeon", &surgeon_display)],
                ),
                assignment_id: Some(view.assignment.assignment_id.clone()),
                staff_assignment_id: None,
                staff_id: None,
                surgeon_id: Some(surgeon_id.clone()),
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::test_support::*;
    use crate::domain::types::{Period, RoomKind};

    #[test]
    fn test_surgeon_without_mar_is_error() {
        let i = iade("i1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(room_view(
            "ra-1",
            room("r1", 1, RoomKind::Standard, None),
            None,
            Period::Morning,
            Some(surgeon("c1")),
            vec![staff_view("ra-1", &i, false)],
        ));

        let conflicts = SurgeonCoverageRule::new().evaluate(&snapshot);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictType::MissingMarForSurgeon);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Error);
    }

    #[test]
    fn test_surgeon_with_mar_passes() {
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(room_view(
            "ra-1",
            room("r1", 1, RoomKind::Standard, None),
            None,
            Period::Morning,
            Some(surgeon("c1")),
            vec![staff_view("ra-1", &m, true)],
        ));

        assert!(SurgeonCoverageRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_room_without_surgeon_ignored() {
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(room_view(
            "ra-1",
            room("r1", 1, RoomKind::Standard, None),
            None,
            Period::Morning,
            None,
            vec![],
        ));

        assert!(SurgeonCoverageRule::new().evaluate(&snapshot).is_empty());
    }
}
