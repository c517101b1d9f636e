// ==========================================
// Règle absences - personnel et chirurgiens indisponibles
// ==========================================
// Entrée: instantané du planning (absences approuvées pré-filtrées)
// Sortie: PERSONNEL_ABSENT (ERROR) par affectation concernée
// ==========================================
// Granularité journée entière: une personne absente à la date l'est pour
// toutes les périodes de cette date.
// ==========================================

use crate::domain::personnel::PersonRef;
use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;
use crate::domain::types::{ConflictSeverity, ConflictType};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;

pub struct AbsenceRule;

impl AbsenceRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AbsenceRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AbsenceRule {
    fn code(&self) -> &'static str {
        "absence"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for view in &snapshot.rooms {
            // Chirurgien de la salle
            if let Some(surgeon_id) = &view.assignment.surgeon_id {
                if snapshot.is_absent(&PersonRef::Surgeon(surgeon_id.clone())) {
                    let name = view
                        .surgeon
                        .as_ref()
                        .map(|s| s.full_name())
                        .unwrap_or_else(|| surgeon_id.clone());
                    out.push(ConflictDraft {
                        kind: ConflictType::PersonnelAbsent,
                        severity: ConflictSeverity::Error,
                        message: t_with_args(
                            "conflicts.personnel_absent",
                            &[("person", &name), ("room", &view.room_label())],
                        ),
                        assignment_id: Some(view.assignment.assignment_id.clone()),
                        staff_assignment_id: None,
                        staff_id: None,
                        surgeon_id: Some(surgeon_id.clone()),
                    });
                }
            }

            // Personnel de la salle
            for staff in &view.staff {
                if snapshot.is_absent(&staff.person()) {
                    out.push(ConflictDraft {
                        kind: ConflictType::PersonnelAbsent,
                        severity: ConflictSeverity::Error,
                        message: t_with_args(
                            "conflicts.personnel_absent",
                            &[
                                ("person", &staff.display_name()),
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
    fn test_no_conflict_without_absence() {
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

        assert!(AbsenceRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_absent_staff_yields_error_per_assignment() {
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        // Même MAR affecté matin et après-midi: un conflit par affectation.
        snapshot.rooms.push(room_view(
            "ra-1",
            room("r1", 1, RoomKind::Standard, None),
            None,
            Period::Morning,
            None,
            vec![staff_view("ra-1", &m, true)],
        ));
        snapshot.rooms.push(room_view(
            "ra-2",
            room("r2", 2, RoomKind::Standard, None),
            None,
            Period::Afternoon,
            None,
            vec![staff_view("ra-2", &m, true)],
        ));
        mark_absent(&mut snapshot, PersonRef::Staff("m1".into()));

        let conflicts = AbsenceRule::new().evaluate(&snapshot);
        assert_eq!(conflicts.len(), 2);
        for c in &conflicts {
            assert_eq!(c.kind, ConflictType::PersonnelAbsent);
            assert_eq!(c.severity, ConflictSeverity::Error);
            assert_eq!(c.staff_id.as_deref(), Some("m1"));
        }
    }

    #[test]
    fn test_absent_surgeon_yields_error() {
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(room_view(
            "ra-1",
            room("r1", 1, RoomKind::Standard, None),
            None,
            Period::AllDay,
            Some(surgeon("c1")),
            vec![],
        ));
        mark_absent(&mut snapshot, PersonRef::Surgeon("c1".into()));

        let conflicts = AbsenceRule::new().evaluate(&snapshot);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].surgeon_id.as_deref(), Some("c1"));
        assert_eq!(conflicts[0].severity, ConflictSeverity::Error);
    }
}
