// ==========================================
// Règle contiguïté - salles couvertes par un même MAR
// ==========================================
// Dans un secteur déclarant require_contiguous_rooms, un MAR couvrant
// plusieurs salles sur la même demi-journée doit occuper un ensemble de
// salles connexe: graphe d'adjacence du secteur s'il est déclaré, sinon
// adjacence des numéros de salle (écart de 1).
// Un conflit ERROR est émis par affectation de salle impliquée.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::{PlanningSnapshot, RoomAssignmentView};
use crate::domain::types::{ConflictSeverity, ConflictType, HalfDay};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;
use std::collections::BTreeMap;

pub struct ContiguityRule;

impl ContiguityRule {
    pub fn new() -> Self {
        Self
    }

    /// L'ensemble de salles est-il connexe pour la relation d'adjacence
    /// du secteur ?
    fn is_connected(views: &[&RoomAssignmentView]) -> bool {
        if views.len() <= 1 {
            return true;
        }

        let adjacent = |a: &RoomAssignmentView, b: &RoomAssignmentView| -> bool {
            let (Some(room_a), Some(room_b)) = (a.room.as_ref(), b.room.as_ref()) else {
                return false;
            };
            let declared = a
                .sector
                .as_ref()
                .map(|s| !s.rules.contiguity_map.is_empty())
                .unwrap_or(false);
            if declared {
                a.sector
                    .as_ref()
                    .map(|s| s.rules.declares_adjacent(&room_a.room_id, &room_b.room_id))
                    .unwrap_or(false)
            } else {
                // Repli: numéros de salle consécutifs.
                (room_a.number - room_b.number).abs() == 1
            }
        };

        // Parcours en largeur sur l'ensemble des salles.
        let mut visited = vec![false; views.len()];
        let mut queue = vec![0usize];
        visited[0] = true;
        let mut seen = 1usize;

        while let Some(current) = queue.pop() {
            for (idx, view) in views.iter().enumerate() {
                if !visited[idx] && adjacent(views[current], view) {
                    visited[idx] = true;
                    seen += 1;
                    queue.push(idx);
                }
            }
        }

        seen == views.len()
    }
}

impl Default for ContiguityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ContiguityRule {
    fn code(&self) -> &'static str {
        "contiguite"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for half_day in [HalfDay::Morning, HalfDay::Afternoon] {
            // (secteur, MAR) -> salles couvertes
            let mut groups: BTreeMap<(String, String), Vec<&RoomAssignmentView>> = BTreeMap::new();

            for view in &snapshot.rooms {
                if !view.assignment.period.half_days().contains(&half_day) {
                    continue;
                }
                let Some(sector) = view.sector.as_ref() else {
                    continue;
                };
                if !sector.rules.require_contiguous_rooms {
                    continue;
                }
                for staff in view.mar_staff() {
                    let key = (sector.sector_id.clone(), staff.assignment.staff_id.clone());
                    let rooms = groups.entry(key).or_default();
                    if !rooms
                        .iter()
                        .any(|v| v.assignment.assignment_id == view.assignment.assignment_id)
                    {
                        rooms.push(view);
                    }
                }
            }

            for ((_, staff_id), views) in &groups {
                if views.len() <= 1 || Self::is_connected(views) {
                    continue;
                }

                let person_name = views
                    .iter()
                    .flat_map(|v| v.staff.iter())
                    .find(|s| &s.assignment.staff_id == staff_id)
                    .map(|s| s.display_name())
                    .unwrap_or_else(|| staff_id.clone());
                let sector_name = views
                    .first()
                    .and_then(|v| v.sector.as_ref())
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                let period = half_day.to_string();

                for view in views {
                    out.push(ConflictDraft {
                        kind: ConflictType::ContiguityViolation,
                        severity: ConflictSeverity::Error,
                        message: t_with_args(
                            "conflicts.contiguity_violation",
                            &[
                                ("person", &person_name),
                                ("sector", &sector_name),
                                ("room", &view.room_label()),
                                ("period", &period),
                            ],
                        ),
                        assignment_id: Some(view.assignment.assignment_id.clone()),
                        staff_assignment_id: None,
                        staff_id: Some(staff_id.clone()),
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
    use crate::domain::sites::SectorRules;
    use crate::domain::types::{Period, RoomKind, SectorCategory};

    fn contiguous_sector(map: Vec<(String, String)>) -> crate::domain::sites::Sector {
        let mut s = sector("sec-1", SectorCategory::Endoscopy);
        s.rules = SectorRules {
            require_contiguous_rooms: true,
            contiguity_map: map,
            min_iade_per_room: None,
        };
        s
    }

    fn view_in(
        assignment_id: &str,
        room_no: i32,
        s: &crate::domain::sites::Sector,
        m: &crate::domain::personnel::StaffMember,
        period: Period,
    ) -> crate::domain::snapshot::RoomAssignmentView {
        room_view(
            assignment_id,
            room(
                &format!("r{}", room_no),
                room_no,
                RoomKind::Standard,
                Some(&s.sector_id),
            ),
            Some(s.clone()),
            period,
            None,
            vec![staff_view(assignment_id, m, false)],
        )
    }

    #[test]
    fn test_adjacent_numbers_pass_without_map() {
        let s = contiguous_sector(vec![]);
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Afternoon));
        snapshot.rooms.push(view_in("ra-2", 2, &s, &m, Period::Afternoon));

        assert!(ContiguityRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_non_adjacent_numbers_fail_without_map() {
        let s = contiguous_sector(vec![]);
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Afternoon));
        snapshot.rooms.push(view_in("ra-2", 3, &s, &m, Period::Afternoon));

        let conflicts = ContiguityRule::new().evaluate(&snapshot);
        // Un conflit par affectation impliquée.
        assert_eq!(conflicts.len(), 2);
        for c in &conflicts {
            assert_eq!(c.kind, ConflictType::ContiguityViolation);
            assert_eq!(c.severity, ConflictSeverity::Error);
        }
    }

    #[test]
    fn test_declared_map_wins_over_numbers() {
        // Salles 1 et 3: non consécutives mais déclarées adjacentes.
        let s = contiguous_sector(vec![("r1".into(), "r3".into())]);
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Morning));
        snapshot.rooms.push(view_in("ra-2", 3, &s, &m, Period::Morning));

        assert!(ContiguityRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_three_rooms_connected_chain() {
        let s = contiguous_sector(vec![]);
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Morning));
        snapshot.rooms.push(view_in("ra-2", 2, &s, &m, Period::Morning));
        snapshot.rooms.push(view_in("ra-3", 3, &s, &m, Period::Morning));

        assert!(ContiguityRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_sector_without_requirement_is_ignored() {
        let mut s = contiguous_sector(vec![]);
        s.rules.require_contiguous_rooms = false;
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Morning));
        snapshot.rooms.push(view_in("ra-2", 5, &s, &m, Period::Morning));

        assert!(ContiguityRule::new().evaluate(&snapshot).is_empty());
    }

    #[test]
    fn test_single_room_never_flagged() {
        let s = contiguous_sector(vec![]);
        let m = mar("m1");
        let mut snapshot = empty_snapshot();
        snapshot.rooms.push(view_in("ra-1", 1, &s, &m, Period::Morning));

        assert!(ContiguityRule::new().evaluate(&snapshot).is_empty());
    }
}
