// ==========================================
// Règle politiques sectorielles - exigences par catégorie de secteur
// ==========================================
// - Hyperaseptique: au moins 3 personnels par salle (ERROR)
// - Ophtalmologie + chirurgien: au moins un personnel habilité (ERROR)
// - Endoscopie + chirurgien: au moins un personnel habilité (WARNING)
// - Endoscopie tenue par un MAR sans IADE (WARNING)
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;
use crate::domain::types::{ConflictSeverity, ConflictType, SectorCategory};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;

/// Effectif minimal d'une salle hyperaseptique.
const MIN_STAFF_HYPERASEPTIC: usize = 3;

pub struct SectorPolicyRule;

impl SectorPolicyRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SectorPolicyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SectorPolicyRule {
    fn code(&self) -> &'static str {
        "politique_secteur"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();

        for view in &snapshot.rooms {
            let Some(sector) = view.sector.as_ref() else {
                continue;
            };
            let has_surgeon = view.assignment.surgeon_id.is_some();

            match sector.category {
                SectorCategory::Hyperaseptic => {
                    if view.staff.len() < MIN_STAFF_HYPERASEPTIC {
                        out.push(ConflictDraft {
                            kind: ConflictType::InsufficientStaffHyperaseptic,
                            severity: ConflictSeverity::Error,
                            message: t_with_args(
                                "conflicts.insufficient_staff_hyperaseptic",
                                &[
                                    ("room", &view.room_label()),
                                    ("count", &view.staff.len().to_string()),
                                    ("min", &MIN_STAFF_HYPERASEPTIC.to_string()),
                                ],
                            ),
                            assignment_id: Some(view.assignment.assignment_id.clone()),
                            staff_assignment_id: None,
                            staff_id: None,
                            surgeon_id: None,
                        });
                    }
                }

                SectorCategory::Ophthalmology => {
                    let qualified = view.staff.iter().any(|s| {
                        s.member
                            .as_ref()
                            .map(|m| m.can_supervise_ophtalmo)
                            .unwrap_or(false)
                    });
                    if has_surgeon && !qualified {
                        out.push(ConflictDraft {
                            kind: ConflictType::MissingSpecialSkillOphtalmo,
                            severity: ConflictSeverity::Error,
                            message: t_with_args(
                                "conflicts.missing_special_skill_ophtalmo",
                                &[("room", &view.room_label())],
                            ),
                            assignment_id: Some(view.assignment.assignment_id.clone()),
                            staff_assignment_id: None,
                            staff_id: None,
                            surgeon_id: view.assignment.surgeon_id.clone(),
                        });
                    }
                }

                SectorCategory::Endoscopy => {
                    let qualified = view.staff.iter().any(|s| {
                        s.member
                            .as_ref()
                            .map(|m| m.can_supervise_endo)
                            .unwrap_or(false)
                    });
                    if has_surgeon && !qualified {
                        out.push(ConflictDraft {
                            kind: ConflictType::MissingSpecialSkillEndoscopie,
                            severity: ConflictSeverity::Warning,
                            message: t_with_args(
                                "conflicts.missing_special_skill_endoscopie",
                                &[("room", &view.room_label())],
                            ),
                            assignment_id: Some(view.assignment.assignment_id.clone()),
                            staff_assignment_id: None,
                            staff_id: None,
                            surgeon_id: view.assignment.surgeon_id.clone(),
                        });
                    }

                    // MAR présent sans IADE en endoscopie
                    if view.has_mar() && view.iade_count() == 0 {
                        out.push(ConflictDraft {
                            kind: ConflictType::MissingIadeInEndoWithMar,
                            severity: ConflictSeverity::Warning,
                            message: t_with_args(
                                "conflicts.missing_iade_in_endo_with_mar",
                                &[("room", &view.room_label())],
                            ),
                            assignment_id: Some(view.assignment.assignment_id.clone()),
                            staff_assignment_id: None,
                            staff_id: None,
                            surgeon_id: None,
                        });
                    }
                }

                SectorCategory::Standard => {}
            }
        }

        out
    }
}
