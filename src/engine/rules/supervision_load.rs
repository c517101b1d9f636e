// ==========================================
// Règle charge de supervision - MAR uniquement
// ==========================================
// Par demi-journée et par MAR:
// - salles en anesthésiste principal (primary)
// - salles supervisées sans être principal, ventilées par catégorie de
//   secteur (endoscopie / ophtalmologie / standard)
// Le budget de supervision se réduit du nombre de salles en principal,
// borné à zéro.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::{PlanningSnapshot, RoomAssignmentView};
use crate::domain::types::{ConflictSeverity, ConflictType, HalfDay, SectorCategory};
use crate::engine::rules::Rule;
use crate::i18n::t_with_args;
use std::collections::BTreeMap;

pub struct SupervisionLoadRule;

impl SupervisionLoadRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupervisionLoadRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Charge d'un MAR sur une demi-journée.
#[derive(Default)]
struct MarLoad<'a> {
    display_name: String,
    primary: Vec<&'a RoomAssignmentView>,
    supervised: Vec<&'a RoomAssignmentView>,
}

impl<'a> MarLoad<'a> {
    fn supervised_in(&self, category: SectorCategory) -> Vec<&'a RoomAssignmentView> {
        self.supervised
            .iter()
            .filter(|v| {
                v.sector
                    .as_ref()
                    .map(|s| s.category == category)
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    fn is_primary_in(&self, category: SectorCategory) -> bool {
        self.primary.iter().any(|v| {
            v.sector
                .as_ref()
                .map(|s| s.category == category)
                .unwrap_or(false)
        })
    }
}

impl Rule for SupervisionLoadRule {
    fn code(&self) -> &'static str {
        "supervision_mar"
    }

    fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut out = Vec::new();
        let limits = snapshot.limits;

        for half_day in [HalfDay::Morning, HalfDay::Afternoon] {
            let mut loads: BTreeMap<String, MarLoad> = BTreeMap::new();

            for view in &snapshot.rooms {
                if !view.assignment.period.half_days().contains(&half_day) {
                    continue;
                }
                for staff in view.mar_staff() {
                    let load = loads
                        .entry(staff.assignment.staff_id.clone())
                        .or_default();
                    load.display_name = staff.display_name();
                    if staff.assignment.is_primary_anesthetist {
                        load.primary.push(view);
                    } else {
                        load.supervised.push(view);
                    }
                }
            }

            for (staff_id, load) in &loads {
                let period = half_day.to_string();
                let primary_count = load.primary.len() as u32;
                let supervision_count = load.supervised.len() as u32;

                // 1. Salles en principal
                if primary_count > limits.max_primary {
                    out.push(draft(
                        ConflictType::MarExceedMaxSallesPrincipales,
                        ConflictSeverity::Error,
                        t_with_args(
                            "conflicts.mar_exceed_principal",
                            &[
                                ("person", &load.display_name),
                                ("count", &primary_count.to_string()),
                                ("max", &limits.max_primary.to_string()),
                                ("period", &period),
                            ],
                        ),
                        load.primary.first(),
                        staff_id,
                    ));
                }

                // 2. Budget global de supervision (réduit par les salles
                //    en principal, borné à zéro)
                let allowed = if primary_count == 0 {
                    limits.max_global_supervision
                } else {
                    limits.max_global_supervision.saturating_sub(primary_count)
                };
                if supervision_count > allowed {
                    out.push(draft(
                        ConflictType::MarExceedMaxSallesSupervisees,
                        ConflictSeverity::Error,
                        t_with_args(
                            "conflicts.mar_exceed_supervision",
                            &[
                                ("person", &load.display_name),
                                ("count", &supervision_count.to_string()),
                                ("max", &allowed.to_string()),
                                ("period", &period),
                            ],
                        ),
                        load.supervised.first(),
                        staff_id,
                    ));
                }

                // 3. Budgets sectoriels
                let endo = load.supervised_in(SectorCategory::Endoscopy);
                if endo.len() as u32 > limits.max_endo_supervision {
                    out.push(draft(
                        ConflictType::MarExceedMaxSallesSuperviseesEndo,
                        ConflictSeverity::Error,
                        t_with_args(
                            "conflicts.mar_exceed_supervision_endo",
                            &[
                                ("person", &load.display_name),
                                ("count", &endo.len().to_string()),
                                ("max", &limits.max_endo_supervision.to_string()),
                                ("period", &period),
                            ],
                        ),
                        endo.first(),
                        staff_id,
                    ));
                }

                let ophtalmo = load.supervised_in(SectorCategory::Ophthalmology);
                if ophtalmo.len() as u32 > limits.max_ophtalmo_supervision {
                    out.push(draft(
                        ConflictType::MarExceedMaxSallesSuperviseesOphtalmo,
                        ConflictSeverity::Error,
                        t_with_args(
                            "conflicts.mar_exceed_supervision_ophtalmo",
                            &[
                                ("person", &load.display_name),
                                ("count", &ophtalmo.len().to_string()),
                                ("max", &limits.max_ophtalmo_supervision.to_string()),
                                ("period", &period),
                            ],
                        ),
                        ophtalmo.first(),
                        staff_id,
                    ));
                }

                // 4. Principal en ophtalmologie + supervision du bloc standard
                let standard = load.supervised_in(SectorCategory::Standard);
                if load.is_primary_in(SectorCategory::Ophthalmology) && !standard.is_empty() {
                    out.push(draft(
                        ConflictType::MarPrincipalOphtalmoSupervisingStandardBloc,
                        ConflictSeverity::Warning,
                        t_with_args(
                            "conflicts.mar_principal_ophtalmo_standard",
                            &[("person", &load.display_name), ("period", &period)],
                        ),
                        standard.first(),
                        staff_id,
                    ));
                }
            }
        }

        out
    }
}

fn draft(
    kind: ConflictType,
    severity: ConflictSeverity,
    message: String,
    anchor: Option<&&RoomAssignmentView>,
    staff_id: &str,
) -> ConflictDraft {
    ConflictDraft {
        kind,
        severity,
        message,
        assignment_id: anchor.map(|v| v.assignment.assignment_id.clone()),
        staff_assignment_id: None,
        staff_id: Some(staff_id.to_string()),
        surgeon_id: None,
    }
}
