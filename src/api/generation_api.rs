// ==========================================
// Planification bloc opératoire - API de génération
// ==========================================
// Rôle: matérialiser les plannings journaliers d'une plage de dates à
// partir des trames retenues, puis valider chaque jour généré.
// La boucle est séquentielle par date; chaque date forme une unité de
// travail indépendante. Un planning non-DRAFT n'est jamais modifié.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validation_api::ValidationApi;
use crate::api::Actor;
use crate::clock::Clock;
use crate::domain::action_log::{ActionKind, ActionLog};
use crate::domain::planning::{ConflictDraft, DayPlan, RoomAssignment, StaffAssignment};
use crate::domain::types::{ConflictSeverity, ConflictType};
use crate::engine::TrameExpansionEngine;
use crate::i18n::t_with_args;
use crate::repository::{
    AbsenceRepository, ActionLogRepository, ConflictRepository, DayPlanRepository,
    RoomAssignmentRepository, TrameRepository,
};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct GenerationApi {
    day_plan_repo: Arc<DayPlanRepository>,
    assignment_repo: Arc<RoomAssignmentRepository>,
    conflict_repo: Arc<ConflictRepository>,
    trame_repo: Arc<TrameRepository>,
    absence_repo: Arc<AbsenceRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    validation_api: Arc<ValidationApi>,
    engine: Arc<TrameExpansionEngine>,
    clock: Arc<dyn Clock>,
}

impl GenerationApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        day_plan_repo: Arc<DayPlanRepository>,
        assignment_repo: Arc<RoomAssignmentRepository>,
        conflict_repo: Arc<ConflictRepository>,
        trame_repo: Arc<TrameRepository>,
        absence_repo: Arc<AbsenceRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        validation_api: Arc<ValidationApi>,
        engine: Arc<TrameExpansionEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            day_plan_repo,
            assignment_repo,
            conflict_repo,
            trame_repo,
            absence_repo,
            action_log_repo,
            validation_api,
            engine,
            clock,
        }
    }

    /// Génère (ou régénère) les plannings d'un site sur [start, end].
    ///
    /// Pour chaque date: le planning (site, date) est créé en DRAFT s'il
    /// n'existe pas; s'il existe dans un autre statut il est laissé
    /// intact mais retourné; sinon ses occupations et conflits sont
    /// purgés puis rematérialisés depuis les trames, et la journée
    /// retraverse la validation. L'abandon en cours de plage laisse les
    /// dates déjà traitées valides.
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn generate_day_plans(
        &self,
        site_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        trame_ids: &[String],
        actor: &Actor,
    ) -> ApiResult<Vec<DayPlan>> {
        if start > end {
            return Err(ApiError::InvalidInput(format!(
                "plage de dates invalide: {} > {}",
                start, end
            )));
        }

        let trames = self.trame_repo.load_active_with_affectations(trame_ids)?;
        if trames.is_empty() {
            return Err(ApiError::InvalidInput(
                "aucune trame active pour les IDs fournis".to_string(),
            ));
        }

        let absences = self.absence_repo.list_approved_overlapping(start, end)?;

        let mut generated = Vec::new();
        let mut date = start;
        while date <= end {
            let plan = self
                .day_plan_repo
                .find_or_create_draft(site_id, date, self.clock.now())?;

            if plan.is_draft() {
                self.regenerate_day(&plan, &trames, date, &absences)?;
                self.validation_api.validate_day_plan(&plan.plan_id)?;

                let refreshed = self
                    .day_plan_repo
                    .find_by_id(&plan.plan_id)?
                    .ok_or_else(|| ApiError::NotFound(format!("DayPlan (id={})", plan.plan_id)))?;
                generated.push(refreshed);
            } else {
                // Un planning déjà promu n'est jamais régénéré.
                info!(
                    plan_id = %plan.plan_id,
                    status = %plan.status,
                    "planning non-DRAFT laissé intact"
                );
                generated.push(plan);
            }

            let Some(next) = date.succ_opt() else {
                break;
            };
            date = next;
        }

        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: None,
            action: ActionKind::GeneratePlans,
            actor: actor.name.clone(),
            detail: Some(format!(
                "site {}, {} -> {}, {} planning(s)",
                site_id,
                start,
                end,
                generated.len()
            )),
            payload_json: Some(json!({ "trame_ids": trame_ids })),
            created_at: self.clock.now(),
        })?;

        info!(site_id, plans = generated.len(), "génération terminée");

        Ok(generated)
    }

    /// Purge puis rematérialise une journée DRAFT depuis les trames.
    fn regenerate_day(
        &self,
        plan: &DayPlan,
        trames: &[crate::domain::trame::TrameWithAffectations],
        date: NaiveDate,
        absences: &[crate::domain::personnel::Absence],
    ) -> ApiResult<()> {
        self.assignment_repo.clear_for_plan(&plan.plan_id)?;
        self.conflict_repo.clear_for_plan(&plan.plan_id)?;

        let expansion = self.engine.expand_for_date(trames, date, absences);

        // Matérialisation des créneaux gagnants
        let now = self.clock.now();
        let mut assignment_ids = Vec::with_capacity(expansion.slots.len());
        for slot in &expansion.slots {
            let assignment = RoomAssignment {
                assignment_id: Uuid::new_v4().to_string(),
                plan_id: plan.plan_id.clone(),
                room_id: slot.room_id.clone(),
                period: slot.period,
                surgeon_id: slot.surgeon_id.clone(),
                expected_specialty: slot.expected_specialty.clone(),
                source_affectation_id: Some(slot.source_affectation_id.clone()),
                created_at: now,
            };
            self.assignment_repo.insert(&assignment)?;

            if let Some(staff) = &slot.staff {
                self.assignment_repo.insert_staff(&StaffAssignment {
                    staff_assignment_id: Uuid::new_v4().to_string(),
                    assignment_id: assignment.assignment_id.clone(),
                    staff_id: staff.staff_id.clone(),
                    role: staff.role,
                    is_primary_anesthetist: staff.is_primary_anesthetist,
                })?;
            }

            assignment_ids.push(assignment.assignment_id);
        }

        // Avertissements de collision, rattachés au créneau gagnant
        let overlap_drafts: Vec<ConflictDraft> = expansion
            .overlaps
            .iter()
            .map(|overlap| ConflictDraft {
                kind: ConflictType::TrameOverlapWarning,
                severity: ConflictSeverity::Warning,
                message: t_with_args(
                    "conflicts.trame_overlap",
                    &[
                        ("room", &overlap.room_id),
                        ("period", overlap.period.to_db_str()),
                        ("trame", &overlap.losing_trame_name),
                    ],
                ),
                assignment_id: assignment_ids.get(overlap.winning_slot).cloned(),
                staff_assignment_id: None,
                staff_id: None,
                surgeon_id: None,
            })
            .collect();

        if !overlap_drafts.is_empty() {
            self.conflict_repo
                .insert_drafts(&plan.plan_id, &overlap_drafts, now)?;
        }

        info!(
            plan_id = %plan.plan_id,
            slots = expansion.slots.len(),
            overlaps = expansion.overlaps.len(),
            "journée rematérialisée"
        );

        Ok(())
    }
}
