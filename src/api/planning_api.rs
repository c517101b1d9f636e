// ==========================================
// Planification bloc opératoire - API du cycle de vie des plannings
// ==========================================
// Rôle: transitions de statut, mutations d'affectations de personnel,
// résolution de conflits. Chaque opération mutante est journalisée et
// retraverse la validation quand elle touche au contenu du planning.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validation_api::ValidationApi;
use crate::api::Actor;
use crate::clock::Clock;
use crate::domain::action_log::{ActionKind, ActionLog};
use crate::domain::planning::{Conflict, DayPlan, StaffAssignment};
use crate::domain::types::{ConflictSeverity, PlanStatus, StaffRole};
use crate::engine::workflow::{AuthorizationPort, StatusWorkflow};
use crate::repository::{
    ActionLogRepository, ConflictRepository, DayPlanRepository, RoomAssignmentRepository,
    StaffMemberRepository,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct PlanningApi {
    day_plan_repo: Arc<DayPlanRepository>,
    assignment_repo: Arc<RoomAssignmentRepository>,
    conflict_repo: Arc<ConflictRepository>,
    staff_repo: Arc<StaffMemberRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    validation_api: Arc<ValidationApi>,
    authorization: Arc<dyn AuthorizationPort>,
    clock: Arc<dyn Clock>,
}

impl PlanningApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        day_plan_repo: Arc<DayPlanRepository>,
        assignment_repo: Arc<RoomAssignmentRepository>,
        conflict_repo: Arc<ConflictRepository>,
        staff_repo: Arc<StaffMemberRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        validation_api: Arc<ValidationApi>,
        authorization: Arc<dyn AuthorizationPort>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            day_plan_repo,
            assignment_repo,
            conflict_repo,
            staff_repo,
            action_log_repo,
            validation_api,
            authorization,
            clock,
        }
    }

    // ==========================================
    // Transitions de statut
    // ==========================================

    /// Change le statut d'un planning.
    ///
    /// Gardes, dans l'ordre:
    /// 1. la transition doit exister dans la table;
    /// 2. promouvoir vers VALIDATED/LOCKED exige zéro conflit bloquant
    ///    (liste jointe au refus);
    /// 3. le rôle de l'acteur doit être admis pour cette transition.
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn change_status(
        &self,
        plan_id: &str,
        target: PlanStatus,
        actor: &Actor,
    ) -> ApiResult<DayPlan> {
        let plan = self
            .day_plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("DayPlan (id={})", plan_id)))?;

        if !StatusWorkflow::transition_exists(plan.status, target) {
            return Err(ApiError::InvalidTransition {
                from: plan.status,
                to: target,
                blocking: vec![],
            });
        }

        if StatusWorkflow::requires_no_blocking(target) {
            let blocking: Vec<Conflict> = self
                .conflict_repo
                .list_by_plan(plan_id)?
                .into_iter()
                .filter(|c| c.is_blocking())
                .collect();
            if !blocking.is_empty() {
                return Err(ApiError::InvalidTransition {
                    from: plan.status,
                    to: target,
                    blocking,
                });
            }
        }

        if !self
            .authorization
            .can_transition(actor.role, plan.status, target)
        {
            return Err(ApiError::InsufficientPermissions {
                required: StatusWorkflow::allowed_roles(plan.status, target),
            });
        }

        self.day_plan_repo
            .update_status(plan_id, target, plan.revision, self.clock.now())?;

        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: Some(plan_id.to_string()),
            action: ActionKind::ChangeStatus,
            actor: actor.name.clone(),
            detail: Some(format!("{} -> {}", plan.status, target)),
            payload_json: None,
            created_at: self.clock.now(),
        })?;

        info!(plan_id, from = %plan.status, to = %target, "statut changé");

        self.day_plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("DayPlan (id={})", plan_id)))
    }

    // ==========================================
    // Mutations d'affectations de personnel
    // ==========================================

    /// Ajoute ou met à jour l'affectation d'un membre du personnel dans
    /// une salle. Permis uniquement sur un planning DRAFT; déclenche une
    /// revalidation avant de retourner.
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn upsert_staff_assignment(
        &self,
        room_assignment_id: &str,
        staff_id: &str,
        role: StaffRole,
        is_primary_anesthetist: bool,
        actor: &Actor,
    ) -> ApiResult<StaffAssignment> {
        let assignment = self
            .assignment_repo
            .find_by_id(room_assignment_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("RoomAssignment (id={})", room_assignment_id))
            })?;

        let plan = self.guard_draft_mutation(&assignment.plan_id, actor)?;

        if self.staff_repo.find_by_id(staff_id)?.is_none() {
            return Err(ApiError::NotFound(format!("StaffMember (id={})", staff_id)));
        }

        let staff_assignment = match self
            .assignment_repo
            .find_staff_in_assignment(room_assignment_id, staff_id)?
        {
            Some(existing) => {
                self.assignment_repo.update_staff(
                    &existing.staff_assignment_id,
                    role,
                    is_primary_anesthetist,
                )?;
                StaffAssignment {
                    role,
                    is_primary_anesthetist,
                    ..existing
                }
            }
            None => {
                let created = StaffAssignment {
                    staff_assignment_id: Uuid::new_v4().to_string(),
                    assignment_id: room_assignment_id.to_string(),
                    staff_id: staff_id.to_string(),
                    role,
                    is_primary_anesthetist,
                };
                self.assignment_repo.insert_staff(&created)?;
                created
            }
        };

        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: Some(plan.plan_id.clone()),
            action: ActionKind::UpsertStaffAssignment,
            actor: actor.name.clone(),
            detail: Some(format!("salle {}, rôle {}", assignment.room_id, role)),
            payload_json: Some(json!({
                "staff_id": staff_id,
                "is_primary_anesthetist": is_primary_anesthetist,
            })),
            created_at: self.clock.now(),
        })?;

        // La mutation retraverse la validation avant de rendre la main.
        self.validation_api.validate_day_plan(&plan.plan_id)?;

        Ok(staff_assignment)
    }

    /// Retire une affectation de personnel. Permis uniquement sur un
    /// planning DRAFT; déclenche une revalidation.
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn remove_staff_assignment(
        &self,
        staff_assignment_id: &str,
        actor: &Actor,
    ) -> ApiResult<()> {
        let staff_assignment = self
            .assignment_repo
            .find_staff_by_id(staff_assignment_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("StaffAssignment (id={})", staff_assignment_id))
            })?;
        let assignment = self
            .assignment_repo
            .find_by_id(&staff_assignment.assignment_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "RoomAssignment (id={})",
                    staff_assignment.assignment_id
                ))
            })?;

        let plan = self.guard_draft_mutation(&assignment.plan_id, actor)?;

        self.assignment_repo.delete_staff(staff_assignment_id)?;

        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: Some(plan.plan_id.clone()),
            action: ActionKind::RemoveStaffAssignment,
            actor: actor.name.clone(),
            detail: Some(format!("salle {}", assignment.room_id)),
            payload_json: Some(json!({ "staff_id": staff_assignment.staff_id })),
            created_at: self.clock.now(),
        })?;

        self.validation_api.validate_day_plan(&plan.plan_id)?;

        Ok(())
    }

    /// Garde commune des mutations: planning DRAFT + acteur habilité.
    fn guard_draft_mutation(&self, plan_id: &str, actor: &Actor) -> ApiResult<DayPlan> {
        let plan = self
            .day_plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("DayPlan (id={})", plan_id)))?;

        if !plan.is_draft() {
            return Err(ApiError::MutationNotAllowed {
                status: plan.status,
            });
        }

        if !self
            .authorization
            .can_mutate_staff(actor.role, &plan.site_id)
        {
            return Err(ApiError::InsufficientPermissions {
                required: vec![
                    crate::domain::types::ActorRole::AdminTotal,
                    crate::domain::types::ActorRole::AdminPartiel,
                ],
            });
        }

        Ok(plan)
    }

    // ==========================================
    // Résolution de conflits
    // ==========================================

    /// Marque un conflit comme résolu (toute sévérité).
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn resolve_conflict(
        &self,
        conflict_id: &str,
        notes: Option<&str>,
        actor: &Actor,
    ) -> ApiResult<Conflict> {
        let conflict = self
            .conflict_repo
            .find_by_id(conflict_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Conflict (id={})", conflict_id)))?;

        self.conflict_repo
            .mark_resolved(conflict_id, &actor.name, notes, self.clock.now())?;

        self.log_resolution(&conflict, ActionKind::ResolveConflict, actor)?;
        self.recheck_blocking(&conflict.plan_id)?;

        self.conflict_repo
            .find_by_id(conflict_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Conflict (id={})", conflict_id)))
    }

    /// Résout de force un conflit ERROR (les deux drapeaux posés, notes
    /// de justification obligatoires côté appelant).
    ///
    /// # Erreurs
    /// - `ForceResolveNotAllowed`: le conflit n'est pas de sévérité ERROR
    #[instrument(skip(self, actor), fields(actor = %actor.name))]
    pub fn force_resolve_conflict(
        &self,
        conflict_id: &str,
        notes: Option<&str>,
        actor: &Actor,
    ) -> ApiResult<Conflict> {
        let conflict = self
            .conflict_repo
            .find_by_id(conflict_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Conflict (id={})", conflict_id)))?;

        if conflict.severity != ConflictSeverity::Error {
            return Err(ApiError::ForceResolveNotAllowed {
                severity: conflict.severity,
            });
        }

        self.conflict_repo
            .mark_force_resolved(conflict_id, &actor.name, notes, self.clock.now())?;

        self.log_resolution(&conflict, ActionKind::ForceResolveConflict, actor)?;
        self.recheck_blocking(&conflict.plan_id)?;

        self.conflict_repo
            .find_by_id(conflict_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Conflict (id={})", conflict_id)))
    }

    fn log_resolution(
        &self,
        conflict: &Conflict,
        action: ActionKind,
        actor: &Actor,
    ) -> ApiResult<()> {
        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: Some(conflict.plan_id.clone()),
            action,
            actor: actor.name.clone(),
            detail: Some(conflict.kind.to_string()),
            payload_json: Some(json!({ "conflict_id": conflict.conflict_id })),
            created_at: self.clock.now(),
        })?;
        Ok(())
    }

    /// Revérification informative de l'état bloquant du planning après
    /// résolution; ne déclenche aucune transition.
    fn recheck_blocking(&self, plan_id: &str) -> ApiResult<()> {
        let still_blocking = self.conflict_repo.has_blocking(plan_id)?;
        info!(plan_id, still_blocking, "état bloquant revérifié");
        Ok(())
    }
}
