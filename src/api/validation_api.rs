// ==========================================
// Planification bloc opératoire - API de validation
// ==========================================
// Rôle: charger l'instantané complet d'un planning, exécuter la
// bibliothèque de règles, rapprocher les conflits persistés et
// recalculer la validité.
// Idempotence: deux passes consécutives sur un planning inchangé
// produisent le même jeu de conflits (types, cibles, sévérités), les
// métadonnées de résolution étant conservées par le rapprochement.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::clock::Clock;
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionKind, ActionLog};
use crate::domain::personnel::{PersonRef, StaffMember, Surgeon};
use crate::domain::planning::{DayPlan, ValidationOutcome};
use crate::domain::sites::{OperatingRoom, Sector};
use crate::domain::snapshot::{PlanningSnapshot, RoomAssignmentView, StaffAssignmentView};
use crate::engine::ValidationEngine;
use crate::repository::{
    AbsenceRepository, ActionLogRepository, ConflictRepository, DayPlanRepository,
    IncompatibilityRepository, OperatingRoomRepository, RoomAssignmentRepository,
    SectorRepository, StaffMemberRepository, SurgeonRepository,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct ValidationApi {
    day_plan_repo: Arc<DayPlanRepository>,
    assignment_repo: Arc<RoomAssignmentRepository>,
    conflict_repo: Arc<ConflictRepository>,
    room_repo: Arc<OperatingRoomRepository>,
    sector_repo: Arc<SectorRepository>,
    staff_repo: Arc<StaffMemberRepository>,
    surgeon_repo: Arc<SurgeonRepository>,
    absence_repo: Arc<AbsenceRepository>,
    incompatibility_repo: Arc<IncompatibilityRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
    engine: Arc<ValidationEngine>,
    clock: Arc<dyn Clock>,
}

impl ValidationApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        day_plan_repo: Arc<DayPlanRepository>,
        assignment_repo: Arc<RoomAssignmentRepository>,
        conflict_repo: Arc<ConflictRepository>,
        room_repo: Arc<OperatingRoomRepository>,
        sector_repo: Arc<SectorRepository>,
        staff_repo: Arc<StaffMemberRepository>,
        surgeon_repo: Arc<SurgeonRepository>,
        absence_repo: Arc<AbsenceRepository>,
        incompatibility_repo: Arc<IncompatibilityRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
        engine: Arc<ValidationEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            day_plan_repo,
            assignment_repo,
            conflict_repo,
            room_repo,
            sector_repo,
            staff_repo,
            surgeon_repo,
            absence_repo,
            incompatibility_repo,
            action_log_repo,
            config_manager,
            engine,
            clock,
        }
    }

    /// Valide un planning journalier.
    ///
    /// 1. Charge l'instantané complet (relations résolues)
    /// 2. Exécute toutes les règles sur ce même instantané
    /// 3. Rapproche les conflits persistés (clé type + cibles), sauf si
    ///    le statut interdit toute mutation (VALIDATED/LOCKED/ARCHIVED)
    /// 4. Relit l'ensemble courant et recalcule la validité
    ///
    /// # Erreurs
    /// - `NotFound`: planning inexistant
    #[instrument(skip(self))]
    pub fn validate_day_plan(&self, plan_id: &str) -> ApiResult<ValidationOutcome> {
        let plan = self
            .day_plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("DayPlan (id={})", plan_id)))?;

        let snapshot = self.load_snapshot(&plan)?;
        let drafts = self.engine.evaluate(&snapshot);

        if plan.status.is_frozen() {
            // Statut gelé: passe en lecture seule, l'état persisté fait foi.
            warn!(
                plan_id,
                status = %plan.status,
                "validation en lecture seule (statut gelé)"
            );
        } else {
            self.conflict_repo
                .reconcile(plan_id, &drafts, self.clock.now())?;
        }

        let conflicts = self.conflict_repo.list_by_plan(plan_id)?;
        let is_valid = !conflicts.iter().any(|c| c.is_blocking());

        self.action_log_repo.append(&ActionLog {
            action_id: Uuid::new_v4().to_string(),
            plan_id: Some(plan_id.to_string()),
            action: ActionKind::ValidatePlan,
            actor: "system".to_string(),
            detail: Some(format!(
                "{} conflit(s), valide={}",
                conflicts.len(),
                is_valid
            )),
            payload_json: Some(json!({ "draft_count": drafts.len() })),
            created_at: self.clock.now(),
        })?;

        info!(
            plan_id,
            conflicts = conflicts.len(),
            is_valid,
            "passe de validation terminée"
        );

        Ok(ValidationOutcome { is_valid, conflicts })
    }

    /// Charge la vue entièrement résolue d'un planning: occupations de
    /// salles avec secteur, chirurgien et personnel, absences opposables
    /// à la date, incompatibilités en vigueur et bornes de supervision.
    pub fn load_snapshot(&self, plan: &DayPlan) -> ApiResult<PlanningSnapshot> {
        let assignments = self.assignment_repo.list_by_plan(&plan.plan_id)?;

        // Mémoïsation des relations partagées entre salles.
        let mut rooms: HashMap<String, Option<OperatingRoom>> = HashMap::new();
        let mut sectors: HashMap<String, Option<Sector>> = HashMap::new();
        let mut staff_members: HashMap<String, Option<StaffMember>> = HashMap::new();
        let mut surgeons: HashMap<String, Option<Surgeon>> = HashMap::new();

        let mut views = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let room = match rooms.entry(assignment.room_id.clone()) {
                std::collections::hash_map::Entry::Occupied(e) => e.get().clone(),
                std::collections::hash_map::Entry::Vacant(e) => e
                    .insert(self.room_repo.find_by_id(&assignment.room_id)?)
                    .clone(),
            };

            let sector = match room.as_ref().and_then(|r| r.sector_id.clone()) {
                Some(sector_id) => match sectors.entry(sector_id.clone()) {
                    std::collections::hash_map::Entry::Occupied(e) => e.get().clone(),
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(self.sector_repo.find_by_id(&sector_id)?).clone()
                    }
                },
                None => None,
            };

            let surgeon = match assignment.surgeon_id.clone() {
                Some(surgeon_id) => match surgeons.entry(surgeon_id.clone()) {
                    std::collections::hash_map::Entry::Occupied(e) => e.get().clone(),
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(self.surgeon_repo.find_by_id(&surgeon_id)?).clone()
                    }
                },
                None => None,
            };

            let staff_assignments = self
                .assignment_repo
                .list_staff_by_assignment(&assignment.assignment_id)?;
            let mut staff = Vec::with_capacity(staff_assignments.len());
            for sa in staff_assignments {
                let member = match staff_members.entry(sa.staff_id.clone()) {
                    std::collections::hash_map::Entry::Occupied(e) => e.get().clone(),
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(self.staff_repo.find_by_id(&sa.staff_id)?).clone()
                    }
                };
                staff.push(StaffAssignmentView {
                    assignment: sa,
                    member,
                });
            }

            views.push(RoomAssignmentView {
                assignment,
                room,
                sector,
                surgeon,
                staff,
            });
        }

        let absent_persons: HashSet<PersonRef> = self
            .absence_repo
            .list_binding_on(plan.date)?
            .into_iter()
            .map(|a| a.person)
            .collect();

        let incompatibilities = self.incompatibility_repo.list_valid_on(plan.date)?;

        Ok(PlanningSnapshot {
            plan_id: plan.plan_id.clone(),
            site_id: plan.site_id.clone(),
            date: plan.date,
            status: plan.status,
            rooms: views,
            absent_persons,
            incompatibilities,
            limits: self.config_manager.supervision_limits(),
        })
    }
}
