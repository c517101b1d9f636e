// ==========================================
// Tests d'intégration - Couche repository
// ==========================================
// Unicité (site, date), verrou optimiste sur le statut, rapprochement
// des conflits et purge en cascade.
// ==========================================


use bloc_planning::domain::planning::ConflictDraft;
use bloc_planning::domain::types::{
    ConflictSeverity, ConflictType, Period, PlanStatus, RoomKind, StaffRole,
};
use bloc_planning::repository::RepositoryError;
use test_helpers::*;

#[test]
fn test_find_or_create_is_stable_per_site_and_date() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_site(&ctx, "site-2");

    let first = create_draft_plan(&ctx, "site-1");
    let second = create_draft_plan(&ctx, "site-1");
    // Même (site, date): même planning.
    assert_eq!(first.plan_id, second.plan_id);

    // Autre site: planning distinct.
    let other = create_draft_plan(&ctx, "site-2");
    assert_ne!(first.plan_id, other.plan_id);
}

#[test]
fn test_optimistic_lock_on_status_update() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    let plan = create_draft_plan(&ctx, "site-1");
    let now = test_date().and_hms_opt(10, 0, 0).unwrap();

    // Première mise à jour avec la bonne revision.
    ctx.state
        .day_plan_repo
        .update_status(&plan.plan_id, PlanStatus::Validated, plan.revision, now)
        .unwrap();

    // Rejouer avec la revision périmée échoue.
    let stale = ctx
        .state
        .day_plan_repo
        .update_status(&plan.plan_id, PlanStatus::Draft, plan.revision, now);
    match stale {
        Err(RepositoryError::OptimisticLockFailure {
            expected, actual, ..
        }) => {
            assert_eq!(expected, plan.revision);
            assert_eq!(actual, plan.revision + 1);
        }
        other => panic!("OptimisticLockFailure attendue, reçu {:?}", other),
    }

    // Planning inexistant: NotFound.
    let missing = ctx
        .state
        .day_plan_repo
        .update_status("inexistant", PlanStatus::Draft, 0, now);
    assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
}

#[test]
fn test_conflict_reconciliation_preserves_matching_rows() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    let plan = create_draft_plan(&ctx, "site-1");
    let assignment = add_room_assignment(&ctx, &plan, "r1", Period::Morning, None);
    let now = test_date().and_hms_opt(10, 0, 0).unwrap();

    let draft = |kind: ConflictType| ConflictDraft {
        kind,
        severity: ConflictSeverity::Error,
        message: "test".into(),
        assignment_id: Some(assignment.assignment_id.clone()),
        staff_assignment_id: None,
        staff_id: None,
        surgeon_id: None,
    };

    // Première passe: deux conflits.
    ctx.state
        .conflict_repo
        .reconcile(
            &plan.plan_id,
            &[
                draft(ConflictType::MissingMarForSurgeon),
                draft(ConflictType::MissingAnesthesiaStaff),
            ],
            now,
        )
        .unwrap();
    let first = ctx.state.conflict_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(first.len(), 2);

    // Seconde passe: un conflit disparaît, un nouveau apparaît.
    ctx.state
        .conflict_repo
        .reconcile(
            &plan.plan_id,
            &[
                draft(ConflictType::MissingMarForSurgeon),
                draft(ConflictType::InsufficientIadeCount),
            ],
            now,
        )
        .unwrap();
    let second = ctx.state.conflict_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(second.len(), 2);

    // Le conflit conservé garde sa ligne d'origine.
    let kept_before = first
        .iter()
        .find(|c| c.kind == ConflictType::MissingMarForSurgeon)
        .unwrap();
    let kept_after = second
        .iter()
        .find(|c| c.kind == ConflictType::MissingMarForSurgeon)
        .unwrap();
    assert_eq!(kept_before.conflict_id, kept_after.conflict_id);

    // Le périmé a disparu.
    assert!(!second
        .iter()
        .any(|c| c.kind == ConflictType::MissingAnesthesiaStaff));
}

#[test]
fn test_reconciliation_spares_generator_conflicts() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    let plan = create_draft_plan(&ctx, "site-1");
    let now = test_date().and_hms_opt(10, 0, 0).unwrap();

    // Avertissement posé par le générateur.
    ctx.state
        .conflict_repo
        .insert_drafts(
            &plan.plan_id,
            &[ConflictDraft {
                kind: ConflictType::TrameOverlapWarning,
                severity: ConflictSeverity::Warning,
                message: "collision".into(),
                assignment_id: None,
                staff_assignment_id: None,
                staff_id: None,
                surgeon_id: None,
            }],
            now,
        )
        .unwrap();

    // Une passe de règles vide ne doit pas le supprimer.
    ctx.state
        .conflict_repo
        .reconcile(&plan.plan_id, &[], now)
        .unwrap();

    let conflicts = ctx.state.conflict_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictType::TrameOverlapWarning);
}

#[test]
fn test_duplicate_drafts_tolerated() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    let plan = create_draft_plan(&ctx, "site-1");
    let now = test_date().and_hms_opt(10, 0, 0).unwrap();

    let draft = ConflictDraft {
        kind: ConflictType::StaffIncompatibility,
        severity: ConflictSeverity::Error,
        message: "doublon".into(),
        assignment_id: None,
        staff_assignment_id: None,
        staff_id: Some("i-1".into()),
        surgeon_id: None,
    };

    // Le même conflit émis deux fois (contrôle par paires) ne crée
    // qu'une ligne.
    ctx.state
        .conflict_repo
        .reconcile(&plan.plan_id, &[draft.clone(), draft], now)
        .unwrap();

    let conflicts = ctx.state.conflict_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(conflicts.len(), 1);
}

#[test]
fn test_clear_for_plan_removes_staff_then_rooms() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "iade-1", StaffRole::Iade);

    let plan = create_draft_plan(&ctx, "site-1");
    let assignment = add_room_assignment(&ctx, &plan, "r1", Period::Morning, None);
    add_staff(&ctx, &assignment, "iade-1", StaffRole::Iade, false);

    ctx.assignment_repo.clear_for_plan(&plan.plan_id).unwrap();

    assert!(ctx
        .assignment_repo
        .list_by_plan(&plan.plan_id)
        .unwrap()
        .is_empty());
    assert!(ctx
        .assignment_repo
        .list_staff_by_plan(&plan.plan_id)
        .unwrap()
        .is_empty());
}
