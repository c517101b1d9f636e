// ==========================================
// Tests d'intégration - Génération depuis les trames
// ==========================================
// Expansion d'une plage de dates: correspondance jour/parité, politique
// première-trame-gagnante, exclusion des absents, plannings non-DRAFT
// intacts, régénération.
// ==========================================


use bloc_planning::api::{Actor, ApiError};
use bloc_planning::domain::personnel::PersonRef;
use bloc_planning::domain::types::{
    ActorRole, ConflictType, Period, PlanStatus, RoomKind, StaffRole, WeekDay, WeekParity,
};
use test_helpers::*;

fn admin() -> Actor {
    Actor::new("admin", ActorRole::AdminTotal)
}

#[test]
fn test_generate_week_creates_draft_plans() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_trame(&ctx, "t1", "site-1");
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-1", StaffRole::Mar, true)),
    );

    // Lundi -> dimanche.
    let end = test_date() + chrono::Duration::days(6);
    let plans = ctx
        .state
        .generation_api
        .generate_day_plans("site-1", test_date(), end, &["t1".into()], &admin())
        .unwrap();

    assert_eq!(plans.len(), 7);
    assert!(plans.iter().all(|p| p.status == PlanStatus::Draft));

    // Seul le lundi reçoit l'affectation.
    let monday_plan = &plans[0];
    let assignments = ctx
        .assignment_repo
        .list_by_plan(&monday_plan.plan_id)
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].room_id, "r1");
    assert_eq!(
        assignments[0].source_affectation_id.as_deref(),
        Some("aff-1")
    );

    for plan in &plans[1..] {
        assert!(ctx
            .assignment_repo
            .list_by_plan(&plan.plan_id)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_template_collision_first_wins() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_staff(&ctx, "mar-2", StaffRole::Mar);
    seed_trame(&ctx, "t1", "site-1");
    seed_trame(&ctx, "t2", "site-1");
    // Les deux trames visent (r1, MORNING) le même lundi.
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-1", StaffRole::Mar, true)),
    );
    seed_affectation(
        &ctx,
        "aff-2",
        "t2",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-2", StaffRole::Mar, true)),
    );

    let plans = ctx
        .state
        .generation_api
        .generate_day_plans(
            "site-1",
            test_date(),
            test_date(),
            &["t1".into(), "t2".into()],
            &admin(),
        )
        .unwrap();
    assert_eq!(plans.len(), 1);
    let plan = &plans[0];

    // Exactement une occupation, issue de la première trame.
    let assignments = ctx.assignment_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(
        assignments[0].source_affectation_id.as_deref(),
        Some("aff-1")
    );
    let staff = ctx
        .assignment_repo
        .list_staff_by_plan(&plan.plan_id)
        .unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].staff_id, "mar-1");

    // Et un avertissement de collision rattaché au créneau gagnant.
    let conflicts = ctx.state.conflict_repo.list_by_plan(&plan.plan_id).unwrap();
    let overlaps: Vec<_> = conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::TrameOverlapWarning)
        .collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(
        overlaps[0].assignment_id.as_deref(),
        Some(assignments[0].assignment_id.as_str())
    );
    // La collision est un avertissement, pas une erreur.
    assert!(plans[0].status == PlanStatus::Draft);
}

#[test]
fn test_week_parity_filters_dates() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_trame(&ctx, "t1", "site-1");
    // Affectation des lundis de semaines paires uniquement.
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::Even,
        Period::Morning,
        None,
        None,
    );

    // Deux lundis consécutifs: semaine ISO 11 (impaire) puis 12 (paire).
    let next_monday = test_date() + chrono::Duration::days(7);
    let plans = ctx
        .state
        .generation_api
        .generate_day_plans("site-1", test_date(), next_monday, &["t1".into()], &admin())
        .unwrap();

    let first = ctx.assignment_repo.list_by_plan(&plans[0].plan_id).unwrap();
    let last = ctx
        .assignment_repo
        .list_by_plan(&plans[7].plan_id)
        .unwrap();
    assert!(first.is_empty());
    assert_eq!(last.len(), 1);
}

#[test]
fn test_absent_personnel_excluded_from_generation() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_absence(
        &ctx,
        PersonRef::Staff("mar-1".into()),
        test_date(),
        test_date(),
    );
    seed_trame(&ctx, "t1", "site-1");
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-1", StaffRole::Mar, true)),
    );

    let plans = ctx
        .state
        .generation_api
        .generate_day_plans("site-1", test_date(), test_date(), &["t1".into()], &admin())
        .unwrap();

    // Personne absente: rien n'est matérialisé, et aucun conflit
    // d'absence ne peut donc apparaître.
    let assignments = ctx.assignment_repo.list_by_plan(&plans[0].plan_id).unwrap();
    assert!(assignments.is_empty());
    let conflicts = ctx
        .state
        .conflict_repo
        .list_by_plan(&plans[0].plan_id)
        .unwrap();
    assert!(conflicts.is_empty());
}

#[test]
fn test_non_draft_plan_left_untouched() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_trame(&ctx, "t1", "site-1");
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-1", StaffRole::Mar, true)),
    );

    // Planning existant, promu VALIDATED, avec un contenu manuel.
    let plan = create_draft_plan(&ctx, "site-1");
    let manual = add_room_assignment(&ctx, &plan, "r1", Period::Afternoon, None);
    force_status(&ctx, &plan, PlanStatus::Validated);

    let plans = ctx
        .state
        .generation_api
        .generate_day_plans("site-1", test_date(), test_date(), &["t1".into()], &admin())
        .unwrap();

    // Inclus dans le résultat, mais jamais régénéré.
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].status, PlanStatus::Validated);
    let assignments = ctx.assignment_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].assignment_id, manual.assignment_id);
}

#[test]
fn test_regeneration_replaces_draft_content() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_room(&ctx, "r2", None, 2, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_trame(&ctx, "t1", "site-1");
    seed_affectation(
        &ctx,
        "aff-1",
        "t1",
        "r1",
        WeekDay::Monday,
        WeekParity::All,
        Period::Morning,
        None,
        Some(("mar-1", StaffRole::Mar, true)),
    );

    // Contenu manuel préalable sur le planning DRAFT.
    let plan = create_draft_plan(&ctx, "site-1");
    add_room_assignment(&ctx, &plan, "r2", Period::Afternoon, None);

    let generate = || {
        ctx.state
            .generation_api
            .generate_day_plans("site-1", test_date(), test_date(), &["t1".into()], &admin())
            .unwrap()
    };

    generate();
    let assignments = ctx.assignment_repo.list_by_plan(&plan.plan_id).unwrap();
    // Le contenu manuel a été purgé, remplacé par la trame.
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].room_id, "r1");

    // Régénérer une seconde fois est stable.
    generate();
    let again = ctx.assignment_repo.list_by_plan(&plan.plan_id).unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].room_id, "r1");
}

#[test]
fn test_generation_rejects_bad_input() {
    let ctx = setup();
    seed_site(&ctx, "site-1");

    // Plage inversée.
    let result = ctx.state.generation_api.generate_day_plans(
        "site-1",
        test_date(),
        test_date() - chrono::Duration::days(1),
        &["t1".into()],
        &admin(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    // Aucune trame active.
    let result = ctx.state.generation_api.generate_day_plans(
        "site-1",
        test_date(),
        test_date(),
        &["inexistante".into()],
        &admin(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
