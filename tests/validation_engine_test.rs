// ==========================================
// Tests d'intégration - Moteur de validation
// ==========================================
// Passe de validation complète sur base SQLite réelle: absences,
// doubles affectations, charge de supervision, contiguïté, idempotence
// et conservation des métadonnées de résolution.
// ==========================================


use bloc_planning::api::{Actor, ApiError};
use bloc_planning::domain::personnel::PersonRef;
use bloc_planning::domain::sites::SectorRules;
use bloc_planning::domain::types::{
    ActorRole, ConflictSeverity, ConflictType, Period, RoomKind, SectorCategory, StaffRole,
};
use test_helpers::*;

#[test]
fn test_validate_unknown_plan_is_not_found() {
    let ctx = setup();

    let result = ctx.state.validation_api.validate_day_plan("inexistant");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_empty_plan_is_valid() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    let plan = create_draft_plan(&ctx, "site-1");

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    assert!(outcome.is_valid);
    assert!(outcome.conflicts.is_empty());
}

#[test]
fn test_absent_personnel_detected() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_surgeon(&ctx, "chir-1");
    seed_absence(
        &ctx,
        PersonRef::Staff("mar-1".into()),
        test_date(),
        test_date(),
    );

    let plan = create_draft_plan(&ctx, "site-1");
    let assignment = add_room_assignment(&ctx, &plan, "r1", Period::Morning, Some("chir-1"));
    add_staff(&ctx, &assignment, "mar-1", StaffRole::Mar, true);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();

    assert!(!outcome.is_valid);
    let absents: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::PersonnelAbsent)
        .collect();
    assert_eq!(absents.len(), 1);
    assert_eq!(absents[0].severity, ConflictSeverity::Error);
    assert_eq!(absents[0].staff_id.as_deref(), Some("mar-1"));
}

#[test]
fn test_double_booking_severity_split() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_room(&ctx, "r2", None, 2, RoomKind::Standard);
    seed_room(&ctx, "r3", None, 3, RoomKind::Consultation);
    seed_staff(&ctx, "iade-1", StaffRole::Iade);

    // Deux salles opératoires: ERROR.
    let plan = create_draft_plan(&ctx, "site-1");
    let a1 = add_room_assignment(&ctx, &plan, "r1", Period::Morning, None);
    let a2 = add_room_assignment(&ctx, &plan, "r2", Period::Morning, None);
    add_staff(&ctx, &a1, "iade-1", StaffRole::Iade, false);
    add_staff(&ctx, &a2, "iade-1", StaffRole::Iade, false);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    let doubles: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::DoubleAffectationPersonnel)
        .collect();
    assert_eq!(doubles.len(), 2);
    assert!(doubles
        .iter()
        .all(|c| c.severity == ConflictSeverity::Error));
    assert!(!outcome.is_valid);

    // Salle opératoire + consultation: WARNING.
    let ctx2 = setup();
    seed_site(&ctx2, "site-1");
    seed_room(&ctx2, "r1", None, 1, RoomKind::Standard);
    seed_room(&ctx2, "r3", None, 3, RoomKind::Consultation);
    seed_staff(&ctx2, "iade-1", StaffRole::Iade);

    let plan2 = create_draft_plan(&ctx2, "site-1");
    let b1 = add_room_assignment(&ctx2, &plan2, "r1", Period::Morning, None);
    let b2 = add_room_assignment(&ctx2, &plan2, "r3", Period::Morning, None);
    add_staff(&ctx2, &b1, "iade-1", StaffRole::Iade, false);
    add_staff(&ctx2, &b2, "iade-1", StaffRole::Iade, false);

    let outcome2 = ctx2
        .state
        .validation_api
        .validate_day_plan(&plan2.plan_id)
        .unwrap();
    let doubles2: Vec<_> = outcome2
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::DoubleAffectationPersonnel)
        .collect();
    assert_eq!(doubles2.len(), 2);
    assert!(doubles2
        .iter()
        .all(|c| c.severity == ConflictSeverity::Warning));
    // Un avertissement seul ne bloque pas.
    assert!(outcome2.is_valid);
}

#[test]
fn test_supervision_boundary() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_sector(
        &ctx,
        "sec-std",
        "site-1",
        SectorCategory::Standard,
        SectorRules::default(),
    );
    for n in 1..=4 {
        seed_room(&ctx, &format!("r{}", n), Some("sec-std"), n, RoomKind::Standard);
    }
    seed_staff(&ctx, "mar-1", StaffRole::Mar);

    // 1 salle en principal + 2 supervisées: à la limite, aucun conflit.
    let plan = create_draft_plan(&ctx, "site-1");
    let a1 = add_room_assignment(&ctx, &plan, "r1", Period::Morning, None);
    let a2 = add_room_assignment(&ctx, &plan, "r2", Period::Morning, None);
    let a3 = add_room_assignment(&ctx, &plan, "r3", Period::Morning, None);
    add_staff(&ctx, &a1, "mar-1", StaffRole::Mar, true);
    add_staff(&ctx, &a2, "mar-1", StaffRole::Mar, false);
    add_staff(&ctx, &a3, "mar-1", StaffRole::Mar, false);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    assert!(outcome.is_valid, "conflits: {:?}", outcome.conflicts);
    assert!(outcome.conflicts.is_empty());

    // Une salle supervisée de plus: exactement un dépassement de budget.
    let a4 = add_room_assignment(&ctx, &plan, "r4", Period::Morning, None);
    add_staff(&ctx, &a4, "mar-1", StaffRole::Mar, false);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    assert!(!outcome.is_valid);
    let exceeded: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::MarExceedMaxSallesSupervisees)
        .collect();
    assert_eq!(exceeded.len(), 1);
    assert_eq!(exceeded[0].severity, ConflictSeverity::Error);
}

#[test]
fn test_contiguity_end_to_end() {
    // Salles "A" et "B" d'un secteur endoscopie exigeant la contiguïté,
    // non adjacentes, même MAR sur les deux en après-midi.
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_sector(
        &ctx,
        "sec-endo",
        "site-1",
        SectorCategory::Endoscopy,
        SectorRules {
            require_contiguous_rooms: true,
            contiguity_map: vec![],
            min_iade_per_room: None,
        },
    );
    // Numéros 1 et 3: non adjacents.
    seed_room(&ctx, "room-a", Some("sec-endo"), 1, RoomKind::Standard);
    seed_room(&ctx, "room-b", Some("sec-endo"), 3, RoomKind::Standard);
    seed_staff(&ctx, "mar-1", StaffRole::Mar);

    let plan = create_draft_plan(&ctx, "site-1");
    let a1 = add_room_assignment(&ctx, &plan, "room-a", Period::Afternoon, None);
    let a2 = add_room_assignment(&ctx, &plan, "room-b", Period::Afternoon, None);
    add_staff(&ctx, &a1, "mar-1", StaffRole::Mar, false);
    add_staff(&ctx, &a2, "mar-1", StaffRole::Mar, false);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();

    assert!(!outcome.is_valid);
    let violations: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::ContiguityViolation)
        .collect();
    // Un conflit ERROR par affectation de salle impliquée.
    assert_eq!(violations.len(), 2);
    assert!(violations
        .iter()
        .all(|c| c.severity == ConflictSeverity::Error));
    let targeted: std::collections::HashSet<_> = violations
        .iter()
        .filter_map(|c| c.assignment_id.clone())
        .collect();
    assert!(targeted.contains(&a1.assignment_id));
    assert!(targeted.contains(&a2.assignment_id));
}

#[test]
fn test_revalidation_is_idempotent() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_surgeon(&ctx, "chir-1");

    // Chirurgien sans personnel: MISSING_MAR + MISSING_ANESTHESIA.
    let plan = create_draft_plan(&ctx, "site-1");
    add_room_assignment(&ctx, &plan, "r1", Period::Morning, Some("chir-1"));

    let first = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    let second = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();

    // Mêmes types/cibles/sévérités, et mêmes lignes conservées (le
    // rapprochement ne recrée pas les conflits inchangés).
    let ids = |conflicts: &[bloc_planning::Conflict]| -> std::collections::BTreeSet<String> {
        conflicts.iter().map(|c| c.conflict_id.clone()).collect()
    };
    assert_eq!(first.conflicts.len(), second.conflicts.len());
    assert_eq!(ids(&first.conflicts), ids(&second.conflicts));
    assert!(!second.is_valid);
}

#[test]
fn test_resolution_metadata_survives_revalidation() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_surgeon(&ctx, "chir-1");

    let plan = create_draft_plan(&ctx, "site-1");
    add_room_assignment(&ctx, &plan, "r1", Period::Morning, Some("chir-1"));

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    let target = outcome
        .conflicts
        .iter()
        .find(|c| c.kind == ConflictType::MissingMarForSurgeon)
        .unwrap();

    let actor = Actor::new("dr-admin", ActorRole::AdminTotal);
    ctx.state
        .planning_api
        .resolve_conflict(&target.conflict_id, Some("vu avec l'équipe"), &actor)
        .unwrap();

    // La revalidation ne doit pas perdre l'état de résolution.
    let after = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    let kept = after
        .conflicts
        .iter()
        .find(|c| c.conflict_id == target.conflict_id)
        .expect("conflit conservé");
    assert!(kept.is_resolved);
    assert_eq!(kept.resolved_by.as_deref(), Some("dr-admin"));
    assert_eq!(kept.resolution_notes.as_deref(), Some("vu avec l'équipe"));
}

#[test]
fn test_incompatibility_detected_between_rooms() {
    let ctx = setup();
    seed_site(&ctx, "site-1");
    seed_room(&ctx, "r1", None, 1, RoomKind::Standard);
    seed_room(&ctx, "r2", None, 2, RoomKind::Standard);
    seed_surgeon(&ctx, "chir-1");
    seed_surgeon(&ctx, "chir-2");
    seed_staff(&ctx, "mar-1", StaffRole::Mar);
    seed_staff(&ctx, "mar-2", StaffRole::Mar);
    seed_incompatibility(
        &ctx,
        PersonRef::Surgeon("chir-1".into()),
        PersonRef::Surgeon("chir-2".into()),
        bloc_planning::IncompatibilityLevel::Blocking,
    );

    let plan = create_draft_plan(&ctx, "site-1");
    let a1 = add_room_assignment(&ctx, &plan, "r1", Period::Morning, Some("chir-1"));
    let a2 = add_room_assignment(&ctx, &plan, "r2", Period::Morning, Some("chir-2"));
    add_staff(&ctx, &a1, "mar-1", StaffRole::Mar, true);
    add_staff(&ctx, &a2, "mar-2", StaffRole::Mar, true);

    let outcome = ctx
        .state
        .validation_api
        .validate_day_plan(&plan.plan_id)
        .unwrap();
    let incompat: Vec<_> = outcome
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictType::SurgeonIncompatibility)
        .collect();
    assert_eq!(incompat.len(), 2);
    assert!(!outcome.is_valid);
}
