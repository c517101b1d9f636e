// Petit utilitaire de développement: alimente une base avec un jeu de
// données de démonstration (site, secteurs, salles, personnel, trame).
//
// Usage:
//   cargo run --bin seed_demo -- [db_path]
//
// Volontairement léger; n'écrase rien d'existant (IDs fixes, l'insertion
// échoue si le jeu est déjà présent).

use bloc_planning::db::{ensure_schema, open_sqlite_connection};
use bloc_planning::domain::sites::{OperatingRoom, Sector, SectorRules, Site};
use bloc_planning::domain::personnel::{StaffMember, Surgeon};
use bloc_planning::domain::trame::{TrameAffectation, TrameModele};
use bloc_planning::domain::types::{
    Period, RoomKind, SectorCategory, StaffRole, WeekDay, WeekParity,
};
use bloc_planning::repository::{
    OperatingRoomRepository, SectorRepository, SiteRepository, StaffMemberRepository,
    SurgeonRepository, TrameRepository,
};
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "bloc_planning.db".to_string());

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let site_repo = SiteRepository::new(conn.clone());
    let sector_repo = SectorRepository::new(conn.clone());
    let room_repo = OperatingRoomRepository::new(conn.clone());
    let staff_repo = StaffMemberRepository::new(conn.clone());
    let surgeon_repo = SurgeonRepository::new(conn.clone());
    let trame_repo = TrameRepository::new(conn);

    site_repo.create(&Site {
        site_id: "site-demo".into(),
        name: "Clinique de démonstration".into(),
        timezone: "Europe/Paris".into(),
        color_code: Some("#2255AA".into()),
        is_active: true,
    })?;

    sector_repo.create(&Sector {
        sector_id: "sec-bloc".into(),
        site_id: "site-demo".into(),
        name: "Bloc général".into(),
        category: SectorCategory::Standard,
        color_code: Some("#AA3344".into()),
        is_active: true,
        rules: SectorRules::default(),
    })?;

    sector_repo.create(&Sector {
        sector_id: "sec-endo".into(),
        site_id: "site-demo".into(),
        name: "Endoscopie".into(),
        category: SectorCategory::Endoscopy,
        color_code: Some("#33AA55".into()),
        is_active: true,
        rules: SectorRules {
            require_contiguous_rooms: true,
            contiguity_map: vec![],
            min_iade_per_room: Some(1),
        },
    })?;

    for (room_id, sector_id, name, number) in [
        ("room-1", "sec-bloc", "Salle 1", 1),
        ("room-2", "sec-bloc", "Salle 2", 2),
        ("room-3", "sec-endo", "Salle 3", 3),
        ("room-4", "sec-endo", "Salle 4", 4),
    ] {
        room_repo.create(&OperatingRoom {
            room_id: room_id.into(),
            sector_id: Some(sector_id.into()),
            name: name.into(),
            number,
            kind: RoomKind::Standard,
            is_active: true,
        })?;
    }

    staff_repo.create(&StaffMember {
        staff_id: "mar-1".into(),
        first_name: "Hélène".into(),
        last_name: "Caron".into(),
        role: StaffRole::Mar,
        can_supervise_ophtalmo: false,
        can_supervise_endo: true,
        is_active: true,
    })?;

    staff_repo.create(&StaffMember {
        staff_id: "iade-1".into(),
        first_name: "Marc".into(),
        last_name: "Lefèvre".into(),
        role: StaffRole::Iade,
        can_supervise_ophtalmo: false,
        can_supervise_endo: false,
        is_active: true,
    })?;

    surgeon_repo.create(&Surgeon {
        surgeon_id: "chir-1".into(),
        first_name: "Sophie".into(),
        last_name: "Nguyen".into(),
        specialty: Some("Viscéral".into()),
        is_active: true,
    })?;

    trame_repo.create(&TrameModele {
        trame_id: "trame-demo".into(),
        site_id: "site-demo".into(),
        name: "Trame hebdomadaire standard".into(),
        week_parity: WeekParity::All,
        is_active: true,
        effective_from: None,
        effective_until: None,
    })?;

    trame_repo.add_affectation(&TrameAffectation {
        affectation_id: "aff-1".into(),
        trame_id: "trame-demo".into(),
        day_of_week: WeekDay::Monday,
        week_parity: WeekParity::All,
        period: Period::Morning,
        room_id: "room-1".into(),
        surgeon_id: Some("chir-1".into()),
        staff_id: Some("mar-1".into()),
        staff_role: Some(StaffRole::Mar),
        is_primary_anesthetist: true,
        expected_specialty: Some("Viscéral".into()),
        is_active: true,
    })?;

    trame_repo.add_affectation(&TrameAffectation {
        affectation_id: "aff-2".into(),
        trame_id: "trame-demo".into(),
        day_of_week: WeekDay::Monday,
        week_parity: WeekParity::All,
        period: Period::Morning,
        room_id: "room-3".into(),
        surgeon_id: None,
        staff_id: Some("iade-1".into()),
        staff_role: Some(StaffRole::Iade),
        is_primary_anesthetist: false,
        expected_specialty: None,
        is_active: true,
    })?;

    println!("Jeu de démonstration inséré dans {}", db_path);
    Ok(())
}
