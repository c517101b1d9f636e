// ==========================================
// Planification bloc opératoire - Expansion des trames
// ==========================================
// Rôle: matérialiser, pour une date donnée, les affectations récurrentes
// des trames retenues. Calcul pur: la persistance (création du planning,
// purge, insertion) appartient à la couche API.
// Politique de collision: première trame gagnante; les suivantes sur un
// créneau (salle, période) occupé produisent un avertissement.
// Les personnes sous absence approuvée ne sont jamais matérialisées.
// ==========================================

use crate::domain::personnel::{Absence, PersonRef};
use crate::domain::trame::TrameWithAffectations;
use crate::domain::types::{Period, StaffRole};
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// Sorties d'expansion
// ==========================================

/// Personnel à matérialiser dans un créneau.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSlot {
    pub staff_id: String,
    pub role: StaffRole,
    pub is_primary_anesthetist: bool,
}

/// Créneau de salle à matérialiser.
#[derive(Debug, Clone)]
pub struct RoomSlot {
    pub room_id: String,
    pub period: Period,
    pub surgeon_id: Option<String>,
    pub expected_specialty: Option<String>,
    pub source_affectation_id: String,
    pub staff: Option<StaffSlot>,
}

/// Collision de trames sur un créneau déjà occupé.
#[derive(Debug, Clone)]
pub struct TrameOverlap {
    /// Index du créneau gagnant dans `slots`.
    pub winning_slot: usize,
    /// Trame dont l'affectation a été ignorée.
    pub losing_trame_id: String,
    pub losing_trame_name: String,
    pub room_id: String,
    pub period: Period,
}

/// Résultat d'expansion pour une date.
#[derive(Debug, Clone, Default)]
pub struct DayExpansion {
    pub slots: Vec<RoomSlot>,
    pub overlaps: Vec<TrameOverlap>,
}

// ==========================================
// TrameExpansionEngine
// ==========================================
pub struct TrameExpansionEngine;

impl TrameExpansionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Développe les trames pour une date.
    ///
    /// # Paramètres
    /// - `trames`: trames à appliquer, dans l'ordre de priorité
    /// - `date`: date cible
    /// - `absences`: absences (seules les approuvées couvrant la date
    ///   sont opposables)
    pub fn expand_for_date(
        &self,
        trames: &[TrameWithAffectations],
        date: NaiveDate,
        absences: &[Absence],
    ) -> DayExpansion {
        let is_absent =
            |person: &PersonRef| absences.iter().any(|a| &a.person == person && a.binds_on(date));

        let mut expansion = DayExpansion::default();
        // (salle, période) -> index du créneau gagnant
        let mut occupied: HashMap<(String, Period), usize> = HashMap::new();

        for trame in trames {
            if !trame.trame.applies_on(date) {
                continue;
            }

            for affectation in &trame.affectations {
                if !affectation.matches(date) {
                    continue;
                }

                // Exclusion des personnes absentes
                let surgeon_id = affectation.surgeon_id.clone().filter(|id| {
                    !is_absent(&PersonRef::Surgeon(id.clone()))
                });
                let staff = match (&affectation.staff_id, affectation.staff_role) {
                    (Some(staff_id), Some(role))
                        if !is_absent(&PersonRef::Staff(staff_id.clone())) =>
                    {
                        Some(StaffSlot {
                            staff_id: staff_id.clone(),
                            role,
                            is_primary_anesthetist: affectation.is_primary_anesthetist,
                        })
                    }
                    _ => None,
                };

                // Une affectation qui nommait des personnes toutes absentes
                // n'est pas matérialisée.
                let named_someone =
                    affectation.surgeon_id.is_some() || affectation.staff_id.is_some();
                if named_someone && surgeon_id.is_none() && staff.is_none() {
                    continue;
                }

                let key = (affectation.room_id.clone(), affectation.period);
                if let Some(&winning_slot) = occupied.get(&key) {
                    // Créneau déjà pris: première trame gagnante.
                    expansion.overlaps.push(TrameOverlap {
                        winning_slot,
                        losing_trame_id: trame.trame.trame_id.clone(),
                        losing_trame_name: trame.trame.name.clone(),
                        room_id: affectation.room_id.clone(),
                        period: affectation.period,
                    });
                    continue;
                }

                expansion.slots.push(RoomSlot {
                    room_id: affectation.room_id.clone(),
                    period: affectation.period,
                    surgeon_id,
                    expected_specialty: affectation.expected_specialty.clone(),
                    source_affectation_id: affectation.affectation_id.clone(),
                    staff,
                });
                occupied.insert(key, expansion.slots.len() - 1);
            }
        }

        expansion
    }
}

impl Default for TrameExpansionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::personnel::Absence;
    use crate::domain::trame::{TrameAffectation, TrameModele};
    use crate::domain::types::{AbsenceStatus, WeekDay, WeekParity};

    // Lundi, semaine ISO 11 (impaire).
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn trame(id: &str, name: &str) -> TrameModele {
        TrameModele {
            trame_id: id.into(),
            site_id: "site-1".into(),
            name: name.into(),
            week_parity: WeekParity::All,
            is_active: true,
            effective_from: None,
            effective_until: None,
        }
    }

    fn affectation(id: &str, trame_id: &str, room_id: &str, period: Period) -> TrameAffectation {
        TrameAffectation {
            affectation_id: id.into(),
            trame_id: trame_id.into(),
            day_of_week: WeekDay::Monday,
            week_parity: WeekParity::All,
            period,
            room_id: room_id.into(),
            surgeon_id: None,
            staff_id: None,
            staff_role: None,
            is_primary_anesthetist: false,
            expected_specialty: None,
            is_active: true,
        }
    }

    fn with_staff(mut aff: TrameAffectation, staff_id: &str, role: StaffRole) -> TrameAffectation {
        aff.staff_id = Some(staff_id.into());
        aff.staff_role = Some(role);
        aff.is_primary_anesthetist = role == StaffRole::Mar;
        aff
    }

    fn approved_absence(person: PersonRef, date: NaiveDate) -> Absence {
        Absence {
            absence_id: "abs-1".into(),
            person,
            start_date: date,
            end_date: date,
            status: AbsenceStatus::Approved,
            reason: None,
        }
    }

    #[test]
    fn test_matching_affectation_materialized() {
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![with_staff(
                affectation("a1", "t1", "r1", Period::Morning),
                "m1",
                StaffRole::Mar,
            )],
        };

        let expansion = TrameExpansionEngine::new().expand_for_date(&[t], monday(), &[]);
        assert_eq!(expansion.slots.len(), 1);
        assert!(expansion.overlaps.is_empty());
        let slot = &expansion.slots[0];
        assert_eq!(slot.room_id, "r1");
        assert_eq!(
            slot.staff,
            Some(StaffSlot {
                staff_id: "m1".into(),
                role: StaffRole::Mar,
                is_primary_anesthetist: true,
            })
        );
    }

    #[test]
    fn test_wrong_day_not_materialized() {
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![affectation("a1", "t1", "r1", Period::Morning)],
        };

        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let expansion = TrameExpansionEngine::new().expand_for_date(&[t], tuesday, &[]);
        assert!(expansion.slots.is_empty());
    }

    #[test]
    fn test_parity_filter() {
        let mut aff = affectation("a1", "t1", "r1", Period::Morning);
        aff.week_parity = WeekParity::Even;
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![aff],
        };

        // Semaine impaire: rien.
        let engine = TrameExpansionEngine::new();
        assert!(engine.expand_for_date(&[t.clone()], monday(), &[]).slots.is_empty());

        // Lundi suivant, semaine ISO 12 (paire): matérialisé.
        let next_monday = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(engine.expand_for_date(&[t], next_monday, &[]).slots.len(), 1);
    }

    #[test]
    fn test_first_trame_wins_collision() {
        let first = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![with_staff(
                affectation("a1", "t1", "r1", Period::Morning),
                "m1",
                StaffRole::Mar,
            )],
        };
        let second = TrameWithAffectations {
            trame: trame("t2", "Trame B"),
            affectations: vec![with_staff(
                affectation("a2", "t2", "r1", Period::Morning),
                "m2",
                StaffRole::Mar,
            )],
        };

        let expansion =
            TrameExpansionEngine::new().expand_for_date(&[first, second], monday(), &[]);
        // Exactement un créneau, venant de la première trame.
        assert_eq!(expansion.slots.len(), 1);
        assert_eq!(expansion.slots[0].source_affectation_id, "a1");
        // Et un avertissement de collision pour la seconde.
        assert_eq!(expansion.overlaps.len(), 1);
        assert_eq!(expansion.overlaps[0].losing_trame_id, "t2");
        assert_eq!(expansion.overlaps[0].winning_slot, 0);
    }

    #[test]
    fn test_absent_staff_not_materialized() {
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![with_staff(
                affectation("a1", "t1", "r1", Period::Morning),
                "m1",
                StaffRole::Mar,
            )],
        };
        let absences = vec![approved_absence(PersonRef::Staff("m1".into()), monday())];

        let expansion = TrameExpansionEngine::new().expand_for_date(&[t], monday(), &absences);
        // L'affectation ne nommait que du personnel absent: rien.
        assert!(expansion.slots.is_empty());
        assert!(expansion.overlaps.is_empty());
    }

    #[test]
    fn test_absent_surgeon_drops_only_surgeon() {
        let mut aff = with_staff(affectation("a1", "t1", "r1", Period::Morning), "m1", StaffRole::Mar);
        aff.surgeon_id = Some("c1".into());
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![aff],
        };
        let absences = vec![approved_absence(PersonRef::Surgeon("c1".into()), monday())];

        let expansion = TrameExpansionEngine::new().expand_for_date(&[t], monday(), &absences);
        assert_eq!(expansion.slots.len(), 1);
        assert_eq!(expansion.slots[0].surgeon_id, None);
        assert!(expansion.slots[0].staff.is_some());
    }

    #[test]
    fn test_no_collision_for_absent_personnel() {
        // La première trame nomme une personne absente: son créneau n'est
        // pas matérialisé et la seconde trame prend la salle sans
        // avertissement.
        let first = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![with_staff(
                affectation("a1", "t1", "r1", Period::Morning),
                "m1",
                StaffRole::Mar,
            )],
        };
        let second = TrameWithAffectations {
            trame: trame("t2", "Trame B"),
            affectations: vec![with_staff(
                affectation("a2", "t2", "r1", Period::Morning),
                "m2",
                StaffRole::Mar,
            )],
        };
        let absences = vec![approved_absence(PersonRef::Staff("m1".into()), monday())];

        let expansion =
            TrameExpansionEngine::new().expand_for_date(&[first, second], monday(), &absences);
        assert_eq!(expansion.slots.len(), 1);
        assert_eq!(expansion.slots[0].source_affectation_id, "a2");
        assert!(expansion.overlaps.is_empty());
    }

    #[test]
    fn test_empty_room_reservation_materialized() {
        // Affectation sans personne nommée: la salle est réservée.
        let t = TrameWithAffectations {
            trame: trame("t1", "Trame A"),
            affectations: vec![affectation("a1", "t1", "r1", Period::AllDay)],
        };

        let expansion = TrameExpansionEngine::new().expand_for_date(&[t], monday(), &[]);
        assert_eq!(expansion.slots.len(), 1);
        assert!(expansion.slots[0].staff.is_none());
        assert!(expansion.slots[0].surgeon_id.is_none());
    }
}
