// ==========================================
// Planification bloc opératoire - Trames récurrentes
// ==========================================
// Une trame est un motif d'affectations récurrent, appliqué sur une plage
// de dates selon (jour de semaine, parité de semaine ISO, période).
// ==========================================

use crate::domain::types::{Period, StaffRole, WeekDay, WeekParity};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ==========================================
// TrameModele - Trame récurrente
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrameModele {
    pub trame_id: String,                  // ID de la trame
    pub site_id: String,                   // Site d'application
    pub name: String,                      // Nom
    pub week_parity: WeekParity,           // Parité par défaut de la trame
    pub is_active: bool,                   // Trame active
    pub effective_from: Option<NaiveDate>, // Début d'effet (inclus)
    pub effective_until: Option<NaiveDate>,// Fin d'effet (incluse)
}

impl TrameModele {
    /// La trame est-elle applicable à cette date (activité, fenêtre
    /// d'effet, parité de la trame) ?
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.effective_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.effective_until {
            if date > until {
                return false;
            }
        }
        self.week_parity.admits(date.iso_week().week())
    }
}

// ==========================================
// TrameAffectation - Affectation récurrente
// ==========================================
// Chaque affectation nomme une salle, et en option un chirurgien et/ou un
// membre du personnel avec son rôle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrameAffectation {
    pub affectation_id: String,             // ID
    pub trame_id: String,                   // Trame parente
    pub day_of_week: WeekDay,               // Jour de semaine ciblé
    pub week_parity: WeekParity,            // Parité propre à l'affectation
    pub period: Period,                     // Période ciblée
    pub room_id: String,                    // Salle ciblée
    pub surgeon_id: Option<String>,         // Chirurgien habituel
    pub staff_id: Option<String>,           // Personnel habituel
    pub staff_role: Option<StaffRole>,      // Rôle du personnel
    pub is_primary_anesthetist: bool,       // Anesthésiste principal
    pub expected_specialty: Option<String>, // Spécialité attendue
    pub is_active: bool,                    // Affectation active
}

impl TrameAffectation {
    /// L'affectation correspond-elle à cette date (jour + parité) ?
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.day_of_week == WeekDay::from_weekday(date.weekday())
            && self.week_parity.admits(date.iso_week().week())
    }
}

// ==========================================
// TrameWithAffectations - Trame chargée avec ses affectations
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrameWithAffectations {
    pub trame: TrameModele,
    pub affectations: Vec<TrameAffectation>,
}
