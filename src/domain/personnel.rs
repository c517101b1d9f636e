// ==========================================
// Planification bloc opératoire - Personnel et indisponibilités
// ==========================================
// Personnel d'anesthésie (MAR / IADE), chirurgiens, absences et
// incompatibilités entre personnes.
// ==========================================

use crate::domain::types::{AbsenceStatus, IncompatibilityLevel, StaffRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// StaffMember - Personnel d'anesthésie
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub staff_id: String,            // ID du membre
    pub first_name: String,          // Prénom
    pub last_name: String,           // Nom
    pub role: StaffRole,             // MAR ou IADE
    pub can_supervise_ophtalmo: bool,// Habilitation ophtalmologie
    pub can_supervise_endo: bool,    // Habilitation endoscopie
    pub is_active: bool,             // Membre actif
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==========================================
// Surgeon - Chirurgien
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surgeon {
    pub surgeon_id: String,          // ID du chirurgien
    pub first_name: String,          // Prénom
    pub last_name: String,           // Nom
    pub specialty: Option<String>,   // Spécialité
    pub is_active: bool,             // Chirurgien actif
}

impl Surgeon {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==========================================
// PersonRef - Référence typée vers une personne
// ==========================================
// Les absences et incompatibilités visent indifféremment un membre du
// personnel ou un chirurgien.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonRef {
    Staff(String),
    Surgeon(String),
}

impl PersonRef {
    pub fn kind_db_str(&self) -> &'static str {
        match self {
            PersonRef::Staff(_) => "STAFF",
            PersonRef::Surgeon(_) => "SURGEON",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PersonRef::Staff(id) | PersonRef::Surgeon(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: String) -> Option<Self> {
        match kind.to_uppercase().as_str() {
            "STAFF" => Some(PersonRef::Staff(id)),
            "SURGEON" => Some(PersonRef::Surgeon(id)),
            _ => None,
        }
    }
}

impl fmt::Display for PersonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind_db_str(), self.id())
    }
}

// ==========================================
// Absence - Indisponibilité d'une personne
// ==========================================
// Granularité journée entière, bornes incluses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Absence {
    pub absence_id: String,          // ID de l'absence
    pub person: PersonRef,           // Personne concernée
    pub start_date: NaiveDate,       // Premier jour (inclus)
    pub end_date: NaiveDate,         // Dernier jour (inclus)
    pub status: AbsenceStatus,       // Statut d'approbation
    pub reason: Option<String>,      // Motif
}

impl Absence {
    /// L'absence est-elle opposable à cette date ?
    /// Seules les absences approuvées sont opposables; une personne absente
    /// un jour l'est pour toutes les périodes de ce jour.
    pub fn binds_on(&self, date: NaiveDate) -> bool {
        self.status == AbsenceStatus::Approved
            && self.start_date <= date
            && date <= self.end_date
    }
}

// ==========================================
// Incompatibility - Incompatibilité entre deux personnes
// ==========================================
// Paire non ordonnée; la fenêtre de validité est optionnelle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incompatibility {
    pub incompatibility_id: String,     // ID
    pub person_a: PersonRef,            // Première personne
    pub person_b: PersonRef,            // Seconde personne
    pub level: IncompatibilityLevel,    // BLOQUANT ou PREFERENTIEL
    pub valid_from: Option<NaiveDate>,  // Début de validité (inclus)
    pub valid_until: Option<NaiveDate>, // Fin de validité (incluse)
}

impl Incompatibility {
    /// L'incompatibilité est-elle en vigueur à cette date ?
    pub fn valid_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if date > until {
                return false;
            }
        }
        true
    }

    /// La paire concerne-t-elle ces deux personnes (ordre indifférent) ?
    pub fn concerns(&self, a: &PersonRef, b: &PersonRef) -> bool {
        (&self.person_a == a && &self.person_b == b)
            || (&self.person_a == b && &self.person_b == a)
    }
}
