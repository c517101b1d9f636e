// ==========================================
// Planification bloc opératoire - Types de domaine
// ==========================================
// Variantes fermées: les catégories et statuts sont résolus une fois
// au chargement des données, jamais re-dérivés de texte libre pendant
// l'évaluation des règles.
// Format de stockage: SCREAMING_SNAKE_CASE (aligné base de données)
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Période de vacation
// ==========================================
// ALL_DAY occupe les deux demi-journées.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Morning,   // Matin
    Afternoon, // Après-midi
    AllDay,    // Journée complète
}

/// Demi-journée effective, utilisée pour le regroupement des règles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalfDay {
    Morning,
    Afternoon,
}

impl Period {
    /// Demi-journées couvertes par la période.
    pub fn half_days(&self) -> &'static [HalfDay] {
        match self {
            Period::Morning => &[HalfDay::Morning],
            Period::Afternoon => &[HalfDay::Afternoon],
            Period::AllDay => &[HalfDay::Morning, HalfDay::Afternoon],
        }
    }

    /// Deux périodes sont concurrentes si elles partagent une demi-journée.
    pub fn overlaps(&self, other: Period) -> bool {
        self.half_days().iter().any(|h| other.half_days().contains(h))
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MORNING" => Some(Period::Morning),
            "AFTERNOON" => Some(Period::Afternoon),
            "ALL_DAY" => Some(Period::AllDay),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Period::Morning => "MORNING",
            Period::Afternoon => "AFTERNOON",
            Period::AllDay => "ALL_DAY",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl fmt::Display for HalfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalfDay::Morning => write!(f, "MORNING"),
            HalfDay::Afternoon => write!(f, "AFTERNOON"),
        }
    }
}

// ==========================================
// Parité de semaine (trames récurrentes)
// ==========================================
// La parité est celle du numéro de semaine ISO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekParity {
    Odd,  // Semaines impaires
    Even, // Semaines paires
    All,  // Toutes les semaines
}

impl WeekParity {
    /// La parité admet-elle ce numéro de semaine ISO ?
    pub fn admits(&self, iso_week: u32) -> bool {
        match self {
            WeekParity::All => true,
            WeekParity::Even => iso_week % 2 == 0,
            WeekParity::Odd => iso_week % 2 == 1,
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ODD" => Some(WeekParity::Odd),
            "EVEN" => Some(WeekParity::Even),
            "ALL" => Some(WeekParity::All),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            WeekParity::Odd => "ODD",
            WeekParity::Even => "EVEN",
            WeekParity::All => "ALL",
        }
    }
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Jour de semaine
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub fn from_weekday(w: Weekday) -> Self {
        match w {
            Weekday::Mon => WeekDay::Monday,
            Weekday::Tue => WeekDay::Tuesday,
            Weekday::Wed => WeekDay::Wednesday,
            Weekday::Thu => WeekDay::Thursday,
            Weekday::Fri => WeekDay::Friday,
            Weekday::Sat => WeekDay::Saturday,
            Weekday::Sun => WeekDay::Sunday,
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MONDAY" => Some(WeekDay::Monday),
            "TUESDAY" => Some(WeekDay::Tuesday),
            "WEDNESDAY" => Some(WeekDay::Wednesday),
            "THURSDAY" => Some(WeekDay::Thursday),
            "FRIDAY" => Some(WeekDay::Friday),
            "SATURDAY" => Some(WeekDay::Saturday),
            "SUNDAY" => Some(WeekDay::Sunday),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "MONDAY",
            WeekDay::Tuesday => "TUESDAY",
            WeekDay::Wednesday => "WEDNESDAY",
            WeekDay::Thursday => "THURSDAY",
            WeekDay::Friday => "FRIDAY",
            WeekDay::Saturday => "SATURDAY",
            WeekDay::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Statut d'un planning journalier
// ==========================================
// Cycle de vie: DRAFT -> VALIDATED <-> LOCKED, ARCHIVED terminal.
// Un planning n'est modifiable qu'en DRAFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,     // Brouillon
    Validated, // Validé
    Locked,    // Verrouillé
    Archived,  // Archivé
}

impl PlanStatus {
    /// Statuts terminaux ou verrouillés: plus aucune mutation du contenu.
    pub fn is_frozen(&self) -> bool {
        matches!(
            self,
            PlanStatus::Validated | PlanStatus::Locked | PlanStatus::Archived
        )
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(PlanStatus::Draft),
            "VALIDATED" => Some(PlanStatus::Validated),
            "LOCKED" => Some(PlanStatus::Locked),
            "ARCHIVED" => Some(PlanStatus::Archived),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "DRAFT",
            PlanStatus::Validated => "VALIDATED",
            PlanStatus::Locked => "LOCKED",
            PlanStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Sévérité d'un conflit
// ==========================================
// Seule la sévérité ERROR bloque la promotion du planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    Info,
    Warning,
    Error,
}

impl ConflictSeverity {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "INFO" => Some(ConflictSeverity::Info),
            "WARNING" => Some(ConflictSeverity::Warning),
            "ERROR" => Some(ConflictSeverity::Error),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Info => "INFO",
            ConflictSeverity::Warning => "WARNING",
            ConflictSeverity::Error => "ERROR",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Type de conflit
// ==========================================
// Liste fermée: chaque famille de règles émet ses propres types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    // Absences
    PersonnelAbsent,
    // Double affectation
    DoubleAffectationPersonnel,
    // Charge de supervision MAR
    MarExceedMaxSallesPrincipales,
    MarExceedMaxSallesSupervisees,
    MarExceedMaxSallesSuperviseesEndo,
    MarExceedMaxSallesSuperviseesOphtalmo,
    MarPrincipalOphtalmoSupervisingStandardBloc,
    // Contiguïté
    ContiguityViolation,
    // Incompatibilités
    SurgeonIncompatibility,
    StaffIncompatibility,
    SurgeonStaffIncompatibility,
    SurgeonPrefIncompatibility,
    StaffPrefIncompatibility,
    SurgeonStaffPrefIncompatibility,
    // Couverture anesthésie
    MissingMarForSurgeon,
    MissingAnesthesiaStaff,
    InsufficientIadeCount,
    // Règles sectorielles
    InsufficientStaffHyperaseptic,
    MissingSpecialSkillOphtalmo,
    MissingSpecialSkillEndoscopie,
    MissingIadeInEndoWithMar,
    // Générateur de trames
    TrameOverlapWarning,
}

impl ConflictType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PERSONNEL_ABSENT" => Some(Self::PersonnelAbsent),
            "DOUBLE_AFFECTATION_PERSONNEL" => Some(Self::DoubleAffectationPersonnel),
            "MAR_EXCEED_MAX_SALLES_PRINCIPALES" => Some(Self::MarExceedMaxSallesPrincipales),
            "MAR_EXCEED_MAX_SALLES_SUPERVISEES" => Some(Self::MarExceedMaxSallesSupervisees),
            "MAR_EXCEED_MAX_SALLES_SUPERVISEES_ENDO" => {
                Some(Self::MarExceedMaxSallesSuperviseesEndo)
            }
            "MAR_EXCEED_MAX_SALLES_SUPERVISEES_OPHTALMO" => {
                Some(Self::MarExceedMaxSallesSuperviseesOphtalmo)
            }
            "MAR_PRINCIPAL_OPHTALMO_SUPERVISING_STANDARD_BLOC" => {
                Some(Self::MarPrincipalOphtalmoSupervisingStandardBloc)
            }
            "CONTIGUITY_VIOLATION" => Some(Self::ContiguityViolation),
            "SURGEON_INCOMPATIBILITY" => Some(Self::SurgeonIncompatibility),
            "STAFF_INCOMPATIBILITY" => Some(Self::StaffIncompatibility),
            "SURGEON_STAFF_INCOMPATIBILITY" => Some(Self::SurgeonStaffIncompatibility),
            "SURGEON_PREF_INCOMPATIBILITY" => Some(Self::SurgeonPrefIncompatibility),
            "STAFF_PREF_INCOMPATIBILITY" => Some(Self::StaffPrefIncompatibility),
            "SURGEON_STAFF_PREF_INCOMPATIBILITY" => Some(Self::SurgeonStaffPrefIncompatibility),
            "MISSING_MAR_FOR_SURGEON" => Some(Self::MissingMarForSurgeon),
            "MISSING_ANESTHESIA_STAFF" => Some(Self::MissingAnesthesiaStaff),
            "INSUFFICIENT_IADE_COUNT" => Some(Self::InsufficientIadeCount),
            "INSUFFICIENT_STAFF_HYPERASEPTIC" => Some(Self::InsufficientStaffHyperaseptic),
            "MISSING_SPECIAL_SKILL_OPHTALMO" => Some(Self::MissingSpecialSkillOphtalmo),
            "MISSING_SPECIAL_SKILL_ENDOSCOPIE" => Some(Self::MissingSpecialSkillEndoscopie),
            "MISSING_IADE_IN_ENDO_WITH_MAR" => Some(Self::MissingIadeInEndoWithMar),
            "TRAME_OVERLAP_WARNING" => Some(Self::TrameOverlapWarning),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Self::PersonnelAbsent => "PERSONNEL_ABSENT",
            Self::DoubleAffectationPersonnel => "DOUBLE_AFFECTATION_PERSONNEL",
            Self::MarExceedMaxSallesPrincipales => "MAR_EXCEED_MAX_SALLES_PRINCIPALES",
            Self::MarExceedMaxSallesSupervisees => "MAR_EXCEED_MAX_SALLES_SUPERVISEES",
            Self::MarExceedMaxSallesSuperviseesEndo => "MAR_EXCEED_MAX_SALLES_SUPERVISEES_ENDO",
            Self::MarExceedMaxSallesSuperviseesOphtalmo => {
                "MAR_EXCEED_MAX_SALLES_SUPERVISEES_OPHTALMO"
            }
            Self::MarPrincipalOphtalmoSupervisingStandardBloc => {
                "MAR_PRINCIPAL_OPHTALMO_SUPERVISING_STANDARD_BLOC"
            }
            Self::ContiguityViolation => "CONTIGUITY_VIOLATION",
            Self::SurgeonIncompatibility => "SURGEON_INCOMPATIBILITY",
            Self::StaffIncompatibility => "STAFF_INCOMPATIBILITY",
            Self::SurgeonStaffIncompatibility => "SURGEON_STAFF_INCOMPATIBILITY",
            Self::SurgeonPrefIncompatibility => "SURGEON_PREF_INCOMPATIBILITY",
            Self::StaffPrefIncompatibility => "STAFF_PREF_INCOMPATIBILITY",
            Self::SurgeonStaffPrefIncompatibility => "SURGEON_STAFF_PREF_INCOMPATIBILITY",
            Self::MissingMarForSurgeon => "MISSING_MAR_FOR_SURGEON",
            Self::MissingAnesthesiaStaff => "MISSING_ANESTHESIA_STAFF",
            Self::InsufficientIadeCount => "INSUFFICIENT_IADE_COUNT",
            Self::InsufficientStaffHyperaseptic => "INSUFFICIENT_STAFF_HYPERASEPTIC",
            Self::MissingSpecialSkillOphtalmo => "MISSING_SPECIAL_SKILL_OPHTALMO",
            Self::MissingSpecialSkillEndoscopie => "MISSING_SPECIAL_SKILL_ENDOSCOPIE",
            Self::MissingIadeInEndoWithMar => "MISSING_IADE_IN_ENDO_WITH_MAR",
            Self::TrameOverlapWarning => "TRAME_OVERLAP_WARNING",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Rôle du personnel d'anesthésie
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Mar,  // Médecin anesthésiste-réanimateur
    Iade, // Infirmier anesthésiste diplômé d'État
}

impl StaffRole {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MAR" => Some(StaffRole::Mar),
            "IADE" => Some(StaffRole::Iade),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            StaffRole::Mar => "MAR",
            StaffRole::Iade => "IADE",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Catégorie de secteur
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectorCategory {
    Standard,
    Hyperaseptic,  // Hyperaseptique
    Ophthalmology, // Ophtalmologie
    Endoscopy,     // Endoscopie
}

impl SectorCategory {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Some(SectorCategory::Standard),
            "HYPERASEPTIQUE" => Some(SectorCategory::Hyperaseptic),
            "OPHTALMOLOGIE" => Some(SectorCategory::Ophthalmology),
            "ENDOSCOPIE" => Some(SectorCategory::Endoscopy),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            SectorCategory::Standard => "STANDARD",
            SectorCategory::Hyperaseptic => "HYPERASEPTIQUE",
            SectorCategory::Ophthalmology => "OPHTALMOLOGIE",
            SectorCategory::Endoscopy => "ENDOSCOPIE",
        }
    }
}

impl fmt::Display for SectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Type de salle
// ==========================================
// Les salles non opératoires (consultation, garde, astreinte) adoucissent
// la sévérité des doubles affectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomKind {
    Standard,
    Consultation,
    OnCall,  // Garde
    StandBy, // Astreinte
}

impl RoomKind {
    pub fn is_operating(&self) -> bool {
        matches!(self, RoomKind::Standard)
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Some(RoomKind::Standard),
            "CONSULTATION" => Some(RoomKind::Consultation),
            "GARDE" => Some(RoomKind::OnCall),
            "ASTREINTE" => Some(RoomKind::StandBy),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            RoomKind::Standard => "STANDARD",
            RoomKind::Consultation => "CONSULTATION",
            RoomKind::OnCall => "GARDE",
            RoomKind::StandBy => "ASTREINTE",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Statut d'une absence
// ==========================================
// Seules les absences APPROVED sont opposables au planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
}

impl AbsenceStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(AbsenceStatus::Pending),
            "APPROVED" => Some(AbsenceStatus::Approved),
            "REJECTED" => Some(AbsenceStatus::Rejected),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AbsenceStatus::Pending => "PENDING",
            AbsenceStatus::Approved => "APPROVED",
            AbsenceStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for AbsenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Niveau d'incompatibilité
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncompatibilityLevel {
    Blocking,     // BLOQUANT -> conflit ERROR
    Preferential, // PREFERENTIEL -> conflit WARNING
}

impl IncompatibilityLevel {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BLOQUANT" => Some(IncompatibilityLevel::Blocking),
            "PREFERENTIEL" => Some(IncompatibilityLevel::Preferential),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            IncompatibilityLevel::Blocking => "BLOQUANT",
            IncompatibilityLevel::Preferential => "PREFERENTIEL",
        }
    }
}

impl fmt::Display for IncompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Rôle d'un acteur (autorisations)
// ==========================================
// ADMIN_TOTAL outrepasse la matrice de transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    AdminTotal,
    AdminPartiel,
    Utilisateur,
}

impl ActorRole {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN_TOTAL" => Some(ActorRole::AdminTotal),
            "ADMIN_PARTIEL" => Some(ActorRole::AdminPartiel),
            "UTILISATEUR" => Some(ActorRole::Utilisateur),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActorRole::AdminTotal => "ADMIN_TOTAL",
            ActorRole::AdminPartiel => "ADMIN_PARTIEL",
            ActorRole::Utilisateur => "UTILISATEUR",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
