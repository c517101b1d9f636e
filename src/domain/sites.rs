// ==========================================
// Planification bloc opératoire - Sites, secteurs et salles
// ==========================================
// Un site regroupe des secteurs; un secteur regroupe des salles et porte
// ses règles propres (contiguïté, effectif IADE minimal) sous forme de
// blob JSON décodé une seule fois au chargement.
// ==========================================

use crate::domain::types::{RoomKind, SectorCategory};
use serde::{Deserialize, Serialize};

// ==========================================
// Site - Établissement
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub site_id: String,           // ID du site
    pub name: String,              // Nom de l'établissement
    pub timezone: String,          // Fuseau horaire (ex: Europe/Paris)
    pub color_code: Option<String>,// Couleur d'affichage
    pub is_active: bool,           // Site actif
}

// ==========================================
// SectorRules - Règles propres au secteur
// ==========================================
// Persisté en JSON dans la colonne rules_json du secteur.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorRules {
    /// Un même MAR ne peut couvrir que des salles contiguës du secteur.
    pub require_contiguous_rooms: bool,
    /// Graphe d'adjacence entre salles (paires non orientées d'IDs).
    /// Vide: repli sur l'adjacence des numéros de salle.
    pub contiguity_map: Vec<(String, String)>,
    /// Effectif IADE minimal par salle occupée.
    pub min_iade_per_room: Option<u32>,
}

impl SectorRules {
    /// Décode le blob JSON; un blob absent ou invalide donne les règles
    /// par défaut (aucune contrainte).
    pub fn from_json(raw: Option<&str>) -> Self {
        raw.and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Deux salles sont-elles adjacentes selon le graphe déclaré ?
    pub fn declares_adjacent(&self, room_a: &str, room_b: &str) -> bool {
        self.contiguity_map.iter().any(|(a, b)| {
            (a == room_a && b == room_b) || (a == room_b && b == room_a)
        })
    }
}

// ==========================================
// Sector - Secteur opératoire
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
    pub sector_id: String,          // ID du secteur
    pub site_id: String,            // Site de rattachement
    pub name: String,               // Nom du secteur
    pub category: SectorCategory,   // Catégorie (variante fermée)
    pub color_code: Option<String>, // Couleur d'affichage
    pub is_active: bool,            // Secteur actif
    pub rules: SectorRules,         // Règles décodées
}

// ==========================================
// OperatingRoom - Salle d'opération
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatingRoom {
    pub room_id: String,            // ID de la salle
    pub sector_id: Option<String>,  // Secteur (au plus un)
    pub name: String,               // Nom de la salle
    pub number: i32,                // Numéro (repli de contiguïté)
    pub kind: RoomKind,             // Type de salle (variante fermée)
    pub is_active: bool,            // Salle active
}

impl OperatingRoom {
    /// Salle non opératoire: type fermé d'abord, repli sur le nom
    /// pour les données historiques saisies en STANDARD.
    pub fn is_non_operating(&self) -> bool {
        if !self.kind.is_operating() {
            return true;
        }
        let name = self.name.to_lowercase();
        name.contains("consult") || name.contains("garde") || name.contains("astreinte")
    }
}
