// ==========================================
// Planification bloc opératoire - Couche application
// ==========================================
// Rôle: racine de composition (câblage repositories / moteurs / APIs)
// pour le binaire CLI et les tests d'intégration.
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
