// ==========================================
// Planification bloc opératoire - Couche configuration
// ==========================================
// Rôle: configuration du système (bornes de supervision, langue).
// Stockage: table config_kv (clé-valeur, portée globale).
// ==========================================

pub mod config_manager;

pub use config_manager::{config_keys, ConfigManager};
