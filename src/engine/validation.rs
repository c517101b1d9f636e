// ==========================================
// Planification bloc opératoire - Moteur de validation
// ==========================================
// Rôle: exécuter les huit familles de règles sur un même instantané et
// réunir leurs sorties. Le moteur est pur: chargement et persistance
// appartiennent à la couche API.
// Ligne rouge: aucune règle n'en court-circuite une autre; l'ordre
// d'exécution n'affecte que la lisibilité des journaux.
// ==========================================

use crate::domain::planning::ConflictDraft;
use crate::domain::snapshot::PlanningSnapshot;
use crate::engine::rules::{
    AbsenceRule, AnesthesiaPresenceRule, ContiguityRule, DoubleBookingRule, IncompatibilityRule,
    Rule, SectorPolicyRule, SupervisionLoadRule, SurgeonCoverageRule,
};
use tracing::debug;

pub struct ValidationEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl ValidationEngine {
    /// Moteur avec la bibliothèque de règles complète.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(AbsenceRule::new()),
                Box::new(DoubleBookingRule::new()),
                Box::new(SupervisionLoadRule::new()),
                Box::new(ContiguityRule::new()),
                Box::new(IncompatibilityRule::new()),
                Box::new(SurgeonCoverageRule::new()),
                Box::new(AnesthesiaPresenceRule::new()),
                Box::new(SectorPolicyRule::new()),
            ],
        }
    }

    /// Évalue toutes les règles sur l'instantané et réunit les conflits.
    pub fn evaluate(&self, snapshot: &PlanningSnapshot) -> Vec<ConflictDraft> {
        let mut all = Vec::new();

        for rule in &self.rules {
            let drafts = rule.evaluate(snapshot);
            debug!(
                rule = rule.code(),
                plan_id = %snapshot.plan_id,
                conflicts = drafts.len(),
                "règle évaluée"
            );
            all.extend(drafts);
        }

        all
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}
