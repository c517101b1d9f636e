// ==========================================
// Planification bloc opératoire - Machine à états des statuts
// ==========================================
// Cycle de vie: DRAFT <-> VALIDATED <-> LOCKED, ARCHIVED terminal.
// La table des transitions et la matrice de rôles sont des données, pas
// du code: l'autorisation passe par un port injectable.
// ==========================================

use crate::domain::types::{ActorRole, PlanStatus};

// ==========================================
// Table des transitions
// ==========================================

/// Transition autorisée et rôles admis à la déclencher.
pub struct TransitionRule {
    pub from: PlanStatus,
    pub to: PlanStatus,
    pub roles: &'static [ActorRole],
}

/// ADMIN_TOTAL est admis partout; ADMIN_PARTIEL est limité à
/// DRAFT <-> VALIDATED.
pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: PlanStatus::Draft,
        to: PlanStatus::Validated,
        roles: &[ActorRole::AdminTotal, ActorRole::AdminPartiel],
    },
    TransitionRule {
        from: PlanStatus::Validated,
        to: PlanStatus::Draft,
        roles: &[ActorRole::AdminTotal, ActorRole::AdminPartiel],
    },
    TransitionRule {
        from: PlanStatus::Validated,
        to: PlanStatus::Locked,
        roles: &[ActorRole::AdminTotal],
    },
    TransitionRule {
        from: PlanStatus::Locked,
        to: PlanStatus::Validated,
        roles: &[ActorRole::AdminTotal],
    },
    TransitionRule {
        from: PlanStatus::Draft,
        to: PlanStatus::Archived,
        roles: &[ActorRole::AdminTotal],
    },
    TransitionRule {
        from: PlanStatus::Validated,
        to: PlanStatus::Archived,
        roles: &[ActorRole::AdminTotal],
    },
    TransitionRule {
        from: PlanStatus::Locked,
        to: PlanStatus::Archived,
        roles: &[ActorRole::AdminTotal],
    },
];

// ==========================================
// StatusWorkflow - Interrogation de la table
// ==========================================
pub struct StatusWorkflow;

impl StatusWorkflow {
    /// La transition existe-t-elle dans la table ?
    pub fn transition_exists(from: PlanStatus, to: PlanStatus) -> bool {
        TRANSITIONS.iter().any(|t| t.from == from && t.to == to)
    }

    /// Rôles admis pour la transition (vide si elle n'existe pas).
    pub fn allowed_roles(from: PlanStatus, to: PlanStatus) -> Vec<ActorRole> {
        TRANSITIONS
            .iter()
            .find(|t| t.from == from && t.to == to)
            .map(|t| t.roles.to_vec())
            .unwrap_or_default()
    }

    /// La cible exige-t-elle l'absence de conflit bloquant ?
    pub fn requires_no_blocking(to: PlanStatus) -> bool {
        matches!(to, PlanStatus::Validated | PlanStatus::Locked)
    }
}

// ==========================================
// AuthorizationPort - Port d'autorisation
// ==========================================
// Injecté dans la couche API; la matrice de rôles par défaut est
// remplaçable (annuaire externe, tests).
pub trait AuthorizationPort: Send + Sync {
    fn can_transition(&self, role: ActorRole, from: PlanStatus, to: PlanStatus) -> bool;
    fn can_mutate_staff(&self, role: ActorRole, site_id: &str) -> bool;
}

/// Matrice de rôles par défaut, adossée à la table des transitions.
pub struct RoleMatrix;

impl RoleMatrix {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RoleMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationPort for RoleMatrix {
    fn can_transition(&self, role: ActorRole, from: PlanStatus, to: PlanStatus) -> bool {
        if role == ActorRole::AdminTotal {
            return StatusWorkflow::transition_exists(from, to);
        }
        StatusWorkflow::allowed_roles(from, to).contains(&role)
    }

    fn can_mutate_staff(&self, role: ActorRole, _site_id: &str) -> bool {
        matches!(role, ActorRole::AdminTotal | ActorRole::AdminPartiel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions_exist() {
        assert!(StatusWorkflow::transition_exists(
            PlanStatus::Draft,
            PlanStatus::Validated
        ));
        assert!(StatusWorkflow::transition_exists(
            PlanStatus::Validated,
            PlanStatus::Draft
        ));
        assert!(StatusWorkflow::transition_exists(
            PlanStatus::Validated,
            PlanStatus::Locked
        ));
        assert!(StatusWorkflow::transition_exists(
            PlanStatus::Locked,
            PlanStatus::Validated
        ));
    }

    #[test]
    fn test_archived_is_terminal() {
        for to in [PlanStatus::Draft, PlanStatus::Validated, PlanStatus::Locked] {
            assert!(!StatusWorkflow::transition_exists(PlanStatus::Archived, to));
        }
    }

    #[test]
    fn test_draft_cannot_jump_to_locked() {
        assert!(!StatusWorkflow::transition_exists(
            PlanStatus::Draft,
            PlanStatus::Locked
        ));
    }

    #[test]
    fn test_blocking_guard_targets() {
        assert!(StatusWorkflow::requires_no_blocking(PlanStatus::Validated));
        assert!(StatusWorkflow::requires_no_blocking(PlanStatus::Locked));
        assert!(!StatusWorkflow::requires_no_blocking(PlanStatus::Draft));
        assert!(!StatusWorkflow::requires_no_blocking(PlanStatus::Archived));
    }

    #[test]
    fn test_admin_total_bypasses_role_lists() {
        let matrix = RoleMatrix::new();
        assert!(matrix.can_transition(
            ActorRole::AdminTotal,
            PlanStatus::Validated,
            PlanStatus::Locked
        ));
        // Mais pas les transitions inexistantes.
        assert!(!matrix.can_transition(
            ActorRole::AdminTotal,
            PlanStatus::Draft,
            PlanStatus::Locked
        ));
    }

    #[test]
    fn test_admin_partiel_limited_to_draft_validated() {
        let matrix = RoleMatrix::new();
        assert!(matrix.can_transition(
            ActorRole::AdminPartiel,
            PlanStatus::Draft,
            PlanStatus::Validated
        ));
        assert!(matrix.can_transition(
            ActorRole::AdminPartiel,
            PlanStatus::Validated,
            PlanStatus::Draft
        ));
        assert!(!matrix.can_transition(
            ActorRole::AdminPartiel,
            PlanStatus::Validated,
            PlanStatus::Locked
        ));
        assert!(!matrix.can_transition(
            ActorRole::AdminPartiel,
            PlanStatus::Draft,
            PlanStatus::Archived
        ));
    }

    #[test]
    fn test_utilisateur_cannot_transition_or_mutate() {
        let matrix = RoleMatrix::new();
        assert!(!matrix.can_transition(
            ActorRole::Utilisateur,
            PlanStatus::Draft,
            PlanStatus::Validated
        ));
        assert!(!matrix.can_mutate_staff(ActorRole::Utilisateur, "site-1"));
        assert!(matrix.can_mutate_staff(ActorRole::AdminPartiel, "site-1"));
        assert!(matrix.can_mutate_staff(ActorRole::AdminTotal, "site-1"));
    }
}
