// ==========================================
// Planification bloc opératoire - Erreurs de la couche API
// ==========================================
// Rôle: erreurs structurées des opérations métier. Une violation de
// règle attendue (garde de transition, autorisation, verrou de mutation)
// est une variante dédiée, jamais une chaîne opaque.
// ==========================================

use crate::domain::planning::Conflict;
use crate::domain::types::{ActorRole, ConflictSeverity, PlanStatus};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Erreurs de la couche API
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Erreurs métier
    // ==========================================
    #[error("ressource introuvable: {0}")]
    NotFound(String),

    #[error("entrée invalide: {0}")]
    InvalidInput(String),

    /// Transition refusée: inexistante dans la table, ou bloquée par des
    /// conflits ERROR non résolus (liste jointe).
    #[error("transition invalide: de {from} vers {to} ({} conflit(s) bloquant(s))", blocking.len())]
    InvalidTransition {
        from: PlanStatus,
        to: PlanStatus,
        blocking: Vec<Conflict>,
    },

    /// Acteur non habilité; les rôles admis sont joints.
    #[error("permissions insuffisantes: rôles requis {required:?}")]
    InsufficientPermissions { required: Vec<ActorRole> },

    /// Mutation tentée hors statut DRAFT.
    #[error("mutation interdite: le planning est en statut {status}")]
    MutationNotAllowed { status: PlanStatus },

    /// Résolution forcée tentée sur un conflit non-ERROR.
    #[error("résolution forcée interdite: sévérité {severity}")]
    ForceResolveNotAllowed { severity: ConflictSeverity },

    // ==========================================
    // Contrôle de concurrence
    // ==========================================
    #[error("conflit de verrou optimiste: {0}")]
    OptimisticLockFailure(String),

    // ==========================================
    // Accès aux données
    // ==========================================
    #[error("erreur base de données: {0}")]
    DatabaseError(String),

    #[error("connexion à la base impossible: {0}")]
    DatabaseConnectionError(String),

    #[error("échec de transaction: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // Générique
    // ==========================================
    /// Échec inattendu d'une passe de validation: un défaut, pas une
    /// violation métier.
    #[error("échec de validation: {0}")]
    ValidationFailure(String),

    #[error("erreur interne: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Conversion depuis RepositoryError
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                plan_id,
                expected,
                actual,
            } => ApiError::OptimisticLockFailure(format!(
                "le planning {} a été modifié par un autre utilisateur (revision attendue={}, réelle={})",
                plan_id, expected, actual
            )),

            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => ApiError::DatabaseConnectionError(format!(
                "verrou de connexion indisponible: {}",
                msg
            )),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("contrainte d'unicité violée: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("clé étrangère violée: {}", msg))
            }

            RepositoryError::ValidationError(msg) => ApiError::ValidationFailure(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("champ {}: {}", field, message))
            }

            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Alias de Result
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "DayPlan".to_string(),
            id: "p1".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("DayPlan"));
                assert!(msg.contains("p1"));
            }
            _ => panic!("variante NotFound attendue"),
        }
    }

    #[test]
    fn test_optimistic_lock_conversion() {
        let repo_err = RepositoryError::OptimisticLockFailure {
            plan_id: "p1".to_string(),
            expected: 1,
            actual: 2,
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::OptimisticLockFailure(msg) => {
                assert!(msg.contains("p1"));
            }
            _ => panic!("variante OptimisticLockFailure attendue"),
        }
    }
}
