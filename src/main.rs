// ==========================================
// Planification bloc opératoire - CLI
// ==========================================
// Point d'entrée en ligne de commande sur la racine de composition.
//
// Usage:
//   bloc-planning init-db
//   bloc-planning generate <site_id> <start> <end> <trame_id>...
//   bloc-planning validate <plan_id>
//   bloc-planning status <plan_id> <nouveau_statut> <acteur> <role>
//   bloc-planning conflicts <plan_id>
// ==========================================

use bloc_planning::api::Actor;
use bloc_planning::app::{get_default_db_path, AppState};
use bloc_planning::domain::types::{ActorRole, PlanStatus};
use bloc_planning::i18n::t_with_args;
use bloc_planning::logging;
use chrono::NaiveDate;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", bloc_planning::APP_NAME, bloc_planning::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let db_path = get_default_db_path();
    tracing::info!("base de données: {}", db_path);
    let state = AppState::new(db_path.clone())?;

    match command.as_str() {
        "init-db" => {
            // Le schéma est créé par AppState::new; rien d'autre à faire.
            println!("{}", t_with_args("cli.db_initialized", &[("path", &db_path)]));
        }

        "generate" => {
            let (site_id, start, end, trame_ids) = parse_generate_args(&args[1..])?;
            let actor = Actor::new("cli", ActorRole::AdminTotal);
            let plans = state
                .generation_api
                .generate_day_plans(&site_id, start, end, &trame_ids, &actor)?;
            println!(
                "{}",
                t_with_args(
                    "cli.plans_generated",
                    &[
                        ("count", &plans.len().to_string()),
                        ("start", &start.to_string()),
                        ("end", &end.to_string()),
                    ],
                )
            );
            for plan in &plans {
                println!("  {}  {}  {}", plan.date, plan.status, plan.plan_id);
            }
        }

        "validate" => {
            let plan_id = args.get(1).ok_or("plan_id manquant")?;
            let outcome = state.validation_api.validate_day_plan(plan_id)?;
            if outcome.is_valid {
                println!("{}", bloc_planning::i18n::t("cli.plan_valid"));
            } else {
                let blocking = outcome.conflicts.iter().filter(|c| c.is_blocking()).count();
                println!(
                    "{}",
                    t_with_args("cli.plan_invalid", &[("count", &blocking.to_string())])
                );
            }
            for conflict in &outcome.conflicts {
                println!("  [{}] {}  {}", conflict.severity, conflict.kind, conflict.message);
            }
        }

        "status" => {
            let plan_id = args.get(1).ok_or("plan_id manquant")?;
            let target = args
                .get(2)
                .and_then(|s| PlanStatus::from_db_str(s))
                .ok_or("statut cible invalide (DRAFT/VALIDATED/LOCKED/ARCHIVED)")?;
            let actor_name = args.get(3).map(String::as_str).unwrap_or("cli");
            let role = args
                .get(4)
                .and_then(|s| ActorRole::from_db_str(s))
                .unwrap_or(ActorRole::AdminTotal);

            let actor = Actor::new(actor_name, role);
            let plan = state.planning_api.change_status(plan_id, target, &actor)?;
            println!(
                "{}",
                t_with_args(
                    "cli.status_changed",
                    &[("plan", &plan.plan_id), ("status", plan.status.to_db_str())],
                )
            );
        }

        "conflicts" => {
            let plan_id = args.get(1).ok_or("plan_id manquant")?;
            let conflicts = state.conflict_repo.list_by_plan(plan_id)?;
            for conflict in &conflicts {
                let marker = if conflict.is_resolved { "résolu" } else { "ouvert" };
                println!(
                    "  [{}] {} ({})  {}",
                    conflict.severity, conflict.kind, marker, conflict.message
                );
            }
            println!("{} conflit(s)", conflicts.len());
        }

        other => {
            eprintln!("commande inconnue: {}", other);
            print_usage();
        }
    }

    Ok(())
}

fn parse_generate_args(
    args: &[String],
) -> Result<(String, NaiveDate, NaiveDate, Vec<String>), Box<dyn Error>> {
    let site_id = args.first().ok_or("site_id manquant")?.clone();
    let start = NaiveDate::parse_from_str(args.get(1).ok_or("date de début manquante")?, "%Y-%m-%d")?;
    let end = NaiveDate::parse_from_str(args.get(2).ok_or("date de fin manquante")?, "%Y-%m-%d")?;
    let trame_ids: Vec<String> = args[3..].to_vec();
    if trame_ids.is_empty() {
        return Err("au moins un trame_id est requis".into());
    }
    Ok((site_id, start, end, trame_ids))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  bloc-planning init-db");
    eprintln!("  bloc-planning generate <site_id> <AAAA-MM-JJ> <AAAA-MM-JJ> <trame_id>...");
    eprintln!("  bloc-planning validate <plan_id>");
    eprintln!("  bloc-planning status <plan_id> <statut> [acteur] [role]");
    eprintln!("  bloc-planning conflicts <plan_id>");
    eprintln!();
    eprintln!("Base de données: $BLOC_PLANNING_DB_PATH ou répertoire de données utilisateur.");
}
