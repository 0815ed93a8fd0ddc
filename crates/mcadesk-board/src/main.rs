mod dashboard;

use anyhow::Result as AnyResult;
use chrono::Utc;
use mcadesk_core::{DealStage, DealStore, RecordId, StageCatalog, TimelineStore};
use mcadesk_platform::DeskConfig;
use mcadesk_store::{
    InMemoryDealStore, NoopRemoteSync, OptimisticUpdater, Snapshot, load_snapshot, save_snapshot,
};
use tracing::{info, warn};

const USAGE: &str =
    "usage: mcadesk-board [dashboard | move <deal-id> <stage> | complete <task-id>]";

enum Command {
    Dashboard,
    Move { deal_id: RecordId, stage: DealStage },
    Complete { task_id: RecordId },
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mcadesk_board=info".to_string()),
        )
        .init();

    let command = parse_command(std::env::args().skip(1).collect())?;
    let config = DeskConfig::from_env()?;
    let catalog = StageCatalog::standard();

    let snapshot = match load_snapshot(&config.snapshot_path).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("{err:#}; starting from an empty dataset");
            Snapshot::default()
        }
    };
    let store = InMemoryDealStore::from_snapshot(snapshot);

    match command {
        Command::Dashboard => {
            let deals = store.deals().await?;
            let documents = store.documents().await?;
            let tasks = store.tasks().await?;
            let pack =
                dashboard::build_pack(&catalog, &config, &deals, &documents, &tasks, Utc::now())?;
            info!("dashboard built for {} deals", pack.deals_total);
            println!("{}", serde_json::to_string_pretty(&pack)?);
        }
        Command::Move { deal_id, stage } => {
            let updater = OptimisticUpdater::new(&store, &NoopRemoteSync, &catalog);
            let moved = updater.move_stage(&deal_id, stage, Utc::now()).await?;
            save_snapshot(&config.snapshot_path, &store.snapshot().await).await?;
            info!("deal {} moved to {}", moved.id, catalog.label(moved.stage)?);
            println!("{}", serde_json::to_string_pretty(&moved)?);
        }
        Command::Complete { task_id } => {
            let updater = OptimisticUpdater::new(&store, &NoopRemoteSync, &catalog);
            let task = updater.complete_task(&task_id).await?;
            save_snapshot(&config.snapshot_path, &store.snapshot().await).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }

    Ok(())
}

fn parse_command(args: Vec<String>) -> AnyResult<Command> {
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["dashboard"] => Ok(Command::Dashboard),
        ["move", deal_id, stage] => Ok(Command::Move {
            deal_id: RecordId::from(*deal_id),
            stage: stage.parse()?,
        }),
        ["complete", task_id] => Ok(Command::Complete {
            task_id: RecordId::from(*task_id),
        }),
        _ => anyhow::bail!(USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn no_arguments_prints_the_dashboard() {
        assert!(matches!(parse_command(args(&[])), Ok(Command::Dashboard)));
        assert!(matches!(parse_command(args(&["dashboard"])), Ok(Command::Dashboard)));
    }

    #[test]
    fn move_keeps_session_ids_verbatim() {
        let command = parse_command(args(&["move", "d-1", "docs_in"])).unwrap();
        assert!(matches!(
            command,
            Command::Move { deal_id, stage: DealStage::DocsIn } if deal_id.as_str() == "d-1"
        ));
    }

    #[test]
    fn complete_takes_a_task_id() {
        let command = parse_command(args(&["complete", "t-7"])).unwrap();
        assert!(matches!(command, Command::Complete { task_id } if task_id.as_str() == "t-7"));
        assert!(parse_command(args(&["complete"])).is_err());
    }

    #[test]
    fn unknown_stage_is_reported() {
        let deal_id = RecordId::generate().to_string();
        let err = parse_command(args(&["move", &deal_id, "funded"])).err().unwrap();
        assert!(err.to_string().contains("unknown deal stage"));
        assert!(parse_command(args(&["archive"])).is_err());
    }
}
