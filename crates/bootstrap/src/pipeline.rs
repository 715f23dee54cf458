//! The fixed bootstrap stage list.

use std::sync::Arc;

use launchpad_core::config::BootstrapConfig;
use launchpad_core::stage::Stage;

use crate::database::Database;
use crate::handoff::HandoffTarget;
use crate::stages::{AdminStage, DependencyStage, HandoffStage, MigrationStage};

pub const STAGE_DEPENDENCIES: &str = "dependencies";
pub const STAGE_MIGRATE: &str = "migrate";
pub const STAGE_ADMIN: &str = "admin";
pub const STAGE_HANDOFF: &str = "handoff";

/// Build the ordered bootstrap stages. Every stage is required.
pub fn stages(config: &BootstrapConfig) -> Vec<Stage> {
    let database = Arc::new(Database::new(
        config.database_url.clone(),
        config.database_max_connections,
    ));

    vec![
        Stage::required(
            STAGE_DEPENDENCIES,
            DependencyStage {
                commands: config.dependency_commands.clone(),
            },
        ),
        Stage::required(
            STAGE_MIGRATE,
            MigrationStage {
                database: Arc::clone(&database),
            },
        ),
        Stage::required(
            STAGE_ADMIN,
            AdminStage {
                database,
                credentials: config.admin.clone(),
            },
        ),
        Stage::required(
            STAGE_HANDOFF,
            HandoffStage {
                target: HandoffTarget::from_config(config),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_required_and_valid() {
        let config = BootstrapConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://db/app".to_string())
        })
        .unwrap();

        let stages = stages(&config);
        let names: Vec<&str> = stages.iter().map(Stage::name).collect();

        assert_eq!(names, vec!["dependencies", "migrate", "admin", "handoff"]);
        assert!(stages.iter().all(Stage::is_required));
        assert!(launchpad_core::sequencer::validate(&stages).is_ok());
    }
}
