use std::collections::BTreeMap;

use anyhow::Result;
use log::info;

use crate::model::{
    Action, Command, Component, Devfile, DevfileScope, Endpoint, Metadata, Project, Source,
    UserContext, UserDevfile,
};
use crate::store::Stores;

/// Seeds the development user and a sample library devfile.
///
/// Safe to run repeatedly: the user is only created when missing and the
/// sample only when the user has no devfiles yet.
pub async fn load_seed_data(stores: &Stores) -> Result<()> {
    let user = UserContext::default_user();
    stores.users.ensure_user(user.as_user()).await?;

    let existing = stores
        .user_devfiles
        .get_devfiles(&user.user_id, 1, 0)
        .await?;
    if existing.total_count > 0 {
        info!("Seed data already present for user '{}'", user.user_id);
        return Ok(());
    }

    let sample = UserDevfile::new(
        DevfileScope::User.generate_id(),
        Some(user.user_id.clone()),
        sample_devfile(),
    );
    stores.user_devfiles.create(sample).await?;
    info!("Seeded sample devfile for user '{}'", user.user_id);

    Ok(())
}

fn sample_devfile() -> Devfile {
    let mut tools = Component::new("dockerimage", "maven");
    tools.image = Some("quay.io/eclipse/che-java11-maven:nightly".to_string());
    tools.memory_limit = Some("512Mi".to_string());
    tools.mount_sources = Some(true);
    tools.endpoints = vec![Endpoint {
        name: "spring-boot".to_string(),
        port: 8080,
        attributes: BTreeMap::new(),
    }];

    Devfile {
        api_version: "1.0.0".to_string(),
        projects: vec![Project {
            name: "java-spring-petclinic".to_string(),
            source: Source {
                source_type: "git".to_string(),
                location: "https://github.com/spring-projects/spring-petclinic.git".to_string(),
                ..Default::default()
            },
            clone_path: None,
        }],
        components: vec![tools],
        commands: vec![Command {
            name: "maven build".to_string(),
            actions: vec![Action {
                action_type: "exec".to_string(),
                component: Some("maven".to_string()),
                command: Some("mvn clean install".to_string()),
                workdir: Some("${CHE_PROJECTS_ROOT}/java-spring-petclinic".to_string()),
                ..Default::default()
            }],
            attributes: BTreeMap::new(),
            preview_url: None,
        }],
        attributes: BTreeMap::new(),
        metadata: Metadata::named("java-spring-petclinic"),
    }
}
