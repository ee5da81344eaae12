use std::collections::{BTreeMap, HashSet};

use crate::error::{DevfileError, Result};
use crate::logic::content::FileContentProvider;
use crate::model::{generate_name, Devfile};

/// Attribute names starting with this prefix are reserved by the platform.
pub const RESERVED_ATTRIBUTE_PREFIX: &str = "codenvy";

/// Length of the random suffix appended to `metadata.generateName`.
pub const GENERATED_NAME_SUFFIX_LENGTH: usize = 5;

pub fn validate_attributes(attributes: &BTreeMap<String, String>) -> Result<()> {
    for name in attributes.keys() {
        if name.trim().is_empty() || name.starts_with(RESERVED_ATTRIBUTE_PREFIX) {
            return Err(DevfileError::Validation(format!(
                "Attribute name '{}' is not valid",
                name
            )));
        }
    }
    Ok(())
}

/// Fills `metadata.name` from `metadata.generateName` when it is absent.
pub fn generate_name_if_needed(mut devfile: Devfile) -> Result<Devfile> {
    if devfile.metadata.name.is_some() {
        return Ok(devfile);
    }
    match devfile.metadata.generate_name.as_deref() {
        Some(prefix) if !prefix.is_empty() => {
            devfile.metadata.name = Some(generate_name(prefix, GENERATED_NAME_SUFFIX_LENGTH));
            Ok(devfile)
        }
        _ => Err(DevfileError::Validation(
            "Neither 'name' nor 'generateName' is specified in devfile metadata".to_string(),
        )),
    }
}

/// Cross-reference checks between projects, components and commands.
pub fn validate_integrity(devfile: &Devfile) -> Result<()> {
    let mut project_names = HashSet::new();
    for project in &devfile.projects {
        if !project_names.insert(project.name.as_str()) {
            return Err(DevfileError::Validation(format!(
                "Duplicate project name found:'{}'",
                project.name
            )));
        }
    }

    let mut aliases = HashSet::new();
    for alias in devfile.components.iter().filter_map(|c| c.alias.as_deref()) {
        if !aliases.insert(alias) {
            return Err(DevfileError::Validation(format!(
                "Duplicate component alias found:'{}'",
                alias
            )));
        }
    }

    let mut command_names = HashSet::new();
    for command in &devfile.commands {
        if !command_names.insert(command.name.as_str()) {
            return Err(DevfileError::Validation(format!(
                "Duplicate command name found:'{}'",
                command.name
            )));
        }
        for component in command.actions.iter().filter_map(|a| a.component.as_deref()) {
            if !aliases.contains(component) {
                return Err(DevfileError::Validation(format!(
                    "Command '{}' has action that refers to a component with unknown alias '{}'",
                    command.name, component
                )));
            }
        }
    }

    Ok(())
}

/// Ensures every component reference without inline content can be fetched.
pub async fn validate_content_references(
    devfile: &Devfile,
    provider: &dyn FileContentProvider,
) -> Result<()> {
    for component in &devfile.components {
        if component.reference_content.is_some() {
            continue;
        }
        let Some(reference) = component.reference.as_deref() else {
            continue;
        };
        let display_name = component
            .alias
            .as_deref()
            .unwrap_or(component.component_type.as_str());

        let content = provider.fetch_content(reference).await.map_err(|e| {
            DevfileError::Validation(format!(
                "Error during recipe content retrieval for component '{}' with type '{}': {}",
                display_name, component.component_type, e
            ))
        })?;
        if content.trim().is_empty() {
            return Err(DevfileError::Validation(format!(
                "The reference file '{}' defined in component '{}' is empty",
                reference, display_name
            )));
        }
    }
    Ok(())
}
