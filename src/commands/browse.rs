// ABOUTME: Read-only commands: inspect a configuration, list and map a component's configurations.
// ABOUTME: JSON mode prints the resources as data events.

use std::path::PathBuf;

use super::connection::connect;
use dngcm::config::Config;
use dngcm::error::{Error, Result};
use dngcm::output::Output;
use dngcm::resources::{
    Component, Configuration, component_configurations, fetch_component, fetch_configuration,
};
use dngcm::transport::Transport;
use dngcm::types::{ComponentUri, ConfigurationUri};
use dngcm::worklist::tagged_transfers;

pub async fn inspect(config: Config, uri: ConfigurationUri, output: Output) -> Result<()> {
    let client = connect(&config, &output).await?;
    let configuration = fetch_configuration(&client, &uri)
        .await?
        .ok_or_else(|| Error::NotFound(uri.to_string()))?;

    let component = match &configuration.component {
        Some(component) => fetch_component(&client, component).await?,
        None => None,
    };

    output.data("configuration", &configuration);
    output.line(&format!("{} ({})", configuration.label(), configuration.kind));
    output.line(&format!("  uri:        {}", configuration.uri));
    if let Some(component) = &component {
        output.line(&format!("  component:  {} <{}>", component.label(), component.uri));
    }
    let links = [
        ("created", configuration.created.map(|c| c.to_rfc3339())),
        ("creator", configuration.creator.clone()),
        ("provider", configuration.service_provider.as_ref().map(|u| u.to_string())),
        ("overrides", configuration.overrides.as_ref().map(|u| u.to_string())),
        ("baseline", configuration.previous_baseline.as_ref().map(|u| u.to_string())),
        ("derived", configuration.was_derived_from.as_ref().map(|u| u.to_string())),
    ];
    for (name, value) in links {
        if let Some(value) = value {
            output.line(&format!("  {:<11} {value}", format!("{name}:")));
        }
    }
    if let Some(description) = &configuration.description {
        output.line(&format!("  {description}"));
    }
    Ok(())
}

/// The component and every configuration it owns, of any kind.
async fn component_with_configurations<T: Transport + ?Sized>(
    transport: &T,
    uri: &ComponentUri,
) -> Result<(Component, Vec<Configuration>)> {
    let component = fetch_component(transport, uri)
        .await?
        .ok_or_else(|| Error::NotFound(uri.to_string()))?;
    let configurations = component_configurations(transport, &component).await?;
    Ok((component, configurations))
}

pub async fn list_configurations(config: Config, uri: ComponentUri, output: Output) -> Result<()> {
    let client = connect(&config, &output).await?;
    let (component, configurations) = component_with_configurations(&client, &uri).await?;

    output.data("configurations", &configurations);
    output.progress(&format!(
        "{} configuration(s) in {}",
        configurations.len(),
        component.label()
    ));
    for configuration in &configurations {
        output.line(&format!(
            "{:<9} {:<40} {}",
            configuration.kind.to_string(),
            configuration.label(),
            configuration.uri
        ));
    }
    Ok(())
}

pub struct MapOptions {
    pub components: Vec<ComponentUri>,
    pub source_tag: String,
    pub target_tag: String,
    pub destination: Option<PathBuf>,
}

pub async fn map_configurations(config: Config, options: MapOptions, mut output: Output) -> Result<()> {
    output.start_timer();
    let client = connect(&config, &output).await?;

    let mut configurations = Vec::new();
    for uri in &options.components {
        let (component, mut found) = component_with_configurations(&client, uri).await?;
        output.progress(&format!("  → {}: {} configuration(s)", component.label(), found.len()));
        configurations.append(&mut found);
    }

    let worklist = tagged_transfers(&configurations, &options.source_tag, &options.target_tag)?;
    let yaml = worklist.to_yaml()?;
    match &options.destination {
        Some(path) => {
            std::fs::write(path, &yaml)?;
            output.success(&format!(
                "{} item(s) written to {}",
                worklist.len(),
                path.display()
            ));
        }
        None => {
            output.data("worklist", &worklist.iter().collect::<Vec<_>>());
            output.line(yaml.trim_end());
        }
    }
    Ok(())
}
