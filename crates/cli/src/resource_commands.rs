use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use strato_api::{ApiClient, Endpoint, Project, UpdateEndpointRequest};
use strato_auth::{Authenticator, ProviderConfig};
use tracing::debug;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List remote projects.
    Ls,
    /// Create a project.
    Create { name: String },
}

#[derive(Subcommand)]
pub enum EndpointAction {
    /// List remote endpoints.
    Ls,
    /// Create an endpoint in a project.
    Create {
        name: String,
        #[arg(long)]
        project: String,
    },
    /// Update an endpoint's name, methods, or code.
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_delimiter = ',')]
        methods: Vec<String>,
        /// File whose contents replace the endpoint code.
        #[arg(long)]
        code_file: Option<PathBuf>,
    },
    /// Remove an endpoint.
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum PackageAction {
    /// List packages installed in a project.
    Ls {
        #[arg(long)]
        project: String,
    },
    /// Install a package into a project.
    Add {
        name: String,
        #[arg(long)]
        project: String,
    },
    /// Remove an installed package.
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum VarAction {
    /// List variables attached to a project.
    Ls {
        #[arg(long)]
        project: String,
    },
    /// Attach a variable to a project.
    Add {
        name: String,
        value: String,
        #[arg(long)]
        project: String,
    },
    /// Remove a variable.
    Remove { id: String },
}

/// Authenticate (refreshing transparently if needed) and build a client.
async fn client() -> Result<ApiClient> {
    let auth = Authenticator::new(ProviderConfig::from_env())?;
    let token = auth.get_token().await?;
    Ok(ApiClient::from_env(&token))
}

/// Mirror fetched records into the local project directory, when one exists,
/// so later commands can answer from disk.
fn mirror<T: serde::Serialize>(path: Result<PathBuf, strato_files::FilesError>, records: &T) {
    let Ok(path) = path else { return };
    let in_project = path.parent().is_some_and(|dir| dir.is_dir());
    if !in_project {
        return;
    }
    if let Err(e) = strato_files::write_json(&path, records) {
        debug!("could not mirror records to {}: {e}", path.display());
    }
}

/// Link the working directory to an existing remote project: seed the local
/// mirror files and record the directory in the global active-projects list.
pub async fn handle_init(name: String) -> Result<()> {
    let client = client().await?;

    let projects = client.list_projects().await?;
    let Some(project) = projects.into_iter().find(|p| p.name == name) else {
        anyhow::bail!("no project named '{name}'; run `strato project ls` to see what exists");
    };

    let endpoints: Vec<Endpoint> = client
        .list_endpoints()
        .await?
        .into_iter()
        .filter(|ep| ep.project_id == project.id)
        .collect();

    let dir = strato_files::local_app_dir()?;
    write_project_mirror(&dir, &project, &endpoints)?;
    register_active_project(&strato_files::active_projects_path()?, &std::env::current_dir()?)?;

    println!(
        "Initialized '{}' with {} endpoint(s); mirrors written to {}",
        project.name,
        endpoints.len(),
        dir.display()
    );
    Ok(())
}

/// Seed the per-project mirror files. Once these exist, list commands keep
/// them current through [`mirror`].
fn write_project_mirror(dir: &Path, project: &Project, endpoints: &[Endpoint]) -> Result<()> {
    strato_files::write_json(
        &dir.join(strato_files::PROJECTS_FILE),
        &std::slice::from_ref(project),
    )?;
    strato_files::write_json(&dir.join(strato_files::ENDPOINTS_FILE), &endpoints)?;
    Ok(())
}

/// Record `project_root` in the global active-projects list, once.
fn register_active_project(active_path: &Path, project_root: &Path) -> Result<()> {
    let mut active: Vec<String> = match strato_files::read_json(active_path) {
        Ok(list) => list,
        Err(strato_files::FilesError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let entry = project_root.display().to_string();
    if !active.contains(&entry) {
        active.push(entry);
        strato_files::write_json(active_path, &active)?;
    }
    Ok(())
}

pub async fn handle_project(action: ProjectAction) -> Result<()> {
    let client = client().await?;
    match action {
        ProjectAction::Ls => {
            let projects = client.list_projects().await?;
            if projects.is_empty() {
                println!("No projects yet. Create one with `strato project create <name>`.");
            } else {
                for project in &projects {
                    println!("  {} — {} [{}]", project.id, project.name, project.domain);
                }
            }
            mirror(strato_files::local_projects_path(), &projects);
        },
        ProjectAction::Create { name } => {
            let project = client.create_project(&name).await?;
            println!("Created project '{}' ({})", project.name, project.id);
        },
    }
    Ok(())
}

pub async fn handle_endpoint(action: EndpointAction) -> Result<()> {
    let client = client().await?;
    match action {
        EndpointAction::Ls => {
            let endpoints = client.list_endpoints().await?;
            if endpoints.is_empty() {
                println!("No endpoints yet.");
            } else {
                for ep in &endpoints {
                    println!("  {} — {} {}", ep.id, ep.name, ep.uri);
                }
            }
            mirror(strato_files::local_endpoints_path(), &endpoints);
        },
        EndpointAction::Create { name, project } => {
            let endpoint = client.create_endpoint(&name, &project).await?;
            println!("Created endpoint '{}' at {}", endpoint.name, endpoint.uri);
        },
        EndpointAction::Update {
            id,
            name,
            methods,
            code_file,
        } => {
            let code = match code_file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("could not read {}", path.display()))?,
                None => String::new(),
            };
            let endpoint = client
                .update_endpoint(
                    &id,
                    &UpdateEndpointRequest {
                        name,
                        methods,
                        code,
                    },
                )
                .await?;
            println!("Updated endpoint '{}'", endpoint.name);
        },
        EndpointAction::Remove { id } => {
            let response = client.remove_endpoint(&id).await?;
            println!("Removed endpoint {}", response.id);
        },
    }
    Ok(())
}

pub async fn handle_package(action: PackageAction) -> Result<()> {
    let client = client().await?;
    match action {
        PackageAction::Ls { project } => {
            let packages = client.list_packages(&project).await?;
            if packages.is_empty() {
                println!("No packages installed.");
            } else {
                for package in &packages {
                    println!("  {} {} [{}]", package.name, package.version, package.status);
                }
            }
        },
        PackageAction::Add { name, project } => {
            let package = client.add_package(&project, &name).await?;
            println!("Installing package '{}' ({})", package.name, package.status);
        },
        PackageAction::Remove { id } => {
            let response = client.remove_package(&id).await?;
            println!("Removed package {}", response.id);
        },
    }
    Ok(())
}

pub async fn handle_var(action: VarAction) -> Result<()> {
    let client = client().await?;
    match action {
        VarAction::Ls { project } => {
            let variables = client.list_variables(&project).await?;
            if variables.is_empty() {
                println!("No variables set.");
            } else {
                for variable in &variables {
                    println!("  {} — {}", variable.id, variable.name);
                }
            }
        },
        VarAction::Add {
            name,
            value,
            project,
        } => {
            let variable = client.add_variable(&project, &name, &value).await?;
            println!("Added variable '{}'", variable.name);
        },
        VarAction::Remove { id } => {
            let response = client.remove_variable(&id).await?;
            println!("Removed variable {}", response.id);
        },
    }
    Ok(())
}
