use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

/// A remote project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub user_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub create_date: String,
}

#[derive(Deserialize)]
struct ProjectsEnvelope {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct CreateProjectEnvelope {
    project: Project,
}

impl ApiClient {
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let envelope: ProjectsEnvelope = self.get_json("_project", &[]).await?;
        Ok(envelope.projects)
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, ApiError> {
        let envelope: CreateProjectEnvelope = self
            .post_json("_project", &serde_json::json!({ "name": name }))
            .await?;
        Ok(envelope.project)
    }
}
