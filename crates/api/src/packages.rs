use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

/// A Python package installed into a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPackage {
    pub id: String,
    pub name: String,
    pub project_id: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub home_page: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Deserialize)]
struct PackagesEnvelope {
    packages: Vec<ProjectPackage>,
}

#[derive(Deserialize)]
struct AddPackageEnvelope {
    package: ProjectPackage,
}

#[derive(Debug, Deserialize)]
pub struct RemovePackageResponse {
    pub id: String,
}

impl ApiClient {
    pub async fn list_packages(&self, project_id: &str) -> Result<Vec<ProjectPackage>, ApiError> {
        let envelope: PackagesEnvelope = self
            .get_json("package", &[("project_id", project_id)])
            .await?;
        Ok(envelope.packages)
    }

    pub async fn add_package(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<ProjectPackage, ApiError> {
        let envelope: AddPackageEnvelope = self
            .post_json(
                "package",
                &serde_json::json!({ "name": name, "project_id": project_id }),
            )
            .await?;
        Ok(envelope.package)
    }

    pub async fn remove_package(&self, package_id: &str) -> Result<RemovePackageResponse, ApiError> {
        self.delete_json(&format!("package/{package_id}")).await
    }
}
