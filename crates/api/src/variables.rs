use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

/// An environment variable attached to a project. Values are write-only:
/// the platform never returns them on reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    pub project_id: String,
    #[serde(default)]
    pub create_date: String,
}

#[derive(Deserialize)]
struct VariablesEnvelope {
    variables: Vec<ProjectVariable>,
}

#[derive(Deserialize)]
struct AddVariableEnvelope {
    variable: ProjectVariable,
}

#[derive(Debug, Deserialize)]
pub struct RemoveVariableResponse {
    pub id: String,
}

impl ApiClient {
    pub async fn list_variables(&self, project_id: &str) -> Result<Vec<ProjectVariable>, ApiError> {
        let envelope: VariablesEnvelope = self
            .get_json("variable", &[("project_id", project_id)])
            .await?;
        Ok(envelope.variables)
    }

    pub async fn add_variable(
        &self,
        project_id: &str,
        name: &str,
        value: &str,
    ) -> Result<ProjectVariable, ApiError> {
        let envelope: AddVariableEnvelope = self
            .post_json(
                "variable",
                &serde_json::json!({
                    "name": name,
                    "value": value,
                    "project_id": project_id,
                }),
            )
            .await?;
        Ok(envelope.variable)
    }

    pub async fn remove_variable(
        &self,
        variable_id: &str,
    ) -> Result<RemoveVariableResponse, ApiError> {
        self.delete_json(&format!("variable/{variable_id}")).await
    }
}
