use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Collection, Earning};
use crate::error::{PaylocityError, Result};
use crate::http_client::PaylocityClient;
use crate::response::ApiResponse;

/// Employee record as returned by the API, keys already snake_cased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,

    /// Every other field the endpoint returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outbound employee body, serialized in the API's camelCase
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Employee {
    /// GET `employees/`
    pub async fn all(client: &PaylocityClient) -> Result<Collection<Employee>> {
        Collection::from_response(client.get("employees/", false).await?)
    }

    /// GET `employees/{id}`
    pub async fn find(client: &PaylocityClient, employee_id: &str) -> Result<Employee> {
        client
            .get(&format!("employees/{}", employee_id), false)
            .await?
            .into_model()
    }

    /// POST `employees/`; the API answers with the new employee's id
    pub async fn create(client: &PaylocityClient, input: &EmployeeInput) -> Result<ApiResponse> {
        client.post("employees/", input, false).await
    }

    /// PATCH `employees/{id}` with only the fields that are set
    pub async fn update(
        client: &PaylocityClient,
        employee_id: &str,
        input: &EmployeeInput,
    ) -> Result<ApiResponse> {
        client
            .patch(&format!("employees/{}", employee_id), input, false)
            .await
    }

    /// Earnings on file for this employee
    pub async fn earnings(&self, client: &PaylocityClient) -> Result<Collection<Earning>> {
        let employee_id = self
            .employee_id
            .as_deref()
            .ok_or_else(|| PaylocityError::Decode("employee record has no employee_id".to_string()))?;
        Earning::all(client, employee_id).await
    }

    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_normalized_record() {
        let employee: Employee = serde_json::from_value(json!({
            "employee_id": "E1",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "work_address": {"city": "London"}
        }))
        .unwrap();

        assert_eq!(employee.employee_id.as_deref(), Some("E1"));
        assert_eq!(employee.full_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(employee.extra["work_address"]["city"], "London");
    }

    #[test]
    fn test_input_serializes_camel_case() {
        let input = EmployeeInput {
            first_name: Some("Ada".to_string()),
            ..EmployeeInput::default()
        };
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"firstName": "Ada"}));
    }
}
