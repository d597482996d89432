use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Collection;
use crate::error::Result;
use crate::http_client::PaylocityClient;
use crate::response::ApiResponse;

/// Scheduled earning on an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earning {
    #[serde(default)]
    pub earning_code: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub frequency: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outbound earning body for add-or-update
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningInput {
    pub earning_code: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn earnings_path(employee_id: &str) -> String {
    format!("employees/{}/earnings", employee_id)
}

fn earning_path(employee_id: &str, earning_code: &str, start_date: &str) -> String {
    format!(
        "employees/{}/earnings/{}/{}",
        employee_id, earning_code, start_date
    )
}

impl Earning {
    /// GET `employees/{id}/earnings`
    pub async fn all(client: &PaylocityClient, employee_id: &str) -> Result<Collection<Earning>> {
        Collection::from_response(client.get(&earnings_path(employee_id), false).await?)
    }

    /// GET `employees/{id}/earnings/{code}/{start_date}`
    pub async fn find(
        client: &PaylocityClient,
        employee_id: &str,
        earning_code: &str,
        start_date: &str,
    ) -> Result<Earning> {
        client
            .get(&earning_path(employee_id, earning_code, start_date), false)
            .await?
            .into_model()
    }

    /// PUT `employees/{id}/earnings`; adds or replaces by code and start date
    pub async fn upsert(
        client: &PaylocityClient,
        employee_id: &str,
        input: &EarningInput,
    ) -> Result<ApiResponse> {
        client.put(&earnings_path(employee_id), input, false).await
    }

    /// DELETE `employees/{id}/earnings/{code}/{start_date}`
    pub async fn delete(
        client: &PaylocityClient,
        employee_id: &str,
        earning_code: &str,
        start_date: &str,
    ) -> Result<ApiResponse> {
        client
            .delete(&earning_path(employee_id, earning_code, start_date), false)
            .await
    }
}
