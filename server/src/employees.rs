use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use platform_api::{ApiError, ApiResult};
use products_hr::{Employee, EmployeeInput};
use serde::Serialize;
use tracing::info;

use crate::http::AppState;

pub const DELETED_MESSAGE: &str = "Deleted Successfully";

/// Wire shape of a record. `departments` repeats `department` for dashboard
/// builds that still read the old field name.
#[derive(Debug, Serialize)]
pub struct EmployeeBody {
    #[serde(flatten)]
    employee: Employee,
    departments: String,
}

impl From<Employee> for EmployeeBody {
    fn from(employee: Employee) -> Self {
        let departments = employee.department.clone();
        Self {
            employee,
            departments,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EmployeeBody>> {
    info!(employee_id = %id, "GET employee by id");
    state
        .employees
        .get_by_id(&id)
        .await
        .map_err(ApiError::internal)?
        .map(|employee| Json(employee.into()))
        .ok_or(ApiError::NotFound("employee"))
}

async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<EmployeeBody>> {
    info!("POST create employee");
    let Json(input) = payload.map_err(invalid_body)?;
    let created = state
        .employees
        .create(input)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(created.into()))
}

async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<EmployeeBody>>> {
    info!("GET all employees");
    let all = state
        .employees
        .get_all()
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(all.into_iter().map(EmployeeBody::from).collect()))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<EmployeeBody>> {
    info!(employee_id = %id, "PUT update employee");
    let Json(patch) = payload.map_err(invalid_body)?;
    state
        .employees
        .update(&id, patch)
        .await
        .map_err(ApiError::internal)?
        .map(|employee| Json(employee.into()))
        .ok_or(ApiError::NotFound("employee"))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    info!(employee_id = %id, "DELETE employee");
    state
        .employees
        .delete_by_id(&id)
        .await
        .map_err(ApiError::internal)?;
    Ok(DELETED_MESSAGE)
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidInput(rejection.body_text())
}
