//! HR vertical slice: create, read, update and delete employee records.

use std::sync::Arc;

use entity::employees;
use platform_db::{DbError, EmployeeStore};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub type Employee = employees::Model;

/// Client supplied fields. Anything missing becomes an empty string and an
/// `id` in the payload is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "EmployeeInputWire")]
pub struct EmployeeInput {
    pub name: String,
    pub email: String,
    pub department: String,
}

/// Older dashboard builds send `departments`; `department` wins when a body
/// carries both.
#[derive(Default, Deserialize)]
#[serde(default)]
struct EmployeeInputWire {
    name: String,
    email: String,
    department: Option<String>,
    departments: Option<String>,
}

impl From<EmployeeInputWire> for EmployeeInput {
    fn from(wire: EmployeeInputWire) -> Self {
        Self {
            name: wire.name,
            email: wire.email,
            department: wire.department.or(wire.departments).unwrap_or_default(),
        }
    }
}

impl EmployeeInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            department: department.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HrError {
    #[error("employee store failure")]
    Store(#[from] DbError),
}

pub type HrResult<T> = Result<T, HrError>;

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "hr.create_employee", skip_all)]
    pub async fn create(&self, input: EmployeeInput) -> HrResult<Employee> {
        info!("creating employee");
        let record = Employee {
            id: String::new(),
            name: input.name,
            email: input.email,
            department: input.department,
        };
        let saved = self.store.save(record).await?;
        info!(employee_id = %saved.id, "employee created");
        Ok(saved)
    }

    #[instrument(name = "hr.list_employees", skip_all)]
    pub async fn get_all(&self) -> HrResult<Vec<Employee>> {
        info!("fetching all employees");
        Ok(self.store.find_all().await?)
    }

    /// `None` when no record has this id.
    #[instrument(name = "hr.get_employee", skip(self))]
    pub async fn get_by_id(&self, id: &str) -> HrResult<Option<Employee>> {
        info!("fetching employee");
        Ok(self.store.find_by_id(id).await?)
    }

    /// Overwrite name, email and department of an existing record. Returns
    /// `None` without writing anything when the id is unknown.
    #[instrument(name = "hr.update_employee", skip(self, patch))]
    pub async fn update(&self, id: &str, patch: EmployeeInput) -> HrResult<Option<Employee>> {
        info!("updating employee");
        let Some(mut existing) = self.store.find_by_id(id).await? else {
            warn!("employee not found");
            return Ok(None);
        };
        existing.name = patch.name;
        existing.email = patch.email;
        existing.department = patch.department;
        let saved = self.store.save(existing).await?;
        info!(name = %saved.name, "employee updated");
        Ok(Some(saved))
    }

    #[instrument(name = "hr.delete_employee", skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> HrResult<()> {
        info!("deleting employee");
        self.store.delete_by_id(id).await?;
        Ok(())
    }

    /// Insert a handful of sample employees for local development.
    #[instrument(name = "hr.seed_employees", skip_all)]
    pub async fn seed_demo(&self) -> HrResult<Vec<Employee>> {
        let mut seeded = Vec::with_capacity(DEMO_EMPLOYEES.len());
        for (name, email, department) in DEMO_EMPLOYEES {
            seeded.push(self.create(EmployeeInput::new(*name, *email, *department)).await?);
        }
        info!(count = seeded.len(), "demo employees seeded");
        Ok(seeded)
    }
}

const DEMO_EMPLOYEES: &[(&str, &str, &str)] = &[
    ("Ada Lovelace", "ada@example.test", "Engineering"),
    ("Grace Hopper", "grace@example.test", "Research"),
    ("Katherine Johnson", "katherine@example.test", "Finance"),
];
