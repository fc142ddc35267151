use serde::{Deserialize, Serialize};

use woodshop_core::{ClientId, DomainError, DomainResult, EmployeeId, Entity};

/// A client placing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    name: String,
    phone: Option<String>,
}

impl Client {
    pub fn new(id: ClientId, name: impl Into<String>, phone: Option<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("client name cannot be empty"));
        }
        Ok(Self { id, name, phone })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Employee role, as seen by the engine.
///
/// Managers create orders and arbitrate tasks; assemblers claim and execute
/// them; directors handle purchasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    Manager,
    Assembler,
    Director,
}

impl core::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            EmployeeRole::Manager => "manager",
            EmployeeRole::Assembler => "assembler",
            EmployeeRole::Director => "director",
        };
        f.write_str(s)
    }
}

/// An employee reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    role: EmployeeRole,
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>, role: EmployeeRole) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("employee name cannot be empty"));
        }
        Ok(Self { id, name, role })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> EmployeeRole {
        self.role
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_names() {
        let err = Client::new(ClientId::new(), "   ", None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Employee::new(EmployeeId::new(), "", EmployeeRole::Assembler).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn keeps_role() {
        let e = Employee::new(EmployeeId::new(), "Mira", EmployeeRole::Manager).unwrap();
        assert_eq!(e.role(), EmployeeRole::Manager);
        assert_eq!(e.role().to_string(), "manager");
    }
}
