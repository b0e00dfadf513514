use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billforge_core::{DomainError, DomainResult, Entity, EntityId, TenantId, ValidationErrors};

/// Client identifier (tenant-scoped via the `tenant_id` field on the record).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub EntityId);

impl ClientId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(EntityId::new())
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Client status lifecycle.
///
/// Inactive clients drop out of the active-client count but stay selectable
/// on invoices that already reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn is_active(self) -> bool {
        self == ClientStatus::Active
    }

    pub fn toggled(self) -> Self {
        match self {
            ClientStatus::Active => ClientStatus::Inactive,
            ClientStatus::Inactive => ClientStatus::Active,
        }
    }
}

/// Submitted client details. Optional fields arrive as `None` when the form
/// field was left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ClientInput {
    /// Field-scoped validation of the submitted details.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Client name is required");
        }

        if let Some(email) = self.email.as_deref() {
            let email = email.trim();
            if !email.is_empty() && !looks_like_email(email) {
                errors.add("email", "Invalid email address");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

/// Minimal shape check: something before and after a single `@`.
fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => !local.is_empty() && domain.contains('.'),
        _ => false,
    }
}

/// A billed party belonging to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Validate the input and build a new active client.
    pub fn new(
        id: ClientId,
        tenant_id: TenantId,
        input: ClientInput,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            tenant_id,
            name: input.name.trim().to_string(),
            email: normalized(input.email),
            phone: normalized(input.phone),
            company: normalized(input.company),
            address: normalized(input.address),
            notes: normalized(input.notes),
            status: ClientStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable details with freshly validated input.
    pub fn apply(&mut self, input: ClientInput, now: DateTime<Utc>) -> DomainResult<()> {
        input.validate()?;
        self.name = input.name.trim().to_string();
        self.email = normalized(input.email);
        self.phone = normalized(input.phone);
        self.company = normalized(input.company);
        self.address = normalized(input.address);
        self.notes = normalized(input.notes);
        self.updated_at = now;
        Ok(())
    }

    pub fn set_status(&mut self, status: ClientStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Empty strings from cleared form fields collapse to `None`.
fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn valid_input() -> ClientInput {
        ClientInput {
            name: "Acme Corp".to_string(),
            email: Some("billing@acme.test".to_string()),
            phone: Some("+1 555 0100".to_string()),
            company: Some("Acme".to_string()),
            address: None,
            notes: None,
        }
    }

    #[test]
    fn new_client_starts_active() {
        let client = Client::new(
            ClientId::generate(),
            test_tenant_id(),
            valid_input(),
            test_time(),
        )
        .unwrap();

        assert_eq!(client.status, ClientStatus::Active);
        assert!(client.is_active());
        assert_eq!(client.name, "Acme Corp");
    }

    #[test]
    fn rejects_blank_name() {
        let input = ClientInput {
            name: "   ".to_string(),
            ..ClientInput::default()
        };

        let err = Client::new(ClientId::generate(), test_tenant_id(), input, test_time())
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert!(errors.contains("name"));
            }
            _ => panic!("Expected Validation error for blank name"),
        }
    }

    #[test]
    fn rejects_malformed_email() {
        let input = ClientInput {
            name: "Acme".to_string(),
            email: Some("not-an-email".to_string()),
            ..ClientInput::default()
        };

        let err = input.validate().unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("email")),
            _ => panic!("Expected Validation error for email"),
        }
    }

    #[test]
    fn empty_email_is_allowed() {
        let input = ClientInput {
            name: "Acme".to_string(),
            email: Some("   ".to_string()),
            ..ClientInput::default()
        };

        assert!(input.validate().is_ok());

        let client = Client::new(ClientId::generate(), test_tenant_id(), input, test_time())
            .unwrap();
        assert_eq!(client.email, None);
    }

    #[test]
    fn toggling_status_flips_between_active_and_inactive() {
        let mut client = Client::new(
            ClientId::generate(),
            test_tenant_id(),
            valid_input(),
            test_time(),
        )
        .unwrap();

        client.set_status(client.status.toggled(), test_time());
        assert_eq!(client.status, ClientStatus::Inactive);
        assert!(!client.is_active());

        client.set_status(client.status.toggled(), test_time());
        assert_eq!(client.status, ClientStatus::Active);
    }

    #[test]
    fn apply_replaces_details_and_touches_updated_at() {
        let created = test_time();
        let mut client =
            Client::new(ClientId::generate(), test_tenant_id(), valid_input(), created).unwrap();

        let later = created + chrono::Duration::seconds(5);
        client
            .apply(
                ClientInput {
                    name: "Acme Industries".to_string(),
                    email: None,
                    phone: None,
                    company: None,
                    address: Some("1 Main St".to_string()),
                    notes: Some("prefers net-15".to_string()),
                },
                later,
            )
            .unwrap();

        assert_eq!(client.name, "Acme Industries");
        assert_eq!(client.email, None);
        assert_eq!(client.address.as_deref(), Some("1 Main St"));
        assert_eq!(client.updated_at, later);
        assert_eq!(client.created_at, created);
    }
}
