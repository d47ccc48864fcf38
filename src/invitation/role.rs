//! Roles and spaces
//!
//! Every role belongs to exactly one space. The table in [`Space::roles`]
//! is the only source of which roles may be granted in which space.

use serde::{Deserialize, Serialize};

/// Tenant-context partition a user lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    /// Staff of the operating business
    Internal,
    /// Users belonging to a client account
    Client,
    /// Sub-contractors
    Vendor,
}

impl Space {
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Internal => "internal",
            Space::Client => "client",
            Space::Vendor => "vendor",
        }
    }

    /// Roles that may be granted in this space
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Space::Internal => &[Role::Admin, Role::Sales, Role::Delivery, Role::Finance],
            Space::Client => &[Role::ClientAdmin, Role::ClientMember],
            Space::Vendor => &[Role::Vendor],
        }
    }

    pub fn all() -> [Space; 3] {
        [Space::Internal, Space::Client, Space::Vendor]
    }
}

impl std::str::FromStr for Space {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Space::Internal),
            "client" => Ok(Space::Client),
            "vendor" => Ok(Space::Vendor),
            _ => Err(format!("Invalid space: {}", s)),
        }
    }
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Sales,
    Delivery,
    Finance,
    ClientAdmin,
    ClientMember,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Delivery => "delivery",
            Role::Finance => "finance",
            Role::ClientAdmin => "client_admin",
            Role::ClientMember => "client_member",
            Role::Vendor => "vendor",
        }
    }

    /// The space this role belongs to
    pub fn space(&self) -> Space {
        match self {
            Role::Admin | Role::Sales | Role::Delivery | Role::Finance => Space::Internal,
            Role::ClientAdmin | Role::ClientMember => Space::Client,
            Role::Vendor => Space::Vendor,
        }
    }

    pub fn is_allowed_in(&self, space: Space) -> bool {
        space.roles().contains(self)
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Sales => "Sales",
            Role::Delivery => "Delivery",
            Role::Finance => "Finance",
            Role::ClientAdmin => "Client Admin",
            Role::ClientMember => "Client Member",
            Role::Vendor => "Vendor",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "sales" => Ok(Role::Sales),
            "delivery" => Ok(Role::Delivery),
            "finance" => Ok(Role::Finance),
            "client_admin" => Ok(Role::ClientAdmin),
            "client_member" => Ok(Role::ClientMember),
            "vendor" => Ok(Role::Vendor),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
