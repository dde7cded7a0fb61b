//! Account and token types

use serde::{Deserialize, Serialize};

use super::de::string_or_number;

/// Token pair returned by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Caller-supplied credentials. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Tokens {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Account of a personal plan user (`GET /v1/me`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoAccountInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    pub uuid: String,
    pub plan: String,
}

/// Account of a business plan user (`GET /v1/me` with a channel key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmoBizAccountInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub name_furigana: String,
    pub email: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub organization_unit_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub plan: String,
}

/// Account information in the shape matching the client's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountDetails {
    Business(EmoBizAccountInfo),
    Personal(EmoAccountInfo),
}

impl AccountDetails {
    pub fn name(&self) -> &str {
        match self {
            Self::Business(info) => &info.name,
            Self::Personal(info) => &info.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Business(info) => &info.email,
            Self::Personal(info) => &info.email,
        }
    }

    /// Plan string as reported by the platform.
    pub fn plan(&self) -> &str {
        match self {
            Self::Business(info) => &info.plan,
            Self::Personal(info) => &info.plan,
        }
    }
}

/// Business account fields accepted by `PUT /v1/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub name: String,
    pub name_furigana: String,
    pub organization_name: String,
    pub organization_unit_name: String,
    pub phone_number: String,
}
