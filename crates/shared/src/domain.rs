use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The two exchange cycles a holder can run against a remote party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    Verify,
    Issue,
}

impl ExchangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Issue => "issue",
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when an endpoint string may be submitted. Only blank input is
/// refused; the URL itself is passed through to the service untouched.
pub fn is_submittable_endpoint(endpoint: &str) -> bool {
    !endpoint.trim().is_empty()
}

/// Description of a pending presentation request, as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPrompt {
    pub name: String,
    pub domain: String,
    pub purpose: String,
    pub trusted_by_issuer: bool,
}

/// Description of a pending issuance, including the fields the issuer wants
/// filled in before it creates the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePrompt {
    pub name: String,
    pub domain: String,
    pub purpose: String,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

/// User-editable values for an issuance. Keys are fixed when the form is
/// seeded, in the order the issuer listed them; only their values change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldForm {
    values: IndexMap<String, String>,
}

impl FieldForm {
    pub fn from_fields(fields: IndexMap<String, String>) -> Self {
        Self { values: fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replaces the value of an existing field. Returns false if the form has
    /// no field with that name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }
}

impl From<IssuePrompt> for FieldForm {
    fn from(prompt: IssuePrompt) -> Self {
        Self::from_fields(prompt.fields)
    }
}
