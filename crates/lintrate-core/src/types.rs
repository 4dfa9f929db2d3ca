use crate::model::Outcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Certificate {
    pub id: String,
    /// Issuing CA. `None` is reported under the empty CA name.
    pub issuer: Option<String>,
    pub subject: Option<String>,
    /// Raw issuance date text as stored.
    pub issued_at: Option<String>,
}

impl Certificate {
    pub fn issuer_name(&self) -> &str {
        self.issuer.as_deref().unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintDefinition {
    pub name: String,
    pub source: Option<String>,
    pub effective_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRecord {
    pub certificate_id: String,
    pub lint_name: String,
    pub result: Outcome,
}

/// One row of the grouped (CA, lint) query: the certificate it came from,
/// its raw issuance date and the raw outcome text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub certificate_id: String,
    pub issued_at: Option<String>,
    pub result: Option<String>,
}

/// An `error` outcome joined with its certificate's issuer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorResult {
    pub certificate_id: String,
    pub issuer: String,
    pub lint_name: String,
}
