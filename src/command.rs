use crate::error::TempestError;
use std::collections::HashMap;
use std::str::FromStr;
use url::Url;

/// The closed set of commands the page may send.
///
/// Anything outside this set is a terminal error for that event; the
/// scheme is a browser-navigable surface, so the command is validated
/// here on every event rather than trusting the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    UpdateModels,
    LoadDatabase,
    LoadJobFromDatabase,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdateModels => "update_models",
            Self::LoadDatabase => "load_database",
            Self::LoadJobFromDatabase => "load_job_from_database",
        }
    }
}

impl FromStr for Command {
    type Err = TempestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update_models" => Ok(Self::UpdateModels),
            "load_database" => Ok(Self::LoadDatabase),
            "load_job_from_database" => Ok(Self::LoadJobFromDatabase),
            other => Err(TempestError::UnknownCommand(other.to_string())),
        }
    }
}

/// Percent-decoded query parameters, name to list of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn from_url(url: &Url) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url.query_pairs() {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    /// The canonical value of a repeatable parameter is its first one.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Like [`Self::first`], but a missing or empty value is an error
    /// naming the parameter.
    pub fn require_first(&self, key: &str) -> Result<&str, TempestError> {
        match self.first(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TempestError::MissingParameter(key.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `key=value` pairs in sorted key order, for log lines.
    pub fn summary(&self) -> String {
        let mut pairs: Vec<(&str, &[String])> = self
            .values
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
            .collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let mut parts = Vec::new();
        for (key, values) in pairs {
            for value in values {
                parts.push(format!("{key}={value}"));
            }
        }
        parts.join(", ")
    }
}

/// A custom-scheme navigation event, parsed and validated.
#[derive(Debug, Clone)]
pub struct SchemeRequest {
    pub command: Command,
    pub query: QueryParams,
}

impl SchemeRequest {
    pub fn from_url(url: &Url, expected_scheme: &str) -> Result<Self, TempestError> {
        if url.scheme() != expected_scheme {
            return Err(TempestError::BadRequest(format!(
                "unexpected scheme '{}:' (expected '{expected_scheme}:')",
                url.scheme()
            )));
        }
        let command = url.path().trim_start_matches('/').parse()?;
        Ok(Self {
            command,
            query: QueryParams::from_url(url),
        })
    }
}
