use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{CategoryId, ExpenseId, Status};

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not set up the http client: {0}")]
    Setup(#[source] reqwest::Error),
    #[error("{method} {path}: request failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path}: http error {status}")]
    Status {
        method: Method,
        path: String,
        status: u16,
    },
    #[error("{operation}: unexpected response shape: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("fixture {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The REST operations the tracker relies on. Implemented over HTTP by [`PizzariaClient`];
/// tests substitute an in-memory double.
pub trait ExpenseApi {
    fn list_expenses(&self) -> Result<Vec<Expense>, ApiError>;
    fn get_expense(&self, id: ExpenseId) -> Result<Expense, ApiError>;
    fn create_expense(&self, draft: &ExpenseDraft) -> Result<Expense, ApiError>;
    fn update_expense(&self, id: ExpenseId, update: &ExpenseUpdate) -> Result<Expense, ApiError>;
    fn delete_expense(&self, id: ExpenseId) -> Result<(), ApiError>;
    fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    fn create_category(&self, draft: &CategoryDraft) -> Result<Category, ApiError>;
    fn seed_categories(&self) -> Result<(), ApiError>;
    fn statistics(&self) -> Result<Statistics, ApiError>;
}

#[derive(Debug, Clone)]
pub enum ClientMode {
    Http { base_url: String, timeout: Duration },
    Fixtures(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PizzariaClient {
    backend: Backend,
}

// The reqwest client owns the connection pool; it is built once per `PizzariaClient`.
#[derive(Debug, Clone)]
enum Backend {
    Http {
        base_url: String,
        http: reqwest::blocking::Client,
    },
    Fixtures(PathBuf),
}

impl PizzariaClient {
    pub fn new(mode: ClientMode) -> Result<Self, ApiError> {
        let backend = match mode {
            ClientMode::Fixtures(dir) => Backend::Fixtures(dir),
            ClientMode::Http { base_url, timeout } => {
                let http = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(ApiError::Setup)?;
                Backend::Http { base_url, http }
            }
        };
        Ok(Self { backend })
    }

    fn call(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        match &self.backend {
            Backend::Fixtures(dir) => {
                let path = dir.join(format!("{operation}.json"));
                let s = fs::read_to_string(&path).map_err(|source| ApiError::Fixture {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(operation, fixture = %path.display(), "serving fixture");
                parse_body(operation, &s)
            }
            Backend::Http { base_url, http } => {
                let path = format!("{API_PREFIX}{path}");
                let url = format!("{}{path}", base_url.trim_end_matches('/'));
                let transport = |source| ApiError::Transport {
                    method: method.clone(),
                    path: path.clone(),
                    source,
                };

                tracing::debug!(operation, %method, %url, "sending request");
                let mut req = http.request(method.clone(), &url);
                if let Some(b) = body.as_ref() {
                    req = req.json(b);
                }

                let resp = req.send().map_err(transport)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(ApiError::Status {
                        method: method.clone(),
                        path: path.clone(),
                        status: status.as_u16(),
                    });
                }
                let text = resp.text().map_err(transport)?;
                parse_body(operation, &text)
            }
        }
    }

    fn call_typed<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let v = self.call(operation, method, path, body)?;
        serde_json::from_value(v).map_err(|source| ApiError::Decode { operation, source })
    }
}

// Success bodies of DELETE and seed are informational; an empty body is accepted.
fn parse_body(operation: &'static str, s: &str) -> Result<Value, ApiError> {
    if s.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(s).map_err(|source| ApiError::Decode { operation, source })
}

fn encode<T: Serialize>(operation: &'static str, body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|source| ApiError::Decode { operation, source })
}

impl ExpenseApi for PizzariaClient {
    fn list_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        self.call_typed("ListExpenses", Method::GET, "/despesas", None)
    }

    fn get_expense(&self, id: ExpenseId) -> Result<Expense, ApiError> {
        self.call_typed("GetExpense", Method::GET, &format!("/despesas/{id}"), None)
    }

    fn create_expense(&self, draft: &ExpenseDraft) -> Result<Expense, ApiError> {
        let body = encode("CreateExpense", draft)?;
        self.call_typed("CreateExpense", Method::POST, "/despesas", Some(body))
    }

    fn update_expense(&self, id: ExpenseId, update: &ExpenseUpdate) -> Result<Expense, ApiError> {
        let body = encode("UpdateExpense", update)?;
        self.call_typed(
            "UpdateExpense",
            Method::PUT,
            &format!("/despesas/{id}"),
            Some(body),
        )
    }

    fn delete_expense(&self, id: ExpenseId) -> Result<(), ApiError> {
        self.call("DeleteExpense", Method::DELETE, &format!("/despesas/{id}"), None)?;
        Ok(())
    }

    fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.call_typed("ListCategories", Method::GET, "/categorias", None)
    }

    fn create_category(&self, draft: &CategoryDraft) -> Result<Category, ApiError> {
        let body = encode("CreateCategory", draft)?;
        self.call_typed("CreateCategory", Method::POST, "/categorias", Some(body))
    }

    fn seed_categories(&self) -> Result<(), ApiError> {
        self.call("SeedCategories", Method::POST, "/seed-categorias", None)?;
        Ok(())
    }

    fn statistics(&self) -> Result<Statistics, ApiError> {
        self.call_typed("Statistics", Method::GET, "/estatisticas", None)
    }
}

/// The server emits `null` for missing dates, older rows sometimes carry `""`.
fn empty_date_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(
        rename = "data_vencimento",
        default,
        deserialize_with = "empty_date_as_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        rename = "data_pagamento",
        default,
        deserialize_with = "empty_date_as_none"
    )]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Expense {
    /// Calendar date part of `created_at` (`2024-05-01T18:30:00` or `2024-05-01 18:30:00`).
    pub fn created_date(&self) -> Option<NaiveDate> {
        let head = self.created_at.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

/// Body for creating an expense, and for full edits. Optional fields are sent as `null` when
/// empty so that a full edit can clear them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseDraft {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data_vencimento")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "data_pagamento")]
    pub payment_date: Option<NaiveDate>,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExpenseUpdate {
    Full(ExpenseDraft),
    Status { status: Status },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "cor", default = "default_category_color")]
    pub color: String,
}

pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

fn default_category_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "cor")]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Statistics {
    #[serde(rename = "total_despesas")]
    pub total_expenses: u64,
    #[serde(rename = "total_valor")]
    pub total_amount: f64,
    #[serde(rename = "despesas_pendentes")]
    pub pending: u64,
    #[serde(rename = "despesas_pagas")]
    pub paid: u64,
}
