//! Brain models and row shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Visibility of a brain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainStatus {
    Public,
    #[default]
    Private,
}

impl BrainStatus {
    /// The value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BrainStatus::Public => "public",
            BrainStatus::Private => "private",
        }
    }
}

/// Kind of brain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainType {
    #[default]
    Doc,
    Api,
    Composite,
}

/// A brain row from the `brains` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    /// Primary key, assigned by the backend.
    pub brain_id: Uuid,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: BrainStatus,
    /// Model override (e.g., "gpt-4").
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Prompt attached to this brain.
    #[serde(default)]
    pub prompt_id: Option<Uuid>,
    /// Last update timestamp.
    pub last_update: String,
    #[serde(default)]
    pub brain_type: BrainType,
}

/// HTTP method used by an API brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiBrainMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// One parameter of an API brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBrainDefinitionSchemaProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    /// Allowed values, if the parameter is an enumeration.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

/// Parameter schema of an API brain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiBrainDefinitionSchema {
    #[serde(default)]
    pub properties: Vec<ApiBrainDefinitionSchemaProperty>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// A secret an API brain needs at call time. Only the declaration, never the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiBrainDefinitionSecret {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A row from `api_brain_definition` (zero or one per brain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiBrainDefinition {
    pub brain_id: Uuid,
    pub method: ApiBrainMethod,
    pub url: String,
    #[serde(default)]
    pub params: ApiBrainDefinitionSchema,
    #[serde(default)]
    pub search_params: ApiBrainDefinitionSchema,
    #[serde(default)]
    pub secrets: Vec<ApiBrainDefinitionSecret>,
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub jq_instructions: Option<String>,
}

/// Public listing entry.
///
/// `brain_definition` is omitted from the serialized form when absent, and
/// its `secrets` are always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicBrain {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub number_of_subscribers: u64,
    pub last_update: String,
    pub brain_type: BrainType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brain_definition: Option<ApiBrainDefinition>,
}

/// Fields accepted when inserting a brain.
///
/// The API definition and secret values are written by other flows and have
/// no place here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainCreatePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: BrainStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<Uuid>,
    #[serde(default)]
    pub brain_type: BrainType,
}

impl BrainCreatePayload {
    /// A private doc brain with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: BrainStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a brain.
///
/// Only fields that are set are written. For nullable columns the outer
/// `Option` says whether the field is set and the inner one carries the value,
/// so `Some(None)` writes `null` while `None` leaves the column alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainUpdatableProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BrainStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub model: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub temperature: Option<Option<f32>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub max_tokens: Option<Option<u32>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub prompt_id: Option<Option<Uuid>>,
}

impl BrainUpdatableProperties {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A present key (even `null`) becomes `Some`; a missing key falls back to `default`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Result of deleting a brain.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// At least one row was removed. Rows are kept as returned by the backend.
    Deleted { rows: Vec<Value> },
    /// Nothing matched.
    NotFound,
}

impl DeleteOutcome {
    pub(crate) fn from_rows(rows: Vec<Value>) -> Self {
        if rows.is_empty() {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted { rows }
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }

    pub fn rows_affected(&self) -> usize {
        match self {
            DeleteOutcome::Deleted { rows } => rows.len(),
            DeleteOutcome::NotFound => 0,
        }
    }
}

/// Column projection used when reading a single brain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrainProjection {
    /// `*`
    #[default]
    AllColumns,
    /// `id:brain_id, name, *`
    Aliased,
}

impl BrainProjection {
    pub fn columns(&self) -> &'static str {
        match self {
            BrainProjection::AllColumns => "*",
            BrainProjection::Aliased => "id:brain_id, name, *",
        }
    }
}

// Row shapes returned by the public listing query.

/// An embedded resource: PostgREST returns to-one embeds as an object or,
/// on older versions, as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Embedded<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Embedded<T> {
    fn into_first(self) -> Option<T> {
        match self {
            Embedded::Many(items) => items.into_iter().next(),
            Embedded::One(item) => Some(item),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

/// An embedded `(count)` aggregate: `[{"count": n}]`. An empty wrapper reads as 0.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountAggregate {
    Wrapped(Vec<CountRow>),
    Scalar(u64),
}

impl CountAggregate {
    fn value(&self) -> u64 {
        match self {
            CountAggregate::Wrapped(rows) => rows.first().map(|row| row.count).unwrap_or(0),
            CountAggregate::Scalar(count) => *count,
        }
    }
}

/// `api_brain_definition` as embedded in the public listing. There is no
/// `secrets` field, so whatever the backend attaches is never parsed.
#[derive(Debug, Deserialize)]
struct PublicDefinitionRow {
    brain_id: Uuid,
    method: ApiBrainMethod,
    url: String,
    #[serde(default)]
    params: ApiBrainDefinitionSchema,
    #[serde(default)]
    search_params: ApiBrainDefinitionSchema,
    #[serde(default)]
    raw: bool,
    #[serde(default)]
    jq_instructions: Option<String>,
}

impl From<PublicDefinitionRow> for ApiBrainDefinition {
    fn from(row: PublicDefinitionRow) -> Self {
        Self {
            brain_id: row.brain_id,
            method: row.method,
            url: row.url,
            params: row.params,
            search_params: row.search_params,
            secrets: Vec::new(),
            raw: row.raw,
            jq_instructions: row.jq_instructions,
        }
    }
}

/// One row of the public listing query, before reshaping.
#[derive(Debug, Deserialize)]
pub(crate) struct PublicBrainRow {
    id: Uuid,
    name: String,
    #[serde(default)]
    description: Option<String>,
    last_update: String,
    brain_type: BrainType,
    #[serde(default)]
    brain_definition: Option<Embedded<PublicDefinitionRow>>,
    number_of_subscribers: CountAggregate,
}

impl From<PublicBrainRow> for PublicBrain {
    fn from(row: PublicBrainRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            number_of_subscribers: row.number_of_subscribers.value(),
            last_update: row.last_update,
            brain_type: row.brain_type,
            brain_definition: row
                .brain_definition
                .and_then(Embedded::into_first)
                .map(ApiBrainDefinition::from),
        }
    }
}
