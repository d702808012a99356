//! Query construction types.
//!
//! A [`Request`] describes one round trip to the backend: either a table
//! operation with filters, or a call to a stored procedure. Requests are plain
//! data so they can be executed by [`crate::PostgrestClient`] or inspected by a
//! test double.

use std::fmt;

use serde_json::Value;

/// Filter operator, rendered as a PostgREST operator prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
}

impl Operator {
    /// The operator name as it appears in a query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
            Operator::Is => "is",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

impl Filter {
    /// Render the predicate value as a query parameter (e.g. `eq.public`).
    pub fn to_param(&self) -> String {
        format!("{}.{}", self.operator, self.value)
    }
}

/// What a table query does.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Read rows with the given projection (`*`, aliases, embedded selects).
    Select { columns: String },
    /// Insert one record (or an array of records).
    Insert { values: Value },
    /// Apply a partial record to every matching row.
    Update { values: Value },
    /// Remove every matching row.
    Delete,
}

impl Action {
    /// Whether this action mutates rows.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Select { .. })
    }
}

/// A filtered operation against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub action: Action,
    pub filters: Vec<Filter>,
}

impl TableQuery {
    /// Start a query on a table. Defaults to `select *`.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            action: Action::Select {
                columns: "*".to_string(),
            },
            filters: Vec::new(),
        }
    }

    /// Select with the given projection.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.action = Action::Select {
            columns: columns.into(),
        };
        self
    }

    /// Insert a record.
    pub fn insert(mut self, values: Value) -> Self {
        self.action = Action::Insert { values };
        self
    }

    /// Update matching rows with a partial record.
    pub fn update(mut self, values: Value) -> Self {
        self.action = Action::Update { values };
        self
    }

    /// Delete matching rows.
    pub fn delete(mut self) -> Self {
        self.action = Action::Delete;
        self
    }

    /// Add a predicate.
    pub fn filter(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl fmt::Display,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            operator,
            value: value.to_string(),
        });
        self
    }

    /// Add an equality predicate.
    pub fn eq(self, column: impl Into<String>, value: impl fmt::Display) -> Self {
        self.filter(column, Operator::Eq, value)
    }

    /// Add an equality predicate for every pair.
    pub fn match_all<K, V, I>(self, pairs: I) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(self, |query, (column, value)| query.eq(column, value))
    }

    /// Wrap into a [`Request`].
    pub fn into_request(self) -> Request {
        Request::Table(self)
    }
}

/// A call to a stored procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub function: String,
    pub args: Value,
}

impl RpcCall {
    /// Create an RPC call with a JSON object of named arguments.
    pub fn new(function: impl Into<String>, args: Value) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Wrap into a [`Request`].
    pub fn into_request(self) -> Request {
        Request::Rpc(self)
    }
}

/// One round trip to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Table(TableQuery),
    Rpc(RpcCall),
}

impl From<TableQuery> for Request {
    fn from(query: TableQuery) -> Self {
        Request::Table(query)
    }
}

impl From<RpcCall> for Request {
    fn from(call: RpcCall) -> Self {
        Request::Rpc(call)
    }
}
