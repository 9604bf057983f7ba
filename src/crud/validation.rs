use serde_json::Value;

use crate::crud::request::CrudRequest;
use crate::error::{ApiError, ValidationFailure};

/// Where a validator looks for its value in the request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Param,
    Query,
    Body,
}

impl Location {
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Param => "param",
            Location::Query => "query",
            Location::Body => "body",
        }
    }
}

#[derive(Debug, Clone)]
enum Rule {
    Required,
    NotEmpty,
    IsString,
    IsNumber,
}

/// A single field validator. Rules accumulate in declaration order; each
/// failing rule produces one `ValidationFailure`.
#[derive(Debug, Clone)]
pub struct Validator {
    location: Location,
    field: String,
    rules: Vec<Rule>,
    message: Option<String>,
}

impl Validator {
    fn new(location: Location, field: impl Into<String>) -> Self {
        Self {
            location,
            field: field.into(),
            rules: Vec::new(),
            message: None,
        }
    }

    /// Validate the `:id` path parameter.
    pub fn param(field: impl Into<String>) -> Self {
        Self::new(Location::Param, field)
    }

    pub fn query(field: impl Into<String>) -> Self {
        Self::new(Location::Query, field)
    }

    pub fn body(field: impl Into<String>) -> Self {
        Self::new(Location::Body, field)
    }

    pub fn required(mut self) -> Self {
        self.rules.push(Rule::Required);
        self
    }

    pub fn not_empty(mut self) -> Self {
        self.rules.push(Rule::NotEmpty);
        self
    }

    pub fn is_string(mut self) -> Self {
        self.rules.push(Rule::IsString);
        self
    }

    pub fn is_number(mut self) -> Self {
        self.rules.push(Rule::IsNumber);
        self
    }

    /// Override the default message for every rule on this validator.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn value(&self, request: &CrudRequest) -> Option<Value> {
        match self.location {
            Location::Param => request.id.clone().map(Value::String),
            Location::Query => request.query.get(&self.field).cloned().map(Value::String),
            Location::Body => request.body.get(&self.field).cloned(),
        }
    }

    fn check(&self, request: &CrudRequest, failures: &mut Vec<ValidationFailure>) {
        let value = self.value(request);
        for rule in &self.rules {
            let broken = match rule {
                Rule::Required => value.is_none().then_some("is required"),
                Rule::NotEmpty => match &value {
                    None | Some(Value::Null) => Some("must not be empty"),
                    Some(Value::String(s)) if s.trim().is_empty() => Some("must not be empty"),
                    _ => None,
                },
                Rule::IsString => match &value {
                    Some(v) if !v.is_string() => Some("must be a string"),
                    _ => None,
                },
                Rule::IsNumber => match &value {
                    Some(Value::Number(_)) | None => None,
                    Some(Value::String(s)) if s.parse::<f64>().is_ok() => None,
                    Some(_) => Some("must be a number"),
                },
            };
            if let Some(default_message) = broken {
                failures.push(ValidationFailure::new(
                    self.location.as_str(),
                    self.field.clone(),
                    self.message.clone().unwrap_or_else(|| default_message.into()),
                ));
            }
        }
    }
}

/// An ordered sequence of validators, run in full against the incoming
/// request before the handler executes. Any failure short-circuits the
/// handler and returns the complete failure list.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    validators: Vec<Validator>,
}

impl Validation {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn run(&self, request: &CrudRequest) -> Result<(), ApiError> {
        let mut failures = Vec::new();
        for validator in &self.validators {
            validator.check(request, &mut failures);
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(failures))
        }
    }
}

impl From<Validator> for Validation {
    fn from(validator: Validator) -> Self {
        Self {
            validators: vec![validator],
        }
    }
}

impl From<Vec<Validator>> for Validation {
    fn from(validators: Vec<Validator>) -> Self {
        Self { validators }
    }
}
