use std::fmt;
use std::fmt::Formatter;
use serde::{Deserialize, Serialize};

/// Form values as submitted by the user, one instance per "optimize" action
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct UserInput {
    pub lat: f64,
    pub lon: f64,
    pub panel_count: u32,
    pub panel_watts: u32,
}

impl Default for UserInput {
    fn default() -> Self {
        Self { lat: 26.91, lon: 75.78, panel_count: 20, panel_watts: 550 }
    }
}

/// Input after rounding, ready to be sent to the production estimate API
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NormalizedInput {
    pub lat: f64,
    pub lon: f64,
    pub capacity_kw: f64,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ApiError,
    NoData,
    Exception,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EstimateError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EstimateError {
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        Self { kind, message: message.to_string() }
    }

    pub fn exception(message: &str) -> Self {
        Self::new(ErrorKind::Exception, message)
    }
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Outcome of one submission, either an annual AC estimate, along with the input it was
/// requested for, or an error to show the user
#[derive(Clone, Debug, PartialEq)]
pub enum ProductionEstimate {
    Success { annual_ac_kwh: f64, input: NormalizedInput },
    Failure(EstimateError),
}
