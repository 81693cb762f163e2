//! Queue status types

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Job status as reported by the queue service
///
/// `Unknown` is the local default before the first snapshot. It is also what
/// a missing, null or unrecognized wire value decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Statuses after which polling stops for good
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Statuses that count as the job being alive in the queue
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Parameters carried to the results view once a job completes
///
/// Scalar values of any JSON type are taken as their text form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedirectParams {
    #[serde(default, deserialize_with = "scalar_text")]
    pub request_id: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub train_name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub date: String,
}

impl RedirectParams {
    fn is_complete(&self) -> bool {
        !self.request_id.is_empty() && !self.train_name.is_empty() && !self.date.is_empty()
    }
}

/// One decoded response of the status endpoint
///
/// Every field except `status` is optional on the wire and may be null.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default, deserialize_with = "null_as_unknown")]
    pub status: Status,

    /// Queue position, meaningful only while pending
    #[serde(default, deserialize_with = "loose_position")]
    pub position: Option<i64>,

    /// Estimated wait in whole seconds, meaningful only while pending
    #[serde(
        default,
        rename = "estimated_time",
        alias = "estimatedTimeSeconds",
        deserialize_with = "loose_seconds"
    )]
    pub estimated_time_seconds: Option<u64>,

    /// Server-reported hard error, distinct from a failed job
    #[serde(default)]
    pub error: Option<String>,

    /// Human-readable detail for failed or cancelled jobs
    #[serde(default, rename = "errorMessage", alias = "error_message")]
    pub error_message: Option<String>,

    #[serde(default)]
    pub redirect_params: Option<RedirectParams>,
}

impl StatusSnapshot {
    /// Snapshot with only a status set
    pub fn with_status(status: Status) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Redirect parameters, if all three values are present
    ///
    /// A partially filled object is treated the same as a missing one.
    pub fn redirect(&self) -> Option<&RedirectParams> {
        self.redirect_params.as_ref().filter(|p| p.is_complete())
    }

    /// Hard error text, ignoring blank values
    pub fn hard_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Failure detail text, ignoring blank values
    pub fn failure_detail(&self) -> Option<&str> {
        self.error_message.as_deref().filter(|e| !e.trim().is_empty())
    }
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Status>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON value, narrowed to what a readout or a URL can use
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Other(#[allow(dead_code)] IgnoredAny),
}

impl Loose {
    /// Rounded integer value; numeric strings count, anything else is `None`
    fn whole_number(self) -> Option<i64> {
        let n = match self {
            Self::Integer(n) => return Some(n),
            Self::Float(n) => n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(_) | Self::Other(_) => return None,
        };
        n.is_finite().then(|| n.round() as i64)
    }

    /// Text form of a scalar; null and structured values are empty
    fn into_text(self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Other(_) => String::new(),
        }
    }
}

fn loose_position<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.whole_number())
}

fn loose_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?
        .whole_number()
        .and_then(|n| u64::try_from(n).ok()))
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.into_text())
}
