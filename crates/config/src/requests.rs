//! Records request DTO and validation.
//!
//! The records endpoint takes raw query parameters; this module checks their
//! shape against the active profile before any upstream call is made.
//! Every violation is collected so a single response can report them all.

use crate::profile::AppConfig;
use crate::sources::SortDirection;
use dashboard_shared::{ErrorCode, ErrorEnvelope, Validated};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;

const BASE_ID_PREFIX: &str = "app";
const TABLE_ID_PREFIX: &str = "tbl";
const RECORD_ID_LEN: usize = 17;
const MAX_FILTER_FORMULA_CHARS: usize = 1000;
const DANGEROUS_FORMULA_PATTERNS: [&str; 5] = [
    "javascript:",
    "eval(",
    "script>",
    "DROP TABLE",
    "DELETE FROM",
];

/// Records request query parameters (boundary DTO).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordsRequestDto {
    /// Airtable base id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    /// Airtable table id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Raw record cap; absent means fetch everything up to the profile limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<String>,
    /// Airtable filter formula.
    #[serde(
        default,
        rename = "filterByFormula",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter_formula: Option<String>,
}

/// Validated records request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsRequest {
    /// Airtable base id.
    pub base_id: Box<str>,
    /// Airtable table id.
    pub table_id: Box<str>,
    /// Record cap, if one was requested.
    pub max_records: Option<u32>,
    /// Filter formula, if one was requested.
    pub filter_formula: Option<Box<str>>,
    /// Sort field and direction when the table is in the active mapping.
    pub sort: Option<(Box<str>, SortDirection)>,
}

/// Validated records request proof.
pub type ValidatedRecordsRequest = Validated<RecordsRequest>;

/// A single records-request violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// A required parameter is missing or empty.
    MissingField {
        /// Parameter name.
        field: &'static str,
    },
    /// An id does not have the expected prefix and length.
    InvalidIdFormat {
        /// Parameter name.
        field: &'static str,
        /// Required prefix.
        prefix: &'static str,
    },
    /// `maxRecords` is not an integer.
    InvalidInt {
        /// Raw value.
        value: String,
    },
    /// `maxRecords` is zero or negative.
    NotPositive {
        /// Raw value.
        value: String,
    },
    /// `maxRecords` is above the profile's total record cap.
    ExceedsLimit {
        /// Raw value.
        value: String,
        /// Configured cap.
        limit: u32,
    },
    /// The filter formula contains a blocked pattern.
    DangerousPattern {
        /// Matched pattern.
        pattern: &'static str,
    },
    /// The filter formula is too long.
    FormulaTooLong {
        /// Length in characters.
        len: usize,
    },
}

impl RequestValidationError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingField { .. } => ErrorCode::new("config", "missing_field"),
            Self::InvalidIdFormat { .. } | Self::InvalidInt { .. } => {
                ErrorCode::new("config", "invalid_field")
            },
            Self::NotPositive { .. } | Self::ExceedsLimit { .. } => {
                ErrorCode::new("config", "out_of_range")
            },
            Self::DangerousPattern { .. } | Self::FormulaTooLong { .. } => {
                ErrorCode::new("config", "invalid_filter_formula")
            },
        }
    }

    const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::InvalidIdFormat { field, .. } => *field,
            Self::InvalidInt { .. } | Self::NotPositive { .. } | Self::ExceedsLimit { .. } => {
                "maxRecords"
            },
            Self::DangerousPattern { .. } | Self::FormulaTooLong { .. } => "filterByFormula",
        }
    }
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(formatter, "{field} is required"),
            Self::InvalidIdFormat { field, prefix } => write!(
                formatter,
                "{field} must start with '{prefix}' and be {RECORD_ID_LEN} characters long"
            ),
            Self::InvalidInt { .. } => formatter.write_str("maxRecords must be a valid integer"),
            Self::NotPositive { .. } => {
                formatter.write_str("maxRecords must be a positive integer")
            },
            Self::ExceedsLimit { limit, .. } => write!(
                formatter,
                "maxRecords cannot exceed {} (configured limit)",
                group_thousands(*limit)
            ),
            Self::DangerousPattern { pattern } => write!(
                formatter,
                "Filter formula contains potentially dangerous pattern: {pattern}"
            ),
            Self::FormulaTooLong { .. } => write!(
                formatter,
                "Filter formula is too long (max {MAX_FILTER_FORMULA_CHARS} characters)"
            ),
        }
    }
}

impl std::error::Error for RequestValidationError {}

impl From<RequestValidationError> for ErrorEnvelope {
    fn from(error: RequestValidationError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message).with_metadata("field", error.field());

        match error {
            RequestValidationError::MissingField { .. } => envelope,
            RequestValidationError::InvalidIdFormat { prefix, .. } => {
                envelope.with_metadata("prefix", prefix)
            },
            RequestValidationError::InvalidInt { value }
            | RequestValidationError::NotPositive { value } => {
                envelope.with_metadata("value", value)
            }
            RequestValidationError::ExceedsLimit { value, limit } => envelope
                .with_metadata("value", value)
                .with_metadata("max", limit.to_string()),
            RequestValidationError::DangerousPattern { pattern } => {
                envelope.with_metadata("pattern", pattern)
            },
            RequestValidationError::FormulaTooLong { len } => envelope
                .with_metadata("len", len.to_string())
                .with_metadata("max", MAX_FILTER_FORMULA_CHARS.to_string()),
        }
    }
}

/// Validate a records request against the active profile.
///
/// On failure the envelope carries the first violation's code and metadata,
/// with every violation message joined by `"; "`.
pub fn validate_records_request(
    dto: &RecordsRequestDto,
    config: &AppConfig,
) -> Result<ValidatedRecordsRequest, ErrorEnvelope> {
    let mut errors = Vec::new();

    let base_id = check_record_id(&mut errors, "baseId", BASE_ID_PREFIX, dto.base_id.as_deref());
    let table_id = check_record_id(
        &mut errors,
        "tableId",
        TABLE_ID_PREFIX,
        dto.table_id.as_deref(),
    );
    let max_records = match dto.max_records.as_deref() {
        None | Some("") => None,
        Some(raw) => match check_max_records(raw, config.pagination.max_total_records) {
            Ok(value) => Some(value),
            Err(error) => {
                errors.push(error);
                None
            },
        },
    };
    let filter_formula = match dto.filter_formula.as_deref() {
        None | Some("") => None,
        Some(formula) => {
            errors.extend(check_filter_formula(formula));
            Some(formula)
        },
    };

    if let Some(first) = errors.first().cloned() {
        let count = errors.len();
        let mut envelope = ErrorEnvelope::from(first);
        envelope.message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        tracing::debug!(violations = count, reason = %envelope.message, "records request rejected");
        return Err(envelope.with_metadata("violations", count.to_string()));
    }

    let (Some(base_id), Some(table_id)) = (base_id, table_id) else {
        return Err(ErrorEnvelope::from(RequestValidationError::MissingField {
            field: "baseId",
        }));
    };

    let sort = config
        .sort_for_table(table_id)
        .map(|(field, direction)| (Box::from(field), direction));

    Ok(Validated::new(RecordsRequest {
        base_id: base_id.into(),
        table_id: table_id.into(),
        max_records,
        filter_formula: filter_formula.map(Box::from),
        sort,
    }))
}

/// Parse and validate a records request from JSON.
pub fn parse_records_request_json(
    input: &str,
    config: &AppConfig,
) -> Result<ValidatedRecordsRequest, ErrorEnvelope> {
    let dto: RecordsRequestDto = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid records request JSON: {error}"),
        )
        .with_metadata("request_kind", "records")
    })?;
    validate_records_request(&dto, config)
}

fn check_record_id<'a>(
    errors: &mut Vec<RequestValidationError>,
    field: &'static str,
    prefix: &'static str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        None | Some("") => {
            errors.push(RequestValidationError::MissingField { field });
            None
        },
        Some(id) if !id.starts_with(prefix) || id.chars().count() != RECORD_ID_LEN => {
            errors.push(RequestValidationError::InvalidIdFormat { field, prefix });
            None
        },
        Some(id) => Some(id),
    }
}

fn check_max_records(raw: &str, limit: u32) -> Result<u32, RequestValidationError> {
    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(error) => {
            return Err(match error.kind() {
                IntErrorKind::PosOverflow => RequestValidationError::ExceedsLimit {
                    value: raw.to_owned(),
                    limit,
                },
                IntErrorKind::NegOverflow => RequestValidationError::NotPositive {
                    value: raw.to_owned(),
                },
                _ => RequestValidationError::InvalidInt {
                    value: raw.to_owned(),
                },
            });
        },
    };

    if value <= 0 {
        return Err(RequestValidationError::NotPositive {
            value: raw.to_owned(),
        });
    }
    match u32::try_from(value) {
        Ok(value) if value <= limit => Ok(value),
        _ => Err(RequestValidationError::ExceedsLimit {
            value: raw.to_owned(),
            limit,
        }),
    }
}

// Every pattern is matched case-insensitively, SQL keywords included.
fn check_filter_formula(formula: &str) -> Vec<RequestValidationError> {
    let lowered = formula.to_lowercase();
    let mut errors: Vec<RequestValidationError> = DANGEROUS_FORMULA_PATTERNS
        .into_iter()
        .filter(|pattern| lowered.contains(&pattern.to_lowercase()))
        .map(|pattern| RequestValidationError::DangerousPattern { pattern })
        .collect();

    let len = formula.chars().count();
    if len > MAX_FILTER_FORMULA_CHARS {
        errors.push(RequestValidationError::FormulaTooLong { len });
    }
    errors
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::profile::resolve_profile;
    use std::error::Error;

    fn dto(base_id: &str, table_id: &str) -> RecordsRequestDto {
        RecordsRequestDto {
            base_id: Some(base_id.to_string()),
            table_id: Some(table_id.to_string()),
            ..RecordsRequestDto::default()
        }
    }

    #[test]
    fn accepts_known_table_and_attaches_sort() -> Result<(), Box<dyn Error>> {
        let client = ClientConfig::cellular_zone();
        let config = resolve_profile(None, Some(&client));
        let mut request = dto("app9JgRBZC2GNlaKM", "tbl0Er1mMwZO1Pvfj");
        request.max_records = Some("250".to_string());

        let validated = validate_records_request(&request, &config)?;
        assert_eq!(validated.max_records, Some(250));
        assert_eq!(
            validated.sort,
            Some((Box::from("Date Created"), SortDirection::Desc))
        );
        Ok(())
    }

    #[test]
    fn unknown_table_has_no_sort() -> Result<(), Box<dyn Error>> {
        let config = resolve_profile(None, None);
        let request = dto("appAAAAAAAAAAAAAA", "tblBBBBBBBBBBBBBB");
        let validated = validate_records_request(&request, &config)?;
        assert_eq!(validated.sort, None);
        assert_eq!(validated.max_records, None);
        Ok(())
    }

    #[test]
    fn joins_every_violation() -> Result<(), Box<dyn Error>> {
        let config = resolve_profile(None, None);
        let request = RecordsRequestDto {
            base_id: None,
            table_id: Some("tblShort".to_string()),
            max_records: Some("abc".to_string()),
            filter_formula: Some("eval(1)".to_string()),
        };

        let error = validate_records_request(&request, &config)
            .err()
            .ok_or_else(|| std::io::Error::other("expected validation error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "missing_field"));
        assert_eq!(
            error.message,
            "baseId is required; \
             tableId must start with 'tbl' and be 17 characters long; \
             maxRecords must be a valid integer; \
             Filter formula contains potentially dangerous pattern: eval("
        );
        assert_eq!(
            error.metadata.get("violations").map(String::as_str),
            Some("4")
        );
        Ok(())
    }

    #[test]
    fn max_records_respects_profile_limit() {
        let production = resolve_profile(Some("production"), None);
        let mut request = dto("appAAAAAAAAAAAAAA", "tblBBBBBBBBBBBBBB");
        request.max_records = Some("5001".to_string());

        let error = validate_records_request(&request, &production).err();
        assert!(matches!(
            error,
            Some(envelope) if envelope.message == "maxRecords cannot exceed 5,000 (configured limit)"
        ));

        request.max_records = Some("0".to_string());
        let error = validate_records_request(&request, &production).err();
        assert!(matches!(
            error,
            Some(envelope) if envelope.code == ErrorCode::new("config", "out_of_range")
        ));
    }

    #[test]
    fn blocked_patterns_match_any_case() {
        let errors = check_filter_formula("{Name} = 'x'; drop table users");
        assert_eq!(
            errors,
            vec![RequestValidationError::DangerousPattern {
                pattern: "DROP TABLE"
            }]
        );
        assert!(check_filter_formula("AND({Status} = 'Won')").is_empty());
        assert_eq!(
            check_filter_formula("DELETE FROM leads; EVAL(1)"),
            vec![
                RequestValidationError::DangerousPattern { pattern: "eval(" },
                RequestValidationError::DangerousPattern {
                    pattern: "DELETE FROM"
                },
            ]
        );

        let long = "a".repeat(MAX_FILTER_FORMULA_CHARS + 1);
        assert_eq!(
            check_filter_formula(&long),
            vec![RequestValidationError::FormulaTooLong {
                len: MAX_FILTER_FORMULA_CHARS + 1
            }]
        );
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(100), "100");
        assert_eq!(group_thousands(5_000), "5,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
