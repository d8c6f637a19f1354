//! Conversion of loosely typed form submissions into engine inputs.
//!
//! Browsers post numbers as numbers, numeric strings, empty strings or not at
//! all. Volumes degrade to 0 and amounts to "absent" instead of rejecting the
//! submission, so a lead with incomplete business inputs is still captured.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::{CalculateRequest, RoiConfigOverrideRequest};
use crate::roi_calculator::{
    estimate_historical_households, CalculationInputs, RoiConfigOverride, UseCase, UseCaseTag,
};

fn float_prefix() -> &'static Regex {
    static FLOAT_PREFIX: OnceLock<Regex> = OnceLock::new();
    FLOAT_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
    })
}

/// Parses the leading integer of `raw` (`"12abc"` → 12, `"12.9"` → 12).
///
/// Missing digits and negative values give 0; overflow saturates.
pub fn parse_count_str(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    if digits.is_empty() || negative {
        return 0;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

/// Parses the leading decimal number of `raw`, if any.
pub fn parse_amount_str(raw: &str) -> Option<f64> {
    float_prefix()
        .find(raw.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Non-negative volume from an untyped value. Anything unusable is 0.
pub fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                v
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
                    _ => 0,
                }
            }
        }
        Some(Value::String(s)) => parse_count_str(s),
        _ => 0,
    }
}

/// Like [`coerce_count`] but keeps "not supplied" distinct from 0.
pub fn coerce_optional_count(value: Option<&Value>) -> Option<u64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => Some(coerce_count(other)),
    }
}

/// Positive amount (currency or ratio). Zero, negative, non-finite and
/// unparseable values are absent, letting the caller's default apply.
pub fn coerce_amount(value: Option<&Value>) -> Option<f64> {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount_str(s),
        _ => None,
    };
    amount.filter(|a| a.is_finite() && *a > 0.0)
}

/// Non-blank tag string.
pub fn coerce_tag(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl RoiConfigOverrideRequest {
    pub fn to_override(&self) -> RoiConfigOverride {
        let count = |v: &Option<Value>| {
            coerce_optional_count(v.as_ref()).map(|c| u32::try_from(c).unwrap_or(u32::MAX))
        };

        RoiConfigOverride {
            triage_time_per_doc: count(&self.triage_time_per_doc),
            data_entry_time_per_doc: count(&self.data_entry_time_per_doc),
            analyst_hourly_rate: coerce_amount(self.analyst_hourly_rate.as_ref()),
            backfill_hourly_rate: coerce_amount(self.backfill_hourly_rate.as_ref()),
            docs_per_household: count(&self.docs_per_household),
            docs_per_client: count(&self.docs_per_client),
            docs_per_investor: count(&self.docs_per_investor),
            data_utilization_baseline: coerce_amount(self.data_utilization_baseline.as_ref()),
            roi_notes: self.roi_notes.clone(),
        }
    }
}

impl CalculateRequest {
    /// Use case tag, when one was selected.
    pub fn use_case_tag(&self) -> Option<UseCaseTag> {
        coerce_tag(self.use_case.as_deref()).map(UseCaseTag::parse)
    }

    /// Typed engine inputs. Unknown model or rate-type strings count as
    /// absent so the use-case default applies.
    pub fn calculation_inputs(&self) -> CalculationInputs {
        let use_case = self.use_case_tag();

        let roi_model = coerce_tag(self.roi_model.as_deref()).and_then(|m| m.parse().ok());
        let backfill_rate_type =
            coerce_tag(self.backfill_rate_type.as_deref()).and_then(|t| t.parse().ok());

        let transactions = coerce_count(self.m_and_a_transactions_per_year.as_ref());
        let households_per_txn = coerce_count(self.avg_households_per_transaction.as_ref());

        let historical_households =
            match coerce_optional_count(self.historical_households_to_migrate.as_ref()) {
                Some(supplied) => supplied,
                None if matches!(use_case, Some(UseCaseTag::Known(UseCase::MAndATransitions))) => {
                    estimate_historical_households(transactions, households_per_txn)
                }
                None => 0,
            };

        CalculationInputs {
            use_case,
            roi_model,
            backfill_rate_type,
            fte_cost: coerce_amount(self.fte_cost.as_ref()),
            monthly_documents: coerce_count(self.monthly_documents.as_ref()),
            annual_backfill: coerce_count(self.annual_backfill.as_ref()),
            m_and_a_transactions_per_year: transactions,
            avg_households_per_transaction: households_per_txn,
            historical_households_to_migrate: historical_households,
            annual_new_clients: coerce_count(self.annual_new_clients.as_ref()),
            annual_investors_onboarded: coerce_count(self.annual_investors_onboarded.as_ref()),
        }
    }
}
