//! ROI calculation engine.
//!
//! Maps business inputs for one of four document-processing use cases onto
//! hours saved, cost saved and FTE equivalents. Nothing in here does I/O, so
//! the same inputs always give the same result.
//!
//! The recurring component is valued either as hours saved at the analyst
//! hourly rate (`time_savings`) or as recurring FTEs avoided at the fully
//! loaded FTE cost (`fte_avoidance`). One-time backfill work is always valued
//! at an hourly rate, either the analyst (staff) rate or the consultant rate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Working hours in one FTE year (40 hours a week for 52 weeks).
pub const HOURS_PER_FTE_YEAR: f64 = 2080.0;

/// Fully loaded annual cost of one FTE when the caller supplies none.
pub const DEFAULT_FTE_COST: f64 = 85_000.0;

/// Lookback window used to estimate historical households for M&A backfill.
pub const HISTORICAL_LOOKBACK_YEARS: u64 = 3;

const FALLBACK_TRIAGE_MINUTES: u32 = 5;
const FALLBACK_DATA_ENTRY_MINUTES: u32 = 15;
const FALLBACK_ANALYST_RATE: f64 = 50.0;
const FALLBACK_CONSULTANT_RATE: f64 = 150.0;

// ============ Tags ============

/// The four predefined document-processing scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UseCase {
    #[serde(rename = "critical_business_process")]
    CriticalBusinessProcess,
    #[serde(rename = "m_and_a_transitions")]
    MAndATransitions,
    #[serde(rename = "prospects_onboarding")]
    ProspectsOnboarding,
    #[serde(rename = "new_investor_onboarding")]
    NewInvestorOnboarding,
}

impl UseCase {
    pub const ALL: [UseCase; 4] = [
        UseCase::CriticalBusinessProcess,
        UseCase::MAndATransitions,
        UseCase::ProspectsOnboarding,
        UseCase::NewInvestorOnboarding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::CriticalBusinessProcess => "critical_business_process",
            UseCase::MAndATransitions => "m_and_a_transitions",
            UseCase::ProspectsOnboarding => "prospects_onboarding",
            UseCase::NewInvestorOnboarding => "new_investor_onboarding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UseCase::CriticalBusinessProcess => "Critical Business Process",
            UseCase::MAndATransitions => "M&A Transitions",
            UseCase::ProspectsOnboarding => "Prospects & Onboarding",
            UseCase::NewInvestorOnboarding => "New Investor Onboarding",
        }
    }

    /// Number of source systems the calculator form pre-selects.
    pub fn default_systems(&self) -> u32 {
        match self {
            UseCase::MAndATransitions => 3,
            _ => 2,
        }
    }

    pub fn default_roi_model(&self) -> RoiModel {
        match self {
            UseCase::CriticalBusinessProcess | UseCase::MAndATransitions => RoiModel::TimeSavings,
            UseCase::ProspectsOnboarding | UseCase::NewInvestorOnboarding => {
                RoiModel::FteAvoidance
            }
        }
    }

    pub fn default_backfill_rate_type(&self) -> BackfillRateType {
        match self {
            UseCase::MAndATransitions => BackfillRateType::Consultant,
            _ => BackfillRateType::Staff,
        }
    }

    /// Singular noun for the per-unit metric ("hours per <unit>").
    pub fn unit_label(&self) -> &'static str {
        match self {
            UseCase::CriticalBusinessProcess => "document",
            UseCase::MAndATransitions => "transition",
            UseCase::ProspectsOnboarding => "client",
            UseCase::NewInvestorOnboarding => "investor",
        }
    }

    pub fn strategic_roi(&self) -> StrategicRoi {
        match self {
            UseCase::CriticalBusinessProcess => StrategicRoi {
                quantifiable: &[
                    "Hours saved on manual extraction",
                    "FTE avoidance",
                    "Consultant cost avoidance",
                ],
                strategic: &[
                    "Flag discrepancies between billing actuals and fee schedules",
                    "Avoid using outdated agreements",
                    "Enable data-driven billing strategy changes",
                    "Use data for marketing to different client segments",
                ],
            },
            UseCase::MAndATransitions => StrategicRoi {
                quantifiable: &[
                    "Hours saved per transition",
                    "FTE avoidance per acquisition",
                    "Consultant cost avoidance on backfill",
                ],
                strategic: &[
                    "Eliminate \"all hands on deck\" fire drills for each acquisition",
                    "Remove Excel burden from acquired firms",
                    "Client data keeps pace with account migration",
                    "Hit/beat 60-day integration benchmark",
                    "Build track record that attracts better targets",
                ],
            },
            UseCase::ProspectsOnboarding => StrategicRoi {
                quantifiable: &[
                    "Hours saved per new client",
                    "FTE avoidance",
                    "Reduced rework from errors",
                ],
                strategic: &[
                    "Faster time-to-revenue",
                    "Fewer NIGOs (Not In Good Order)",
                    "Scale prospect volume without scaling ops team",
                    "Unlock existing client organic growth by bringing data online",
                ],
            },
            UseCase::NewInvestorOnboarding => StrategicRoi {
                quantifiable: &[
                    "Hours saved per investor onboarded",
                    "FTE avoidance",
                    "Reduced cycle time to capital deployment",
                ],
                strategic: &[
                    "Faster capital deployment",
                    "Stop passing burden to advisors and investors",
                    "Close the gap between \"tech-forward\" marketing and operational reality",
                    "Unlock subscription doc recycling",
                    "Competitive differentiation vs. other platforms",
                ],
            },
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UseCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UseCase::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| format!("unknown use case '{}'", s))
    }
}

/// Use case as received from an untyped boundary.
///
/// Form submissions may carry tags this build does not know about. Those are
/// kept verbatim and produce a degraded (zero per-unit, empty narrative)
/// result instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseCaseTag {
    Known(UseCase),
    Unknown(String),
}

impl UseCaseTag {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<UseCase>() {
            Ok(use_case) => UseCaseTag::Known(use_case),
            Err(_) => UseCaseTag::Unknown(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<UseCase> {
        match self {
            UseCaseTag::Known(use_case) => Some(*use_case),
            UseCaseTag::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UseCaseTag::Known(use_case) => use_case.as_str(),
            UseCaseTag::Unknown(raw) => raw,
        }
    }

    /// Display label; unknown tags are echoed as-is.
    pub fn label(&self) -> &str {
        match self {
            UseCaseTag::Known(use_case) => use_case.label(),
            UseCaseTag::Unknown(raw) => raw,
        }
    }
}

impl From<UseCase> for UseCaseTag {
    fn from(use_case: UseCase) -> Self {
        UseCaseTag::Known(use_case)
    }
}

/// Prospect's business type. Labeling and filtering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    WealthManagement,
    PrivateMarketsPlatform,
    PointSolutionsB2b,
}

impl CompanyType {
    pub const ALL: [CompanyType; 3] = [
        CompanyType::WealthManagement,
        CompanyType::PrivateMarketsPlatform,
        CompanyType::PointSolutionsB2b,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyType::WealthManagement => "wealth_management",
            CompanyType::PrivateMarketsPlatform => "private_markets_platform",
            CompanyType::PointSolutionsB2b => "point_solutions_b2b",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompanyType::WealthManagement => "Wealth Management Firm",
            CompanyType::PrivateMarketsPlatform => "Private Markets Platform",
            CompanyType::PointSolutionsB2b => "Point Solutions / B2B",
        }
    }
}

impl FromStr for CompanyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompanyType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown company type '{}'", s))
    }
}

/// Label for a raw company-type tag; unknown tags are echoed as-is.
pub fn company_type_label(raw: &str) -> &str {
    match raw.parse::<CompanyType>() {
        Ok(company_type) => company_type.label(),
        Err(_) => raw,
    }
}

/// Label for a raw use-case tag; unknown tags are echoed as-is.
pub fn use_case_label(raw: &str) -> &str {
    match raw.parse::<UseCase>() {
        Ok(use_case) => use_case.label(),
        Err(_) => raw,
    }
}

/// Economic model for the recurring savings component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiModel {
    TimeSavings,
    FteAvoidance,
}

impl RoiModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoiModel::TimeSavings => "time_savings",
            RoiModel::FteAvoidance => "fte_avoidance",
        }
    }
}

impl FromStr for RoiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time_savings" => Ok(RoiModel::TimeSavings),
            "fte_avoidance" => Ok(RoiModel::FteAvoidance),
            other => Err(format!("unknown ROI model '{}'", other)),
        }
    }
}

/// Which hourly rate prices one-time backfill work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillRateType {
    Staff,
    Consultant,
}

impl BackfillRateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackfillRateType::Staff => "staff",
            BackfillRateType::Consultant => "consultant",
        }
    }
}

impl FromStr for BackfillRateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(BackfillRateType::Staff),
            "consultant" => Ok(BackfillRateType::Consultant),
            other => Err(format!("unknown backfill rate type '{}'", other)),
        }
    }
}

// ============ Configuration ============

/// Global ROI defaults, normally loaded from the `roi_defaults` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    /// Minutes spent triaging one document.
    pub triage_time_per_doc: u32,
    /// Minutes spent keying one document.
    pub data_entry_time_per_doc: u32,
    pub analyst_hourly_rate: f64,
    /// Consultant rate used for backfill when the rate type is `consultant`.
    pub backfill_hourly_rate: f64,
    pub docs_per_household: u32,
    pub docs_per_client: u32,
    pub docs_per_investor: u32,
    pub data_utilization_baseline: Option<f64>,
    pub roi_notes: Option<String>,
}

impl Default for RoiConfig {
    /// Fallback used when the defaults row has not been seeded.
    fn default() -> Self {
        Self {
            triage_time_per_doc: FALLBACK_TRIAGE_MINUTES,
            data_entry_time_per_doc: FALLBACK_DATA_ENTRY_MINUTES,
            analyst_hourly_rate: FALLBACK_ANALYST_RATE,
            backfill_hourly_rate: FALLBACK_CONSULTANT_RATE,
            docs_per_household: 10,
            docs_per_client: 10,
            docs_per_investor: 5,
            data_utilization_baseline: None,
            roi_notes: None,
        }
    }
}

impl RoiConfig {
    /// Triage + data entry minutes per document. Zero entries fall back to 5 and 15.
    pub fn total_minutes_per_doc(&self) -> f64 {
        let triage = non_zero_or(self.triage_time_per_doc, FALLBACK_TRIAGE_MINUTES);
        let entry = non_zero_or(self.data_entry_time_per_doc, FALLBACK_DATA_ENTRY_MINUTES);
        f64::from(triage) + f64::from(entry)
    }

    pub fn effective_analyst_rate(&self) -> f64 {
        positive_or(self.analyst_hourly_rate, FALLBACK_ANALYST_RATE)
    }

    pub fn effective_consultant_rate(&self) -> f64 {
        positive_or(self.backfill_hourly_rate, FALLBACK_CONSULTANT_RATE)
    }
}

/// Per-calculation overrides. `None` keeps the default's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoiConfigOverride {
    pub triage_time_per_doc: Option<u32>,
    pub data_entry_time_per_doc: Option<u32>,
    pub analyst_hourly_rate: Option<f64>,
    pub backfill_hourly_rate: Option<f64>,
    pub docs_per_household: Option<u32>,
    pub docs_per_client: Option<u32>,
    pub docs_per_investor: Option<u32>,
    pub data_utilization_baseline: Option<f64>,
    pub roi_notes: Option<String>,
}

/// Resolves every field of `defaults` against an optional override.
///
/// Rate overrides of zero or non-finite values fall back to the default rate.
/// Blank notes are treated as absent.
pub fn merge_roi_config(defaults: &RoiConfig, overrides: Option<&RoiConfigOverride>) -> RoiConfig {
    let Some(overrides) = overrides else {
        return defaults.clone();
    };

    let usable_rate = |rate: Option<f64>| rate.filter(|r| r.is_finite() && *r > 0.0);

    RoiConfig {
        triage_time_per_doc: overrides
            .triage_time_per_doc
            .unwrap_or(defaults.triage_time_per_doc),
        data_entry_time_per_doc: overrides
            .data_entry_time_per_doc
            .unwrap_or(defaults.data_entry_time_per_doc),
        analyst_hourly_rate: usable_rate(overrides.analyst_hourly_rate)
            .unwrap_or(defaults.analyst_hourly_rate),
        backfill_hourly_rate: usable_rate(overrides.backfill_hourly_rate)
            .unwrap_or(defaults.backfill_hourly_rate),
        docs_per_household: overrides
            .docs_per_household
            .unwrap_or(defaults.docs_per_household),
        docs_per_client: overrides.docs_per_client.unwrap_or(defaults.docs_per_client),
        docs_per_investor: overrides
            .docs_per_investor
            .unwrap_or(defaults.docs_per_investor),
        data_utilization_baseline: overrides
            .data_utilization_baseline
            .or(defaults.data_utilization_baseline),
        roi_notes: overrides
            .roi_notes
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| defaults.roi_notes.clone()),
    }
}

// ============ Inputs / Outputs ============

/// Typed calculation inputs. Volumes are already coerced to non-negative counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationInputs {
    pub use_case: Option<UseCaseTag>,
    pub roi_model: Option<RoiModel>,
    pub backfill_rate_type: Option<BackfillRateType>,
    /// Annual FTE cost; `None` means [`DEFAULT_FTE_COST`].
    pub fte_cost: Option<f64>,
    pub monthly_documents: u64,
    pub annual_backfill: u64,
    pub m_and_a_transactions_per_year: u64,
    pub avg_households_per_transaction: u64,
    pub historical_households_to_migrate: u64,
    pub annual_new_clients: u64,
    pub annual_investors_onboarded: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCounts {
    pub monthly_documents: u64,
    pub annual_backfill: u64,
}

/// Output of [`calculate_roi`]. Currency, hour and FTE figures carry two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiResult {
    pub monthly_hours_saved: f64,
    /// Always priced at the analyst rate, whatever the model or backfill rate
    /// type, so the monthly figure reads the same across models.
    pub monthly_cost_saved: f64,
    pub backfill_hours_saved: f64,
    pub backfill_cost_saved: f64,
    pub annual_savings: f64,
    pub annual_recurring_savings: f64,
    pub ftes_avoided: f64,

    pub hours_per_unit: f64,
    pub unit_label: &'static str,

    pub derived_monthly_documents: u64,
    pub derived_annual_backfill: u64,

    pub roi_model: RoiModel,
    pub backfill_rate_type: BackfillRateType,
    pub fte_cost: f64,
    pub backfill_rate_used: f64,
}

/// Quantifiable and qualitative talking points for a use case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrategicRoi {
    pub quantifiable: &'static [&'static str],
    pub strategic: &'static [&'static str],
}

impl StrategicRoi {
    pub const EMPTY: StrategicRoi = StrategicRoi {
        quantifiable: &[],
        strategic: &[],
    };
}

// ============ Engine ============

/// Historical households implied by the M&A pipeline over the lookback window.
pub fn estimate_historical_households(
    transactions_per_year: u64,
    avg_households_per_transaction: u64,
) -> u64 {
    transactions_per_year
        .saturating_mul(HISTORICAL_LOOKBACK_YEARS)
        .saturating_mul(avg_households_per_transaction)
}

/// Monthly and one-time backfill document volumes for the selected use case.
pub fn derive_document_counts(inputs: &CalculationInputs, config: &RoiConfig) -> DocumentCounts {
    let direct_backfill = inputs.annual_backfill;

    let use_case = inputs.use_case.as_ref().and_then(UseCaseTag::known);
    match use_case {
        Some(UseCase::CriticalBusinessProcess) => DocumentCounts {
            monthly_documents: inputs.monthly_documents,
            annual_backfill: direct_backfill,
        },
        Some(UseCase::MAndATransitions) => {
            let docs_per_household = u64::from(config.docs_per_household);
            let annual_docs = inputs
                .m_and_a_transactions_per_year
                .saturating_mul(inputs.avg_households_per_transaction)
                .saturating_mul(docs_per_household);

            // Structural estimate wins over the direct figure when present
            let derived_backfill = inputs
                .historical_households_to_migrate
                .saturating_mul(docs_per_household);

            DocumentCounts {
                monthly_documents: monthly_from_annual(annual_docs),
                annual_backfill: if derived_backfill > 0 {
                    derived_backfill
                } else {
                    direct_backfill
                },
            }
        }
        Some(UseCase::ProspectsOnboarding) => DocumentCounts {
            monthly_documents: monthly_from_annual(
                inputs
                    .annual_new_clients
                    .saturating_mul(u64::from(config.docs_per_client)),
            ),
            annual_backfill: direct_backfill,
        },
        Some(UseCase::NewInvestorOnboarding) => DocumentCounts {
            monthly_documents: monthly_from_annual(
                inputs
                    .annual_investors_onboarded
                    .saturating_mul(u64::from(config.docs_per_investor)),
            ),
            annual_backfill: direct_backfill,
        },
        None => DocumentCounts {
            monthly_documents: 0,
            annual_backfill: direct_backfill,
        },
    }
}

/// Computes ROI metrics, or `None` when no use case was selected.
pub fn calculate_roi(inputs: &CalculationInputs, config: &RoiConfig) -> Option<RoiResult> {
    let tag = inputs.use_case.as_ref()?;
    let use_case = tag.known();

    let minutes_per_doc = config.total_minutes_per_doc();
    let analyst_rate = config.effective_analyst_rate();
    let consultant_rate = config.effective_consultant_rate();

    let roi_model = inputs
        .roi_model
        .or_else(|| use_case.map(|u| u.default_roi_model()))
        .unwrap_or(RoiModel::TimeSavings);
    let backfill_rate_type = inputs
        .backfill_rate_type
        .or_else(|| use_case.map(|u| u.default_backfill_rate_type()))
        .unwrap_or(BackfillRateType::Staff);
    let fte_cost = inputs
        .fte_cost
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(DEFAULT_FTE_COST);

    let backfill_rate = match backfill_rate_type {
        BackfillRateType::Consultant => consultant_rate,
        BackfillRateType::Staff => analyst_rate,
    };

    let counts = derive_document_counts(inputs, config);

    let monthly_hours_saved = counts.monthly_documents as f64 * minutes_per_doc / 60.0;
    let backfill_hours_saved = counts.annual_backfill as f64 * minutes_per_doc / 60.0;
    let recurring_hours_saved = monthly_hours_saved * 12.0;
    let annual_hours_saved = recurring_hours_saved + backfill_hours_saved;
    let ftes_avoided = annual_hours_saved / HOURS_PER_FTE_YEAR;

    let annual_recurring_savings = match roi_model {
        RoiModel::FteAvoidance => (recurring_hours_saved / HOURS_PER_FTE_YEAR) * fte_cost,
        RoiModel::TimeSavings => recurring_hours_saved * analyst_rate,
    };
    // Backfill is one-time labor, never standing headcount
    let backfill_cost_saved = backfill_hours_saved * backfill_rate;
    let annual_savings = annual_recurring_savings + backfill_cost_saved;

    let monthly_cost_saved = monthly_hours_saved * analyst_rate;

    let hours_per_unit = match use_case {
        Some(UseCase::CriticalBusinessProcess) => minutes_per_doc / 60.0,
        Some(UseCase::MAndATransitions) => {
            inputs.avg_households_per_transaction as f64
                * f64::from(config.docs_per_household)
                * minutes_per_doc
                / 60.0
        }
        Some(UseCase::ProspectsOnboarding) => {
            f64::from(config.docs_per_client) * minutes_per_doc / 60.0
        }
        Some(UseCase::NewInvestorOnboarding) => {
            f64::from(config.docs_per_investor) * minutes_per_doc / 60.0
        }
        None => 0.0,
    };

    tracing::debug!(
        use_case = tag.as_str(),
        monthly_documents = counts.monthly_documents,
        annual_backfill = counts.annual_backfill,
        roi_model = roi_model.as_str(),
        "ROI calculated"
    );

    Some(RoiResult {
        monthly_hours_saved: round_cents(monthly_hours_saved),
        monthly_cost_saved: round_cents(monthly_cost_saved),
        backfill_hours_saved: round_cents(backfill_hours_saved),
        backfill_cost_saved: round_cents(backfill_cost_saved),
        annual_savings: round_cents(annual_savings),
        annual_recurring_savings: round_cents(annual_recurring_savings),
        ftes_avoided: round_cents(ftes_avoided),
        hours_per_unit: round_cents(hours_per_unit),
        unit_label: use_case.map(|u| u.unit_label()).unwrap_or(""),
        derived_monthly_documents: counts.monthly_documents,
        derived_annual_backfill: counts.annual_backfill,
        roi_model,
        backfill_rate_type,
        fte_cost,
        backfill_rate_used: backfill_rate,
    })
}

/// Built-in narrative for a raw use-case tag. Unknown tags get empty lists.
pub fn get_strategic_roi(use_case: &str) -> StrategicRoi {
    match UseCaseTag::parse(use_case) {
        UseCaseTag::Known(use_case) => use_case.strategic_roi(),
        UseCaseTag::Unknown(_) => StrategicRoi::EMPTY,
    }
}

/// Rounds half-up to two decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

fn monthly_from_annual(annual: u64) -> u64 {
    (annual as f64 / 12.0 + 0.5).floor() as u64
}

fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
