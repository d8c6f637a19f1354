//! CSV rendering of leads for the admin export.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::AppError;
use crate::models::Lead;
use crate::roi_calculator::{company_type_label, use_case_label};

const HEADERS: [&str; 16] = [
    "Email",
    "First Name",
    "Last Name",
    "Company",
    "Phone",
    "Company Type",
    "Use Case",
    "ROI Model",
    "Monthly Hours Saved",
    "Annual Savings",
    "Backfill Savings",
    "FTEs Avoided",
    "Status",
    "Created At",
    "Contacted At",
    "Notes",
];

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Zero and missing figures both render as an empty cell.
fn number(value: Option<f64>) -> String {
    value
        .filter(|v| *v != 0.0)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn lead_record(lead: &Lead) -> [String; 16] {
    [
        lead.email.clone(),
        text(&lead.first_name),
        text(&lead.last_name),
        text(&lead.company_name),
        text(&lead.phone),
        lead.company_type
            .as_deref()
            .map(company_type_label)
            .unwrap_or_default()
            .to_string(),
        lead.use_case
            .as_deref()
            .map(use_case_label)
            .unwrap_or_default()
            .to_string(),
        text(&lead.roi_model),
        number(lead.monthly_hours_saved),
        number(lead.annual_savings),
        number(lead.backfill_cost_saved),
        number(lead.ftes_avoided),
        lead.status.clone(),
        timestamp(Some(lead.created_at)),
        timestamp(lead.contacted_at),
        text(&lead.notes),
    ]
}

/// Renders leads as CSV with a header row. Every field is quoted.
pub fn leads_to_csv(leads: &[Lead]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(HEADERS)
        .map_err(|e| AppError::InternalError(format!("CSV header write failed: {}", e)))?;

    for lead in leads {
        writer.write_record(lead_record(lead)).map_err(|e| {
            AppError::InternalError(format!("CSV write failed for lead {}: {}", lead.id, e))
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::InternalError(format!("CSV output is not UTF-8: {}", e)))
}

/// Attachment name for an export taken at `now`.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("leads-{}.csv", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn sample_lead() -> Lead {
        Lead {
            id: Uuid::nil(),
            email: "ops@firm.com".to_string(),
            first_name: Some("Dana".to_string()),
            last_name: None,
            company_name: Some("Acme \"Wealth\" Partners".to_string()),
            phone: Some("+16502530000".to_string()),
            company_type: Some("wealth_management".to_string()),
            use_case: Some("m_and_a_transitions".to_string()),
            roi_model: Some("fte_avoidance".to_string()),
            fte_cost: Some(85000.0),
            backfill_rate_type: Some("consultant".to_string()),
            monthly_documents: Some(1500),
            annual_backfill: Some(18000),
            m_and_a_transactions_per_year: Some(3),
            avg_households_per_transaction: Some(200),
            historical_households_to_migrate: Some(600),
            annual_new_clients: None,
            annual_investors_onboarded: None,
            monthly_hours_saved: Some(500.0),
            annual_savings: Some(245192.31),
            backfill_cost_saved: Some(90000.0),
            ftes_avoided: Some(2.88),
            strategic_benefits: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            ip_address: None,
            user_agent: None,
            referrer: None,
            status: "contacted".to_string(),
            notes: Some("Call back, \"after Q3\"\nwith CFO".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 0).unwrap(),
            updated_at: None,
            contacted_at: None,
        }
    }

    #[test]
    fn test_header_row() {
        let csv = leads_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "\"Email\",\"First Name\",\"Last Name\",\"Company\",\"Phone\",\"Company Type\",\
             \"Use Case\",\"ROI Model\",\"Monthly Hours Saved\",\"Annual Savings\",\
             \"Backfill Savings\",\"FTEs Avoided\",\"Status\",\"Created At\",\"Contacted At\",\
             \"Notes\"\n"
        );
    }

    #[test]
    fn test_row_rendering() {
        let csv = leads_to_csv(&[sample_lead()]).unwrap();
        let row = csv.split_once('\n').unwrap().1;

        assert!(row.starts_with("\"ops@firm.com\",\"Dana\",\"\",\"Acme \"\"Wealth\"\" Partners\","));
        assert!(row.contains("\"Wealth Management Firm\",\"M&A Transitions\",\"fte_avoidance\""));
        assert!(row.contains("\"500\",\"245192.31\",\"90000\",\"2.88\",\"contacted\""));
        assert!(row.contains("\"2026-03-01T14:05:00Z\",\"\","));
        assert!(row.ends_with("\"Call back, \"\"after Q3\"\"\nwith CFO\"\n"));
    }

    #[test]
    fn test_unknown_tags_echoed() {
        let mut lead = sample_lead();
        lead.company_type = Some("family_office".to_string());
        lead.use_case = None;
        let csv = leads_to_csv(&[lead]).unwrap();
        assert!(csv.contains("\"family_office\",\"\",\"fte_avoidance\""));
    }

    #[test]
    fn test_zero_figures_render_empty() {
        let mut lead = sample_lead();
        lead.backfill_cost_saved = Some(0.0);
        lead.ftes_avoided = None;
        let csv = leads_to_csv(&[lead]).unwrap();
        assert!(csv.contains("\"500\",\"245192.31\",\"\",\"\",\"contacted\""));
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 0).unwrap();
        assert_eq!(export_filename(now), "leads-2026-10-16.csv");
    }
}
