//! End-to-end engine scenarios against the default configuration.

use roi_lead_api::core::roi_calculator::{
    calculate_roi, get_strategic_roi, merge_roi_config, BackfillRateType, CalculationInputs,
    RoiConfig, RoiConfigOverride, RoiModel, UseCase, UseCaseTag,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.011,
        "expected {} to be within a cent of {}",
        actual,
        expected
    );
}

#[test]
fn critical_business_process_time_savings() {
    let inputs = CalculationInputs {
        use_case: Some(UseCase::CriticalBusinessProcess.into()),
        monthly_documents: 500,
        annual_backfill: 5000,
        ..Default::default()
    };

    let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();

    assert_eq!(result.roi_model, RoiModel::TimeSavings);
    assert_eq!(result.backfill_rate_type, BackfillRateType::Staff);
    assert_eq!(result.monthly_hours_saved, 166.67);
    assert_close(result.annual_recurring_savings, 100000.0);
    assert_eq!(result.backfill_cost_saved, 83333.33);
    assert_close(result.annual_savings, 183333.33);
    assert_eq!(result.monthly_cost_saved, 8333.33);
    assert_eq!(result.hours_per_unit, 0.33);
    assert_eq!(result.unit_label, "document");
    assert_eq!(result.fte_cost, 85000.0);
}

#[test]
fn m_and_a_monthly_documents_from_pipeline() {
    let inputs = CalculationInputs {
        use_case: Some(UseCase::MAndATransitions.into()),
        m_and_a_transactions_per_year: 3,
        avg_households_per_transaction: 200,
        ..Default::default()
    };

    let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();

    assert_eq!(result.derived_monthly_documents, 500);
    assert_eq!(result.unit_label, "transition");
    // 200 households x 10 docs x 20 minutes
    assert_close(result.hours_per_unit, 666.67);
    assert_eq!(result.backfill_rate_type, BackfillRateType::Consultant);
}

#[test]
fn m_and_a_backfill_falls_back_to_direct_input() {
    let inputs = CalculationInputs {
        use_case: Some(UseCase::MAndATransitions.into()),
        m_and_a_transactions_per_year: 3,
        avg_households_per_transaction: 200,
        historical_households_to_migrate: 0,
        annual_backfill: 4000,
        ..Default::default()
    };

    let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();
    assert_eq!(result.derived_annual_backfill, 4000);

    let structural = CalculationInputs {
        historical_households_to_migrate: 600,
        ..inputs
    };
    let result = calculate_roi(&structural, &RoiConfig::default()).unwrap();
    assert_eq!(result.derived_annual_backfill, 6000);
    // Consultant rate prices M&A backfill by default
    assert_eq!(result.backfill_rate_used, 150.0);
    assert_eq!(result.backfill_cost_saved, 300000.0);
}

#[test]
fn unknown_use_case_degrades() {
    let inputs = CalculationInputs {
        use_case: Some(UseCaseTag::parse("bogus")),
        monthly_documents: 900,
        annual_backfill: 1200,
        ..Default::default()
    };

    let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();

    assert_eq!(result.derived_monthly_documents, 0);
    assert_eq!(result.derived_annual_backfill, 1200);
    assert_eq!(result.hours_per_unit, 0.0);
    assert_eq!(result.unit_label, "");
    assert_eq!(result.monthly_hours_saved, 0.0);
    assert_eq!(result.backfill_hours_saved, 400.0);

    let narrative = get_strategic_roi("bogus");
    assert!(narrative.quantifiable.is_empty());
    assert!(narrative.strategic.is_empty());
}

#[test]
fn fte_avoidance_with_custom_fte_cost() {
    let inputs = CalculationInputs {
        use_case: Some(UseCase::CriticalBusinessProcess.into()),
        roi_model: Some(RoiModel::FteAvoidance),
        fte_cost: Some(100_000.0),
        monthly_documents: 1000,
        ..Default::default()
    };

    let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();

    assert_eq!(result.monthly_hours_saved, 333.33);
    assert_close(result.annual_recurring_savings, 192307.69);
    assert_eq!(result.backfill_cost_saved, 0.0);
    assert_eq!(result.ftes_avoided, 1.92);
    assert_eq!(result.fte_cost, 100_000.0);
}

#[test]
fn onboarding_use_cases_default_to_fte_avoidance() {
    let clients = CalculationInputs {
        use_case: Some(UseCase::ProspectsOnboarding.into()),
        annual_new_clients: 120,
        ..Default::default()
    };
    let result = calculate_roi(&clients, &RoiConfig::default()).unwrap();
    assert_eq!(result.roi_model, RoiModel::FteAvoidance);
    // 120 clients x 10 docs / 12 months
    assert_eq!(result.derived_monthly_documents, 100);
    assert_eq!(result.unit_label, "client");

    let investors = CalculationInputs {
        use_case: Some(UseCase::NewInvestorOnboarding.into()),
        annual_investors_onboarded: 30,
        ..Default::default()
    };
    let result = calculate_roi(&investors, &RoiConfig::default()).unwrap();
    // 30 x 5 / 12 = 12.5, rounds half up
    assert_eq!(result.derived_monthly_documents, 13);
    assert_eq!(result.unit_label, "investor");
    assert_eq!(result.hours_per_unit, 1.67);
}

#[test]
fn overrides_change_rates_but_not_counts() {
    let inputs = CalculationInputs {
        use_case: Some(UseCase::CriticalBusinessProcess.into()),
        monthly_documents: 600,
        annual_backfill: 3000,
        ..Default::default()
    };
    let defaults = RoiConfig::default();
    let overrides = RoiConfigOverride {
        analyst_hourly_rate: Some(80.0),
        triage_time_per_doc: Some(10),
        ..Default::default()
    };
    let merged = merge_roi_config(&defaults, Some(&overrides));

    let base = calculate_roi(&inputs, &defaults).unwrap();
    let tuned = calculate_roi(&inputs, &merged).unwrap();

    assert_eq!(base.derived_monthly_documents, tuned.derived_monthly_documents);
    // 600 docs x 25 minutes
    assert_eq!(tuned.monthly_hours_saved, 250.0);
    assert_eq!(tuned.monthly_cost_saved, 20000.0);
    assert!(tuned.annual_savings > base.annual_savings);
}

#[test]
fn no_use_case_is_not_computable() {
    assert!(calculate_roi(&CalculationInputs::default(), &RoiConfig::default()).is_none());
}
