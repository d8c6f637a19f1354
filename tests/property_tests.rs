/// Property-based tests using proptest
/// Tests invariants of the ROI engine and the form coercion helpers
use proptest::prelude::*;
use roi_lead_api::core::form_input::{coerce_amount, coerce_count, parse_count_str};
use roi_lead_api::core::roi_calculator::{
    calculate_roi, BackfillRateType, CalculationInputs, RoiConfig, RoiModel, UseCase,
    HOURS_PER_FTE_YEAR,
};
use roi_lead_api::validation::is_valid_email;
use serde_json::json;

fn use_case_strategy() -> impl Strategy<Value = UseCase> {
    prop_oneof![
        Just(UseCase::CriticalBusinessProcess),
        Just(UseCase::MAndATransitions),
        Just(UseCase::ProspectsOnboarding),
        Just(UseCase::NewInvestorOnboarding),
    ]
}

fn model_strategy() -> impl Strategy<Value = Option<RoiModel>> {
    prop_oneof![
        Just(None),
        Just(Some(RoiModel::TimeSavings)),
        Just(Some(RoiModel::FteAvoidance)),
    ]
}

prop_compose! {
    fn inputs_strategy()(
        use_case in use_case_strategy(),
        roi_model in model_strategy(),
        fte_cost in proptest::option::of(20_000.0f64..400_000.0),
        monthly_documents in 0u64..100_000,
        annual_backfill in 0u64..1_000_000,
        transactions in 0u64..50,
        households in 0u64..2_000,
        historical in 1u64..20_000,
        clients in 0u64..10_000,
        investors in 0u64..10_000,
    ) -> CalculationInputs {
        CalculationInputs {
            use_case: Some(use_case.into()),
            roi_model,
            backfill_rate_type: None,
            fte_cost,
            monthly_documents,
            annual_backfill,
            m_and_a_transactions_per_year: transactions,
            avg_households_per_transaction: households,
            historical_households_to_migrate: historical,
            annual_new_clients: clients,
            annual_investors_onboarded: investors,
        }
    }
}

fn is_cent_multiple(value: f64) -> bool {
    let cents = value * 100.0;
    (cents - cents.round()).abs() < 1e-4
}

// Property: the engine is a pure function of its inputs
proptest! {
    #[test]
    fn calculation_is_deterministic(inputs in inputs_strategy()) {
        let config = RoiConfig::default();
        prop_assert_eq!(calculate_roi(&inputs, &config), calculate_roi(&inputs, &config));
    }

    #[test]
    fn missing_use_case_is_never_computable(inputs in inputs_strategy()) {
        let inputs = CalculationInputs { use_case: None, ..inputs };
        prop_assert!(calculate_roi(&inputs, &RoiConfig::default()).is_none());
    }

    #[test]
    fn money_and_hours_are_whole_cents(inputs in inputs_strategy()) {
        let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();
        for value in [
            result.monthly_hours_saved,
            result.monthly_cost_saved,
            result.backfill_hours_saved,
            result.backfill_cost_saved,
            result.annual_savings,
            result.annual_recurring_savings,
            result.ftes_avoided,
            result.hours_per_unit,
        ] {
            prop_assert!(is_cent_multiple(value), "{} is not a multiple of 0.01", value);
        }
    }

    #[test]
    fn ftes_match_annual_hours(inputs in inputs_strategy()) {
        let result = calculate_roi(&inputs, &RoiConfig::default()).unwrap();
        let annual_hours = result.monthly_hours_saved * 12.0 + result.backfill_hours_saved;
        let expected = annual_hours / HOURS_PER_FTE_YEAR;
        prop_assert!((result.ftes_avoided - expected).abs() <= 0.011);
    }
}

// Property: more volume never lowers the headline figures
proptest! {
    #[test]
    fn volume_increase_is_monotonic(inputs in inputs_strategy(), extra in 1u64..5_000) {
        let config = RoiConfig::default();
        let base = calculate_roi(&inputs, &config).unwrap();

        let bumped = [
            CalculationInputs { monthly_documents: inputs.monthly_documents + extra, ..inputs.clone() },
            CalculationInputs { annual_backfill: inputs.annual_backfill + extra, ..inputs.clone() },
            CalculationInputs { m_and_a_transactions_per_year: inputs.m_and_a_transactions_per_year + extra, ..inputs.clone() },
            CalculationInputs { avg_households_per_transaction: inputs.avg_households_per_transaction + extra, ..inputs.clone() },
            CalculationInputs { historical_households_to_migrate: inputs.historical_households_to_migrate + extra, ..inputs.clone() },
            CalculationInputs { annual_new_clients: inputs.annual_new_clients + extra, ..inputs.clone() },
            CalculationInputs { annual_investors_onboarded: inputs.annual_investors_onboarded + extra, ..inputs.clone() },
        ];

        for more in bumped {
            let grown = calculate_roi(&more, &config).unwrap();
            prop_assert!(grown.monthly_hours_saved >= base.monthly_hours_saved);
            prop_assert!(grown.annual_savings >= base.annual_savings);
            prop_assert!(grown.ftes_avoided >= base.ftes_avoided);
        }
    }

    #[test]
    fn backfill_rate_type_never_changes_counts(inputs in inputs_strategy()) {
        let config = RoiConfig::default();
        let staff = calculate_roi(
            &CalculationInputs { backfill_rate_type: Some(BackfillRateType::Staff), ..inputs.clone() },
            &config,
        ).unwrap();
        let consultant = calculate_roi(
            &CalculationInputs { backfill_rate_type: Some(BackfillRateType::Consultant), ..inputs },
            &config,
        ).unwrap();

        prop_assert_eq!(staff.derived_monthly_documents, consultant.derived_monthly_documents);
        prop_assert_eq!(staff.derived_annual_backfill, consultant.derived_annual_backfill);
        prop_assert_eq!(staff.monthly_hours_saved, consultant.monthly_hours_saved);
        prop_assert!(consultant.backfill_cost_saved >= staff.backfill_cost_saved);
    }
}

// Property: form coercion never panics and never goes negative
proptest! {
    #[test]
    fn count_parsing_never_panics(raw in "\\PC*") {
        let _ = parse_count_str(&raw);
        let _ = coerce_count(Some(&json!(raw)));
    }

    #[test]
    fn numeric_strings_round_trip_as_counts(n in 0u64..1_000_000_000) {
        prop_assert_eq!(coerce_count(Some(&json!(n.to_string()))), n);
        prop_assert_eq!(coerce_count(Some(&json!(n))), n);
    }

    #[test]
    fn amounts_are_positive_or_absent(raw in "\\PC*") {
        if let Some(amount) = coerce_amount(Some(&json!(raw))) {
            prop_assert!(amount > 0.0 && amount.is_finite());
        }
    }

    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_accepted(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}
