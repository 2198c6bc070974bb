//! Unit tests for the cordon-costing crate.

mod profile_tests {
    use rstest::rstest;

    use crate::category::CostCategory;
    use crate::profile::ExecutionProfile;

    #[test]
    fn new_profile_is_unbounded() {
        let profile = ExecutionProfile::new();
        assert!(profile.is_unbounded());
        assert_eq!(profile, ExecutionProfile::default());
    }

    #[rstest]
    #[case(CostCategory::Allocation, 1024 * 1024 * 1024)]
    #[case(CostCategory::Invocation, 1_000_000)]
    #[case(CostCategory::Jump, 1_000_000)]
    #[case(CostCategory::Throw, 1_000_000)]
    fn default_profile_caps_every_category(#[case] category: CostCategory, #[case] cap: u64) {
        assert_eq!(ExecutionProfile::DEFAULT.threshold_of(category), Some(cap));
    }

    #[test]
    fn builder_caps_only_the_named_category() {
        let profile = ExecutionProfile::UNLIMITED.with_invocation_threshold(42);
        assert_eq!(profile.threshold_of(CostCategory::Invocation), Some(42));
        assert_eq!(profile.threshold_of(CostCategory::Allocation), None);
        assert_eq!(profile.threshold_of(CostCategory::Jump), None);
        assert_eq!(profile.threshold_of(CostCategory::Throw), None);
        assert!(!profile.is_unbounded());
    }
}

mod meter_tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use crate::category::CostCategory;
    use crate::meter::CostMeter;
    use crate::profile::ExecutionProfile;

    #[test]
    fn counters_start_at_zero() {
        let meter = CostMeter::new(ExecutionProfile::UNLIMITED);
        let snapshot = meter.snapshot();
        assert!(snapshot.is_zero());
        for category in CostCategory::iter() {
            assert_eq!(snapshot.of(category), 0);
        }
    }

    #[test]
    fn recording_accumulates_monotonically() {
        let meter = CostMeter::new(ExecutionProfile::UNLIMITED);
        let mut previous = 0;
        for units in [1, 5, 7] {
            assert!(meter.record(CostCategory::Jump, units).is_ok());
            let total = meter.snapshot().of(CostCategory::Jump);
            assert!(total > previous);
            previous = total;
        }
        assert_eq!(previous, 13);
    }

    #[test]
    fn spending_exactly_the_budget_is_permitted() {
        let profile = ExecutionProfile::UNLIMITED.with_throw_threshold(3);
        let meter = CostMeter::new(profile);
        assert!(meter.record(CostCategory::Throw, 3).is_ok());
        assert!(meter.record(CostCategory::Throw, 1).is_err());
    }

    #[rstest]
    #[case(CostCategory::Allocation, "memory allocation")]
    #[case(CostCategory::Invocation, "method invocation")]
    #[case(CostCategory::Jump, "looping")]
    #[case(CostCategory::Throw, "exception throwing")]
    fn violation_message_names_the_activity(
        #[case] category: CostCategory,
        #[case] activity: &str,
    ) {
        let profile = ExecutionProfile::UNLIMITED
            .with_allocation_threshold(10)
            .with_invocation_threshold(10)
            .with_jump_threshold(10)
            .with_throw_threshold(10);
        let meter = CostMeter::new(profile);
        let Err(violation) = meter.record(category, 11) else {
            panic!("budget of 10 must reject 11 units");
        };
        let message = violation.to_string();
        assert!(message.contains("terminated due to excessive use of"));
        assert!(message.contains(activity));
        assert_eq!(violation.threshold, 10);
        assert_eq!(violation.used, 11);
    }

    #[test]
    fn violating_record_still_counts_its_units() {
        let profile = ExecutionProfile::UNLIMITED.with_jump_threshold(1);
        let meter = CostMeter::new(profile);
        assert!(meter.record(CostCategory::Jump, 2).is_err());
        assert_eq!(meter.snapshot().of(CostCategory::Jump), 2);
    }

    #[test]
    fn meters_do_not_share_state() {
        let first = CostMeter::new(ExecutionProfile::UNLIMITED);
        let second = CostMeter::new(ExecutionProfile::UNLIMITED);
        assert!(first.record(CostCategory::Invocation, 9).is_ok());
        assert_eq!(second.snapshot().of(CostCategory::Invocation), 0);
    }

    #[test]
    fn categories_render_snake_case_names() {
        assert_eq!(CostCategory::Allocation.to_string(), "allocation");
        assert_eq!(CostCategory::Throw.to_string(), "throw");
    }
}
