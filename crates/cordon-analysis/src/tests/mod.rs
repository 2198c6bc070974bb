//! Unit tests for the cordon-analysis crate.

mod support;

mod worklist_tests;

mod source_tests {
    use rstest::rstest;

    use crate::source::ClassSource;

    #[rstest]
    #[case("com.example.Job", "com/example/Job")]
    #[case("com/example/Job", "com/example/Job")]
    #[case("Job", "Job")]
    fn names_normalise_to_binary_form(#[case] spelled: &str, #[case] binary: &str) {
        let source = ClassSource::from_class_name(spelled);
        assert_eq!(source.binary_name(), binary);
        assert!(source.requested_from().is_none());
    }

    #[test]
    fn display_uses_the_dotted_spelling() {
        let source = ClassSource::from_class_name("com/example/Job");
        assert_eq!(source.to_string(), "com.example.Job");
        assert_eq!(source.dotted_name(), "com.example.Job");
    }

    #[test]
    fn discovered_sources_record_their_origin() {
        let source = ClassSource::requested_by("com/example/Helper", "com.example.Job");
        assert_eq!(source.requested_from(), Some("com/example/Job"));
    }
}

mod whitelist_tests {
    use rstest::rstest;

    use crate::whitelist::Whitelist;

    #[rstest]
    #[case("java/lang/Object", true)]
    #[case("java/lang/StringBuilder", true)]
    #[case("java/util/List", false)]
    #[case("com/example/Job", false)]
    fn minimal_trusts_only_the_core_namespace(#[case] name: &str, #[case] trusted: bool) {
        assert_eq!(Whitelist::minimal().matches(name), trusted);
    }

    #[test]
    fn everything_matches_any_name() {
        let whitelist = Whitelist::everything();
        assert!(whitelist.matches("com/example/Job"));
        assert!(whitelist.matches(""));
    }

    #[test]
    fn exact_entries_accept_dotted_spellings() {
        let whitelist = Whitelist::default().with_entries(["com.example.Trusted"]);
        assert!(whitelist.matches("com/example/Trusted"));
        assert!(!whitelist.matches("com/example/TrustedToo"));
    }

    #[test]
    fn extend_unions_both_sides() {
        let combined = Whitelist::minimal()
            .extend(Whitelist::default().with_entries(["com/example/Trusted"]));
        assert!(combined.matches("java/lang/Object"));
        assert!(combined.matches("com/example/Trusted"));
        assert!(!combined.matches("com/example/Job"));
    }
}

mod stitched_tests {
    use crate::stitched::{is_stitched, stitched_members, stitched_names};

    #[test]
    fn sequence_template_exposes_a_sub_range_member() {
        let Some(members) = stitched_members("sandbox/java/util/List") else {
            panic!("the sandboxed list template must be stitched");
        };
        assert!(members.iter().any(|member| member.name == "subList"));
    }

    #[test]
    fn unknown_names_are_not_stitched() {
        assert!(stitched_members("sandbox/com/example/Job").is_none());
        assert!(!is_stitched("com/example/Job"));
    }

    #[test]
    fn every_template_lives_in_the_sandbox_namespace() {
        for name in stitched_names() {
            assert!(name.starts_with("sandbox/"), "{name} lacks the prefix");
        }
    }
}
