// ABOUTME: Integration tests for resource URIs and configuration classification.
// ABOUTME: Property tests pin classification precedence and query-safe encoding.

use dngcm::types::*;
use proptest::prelude::*;

mod classification {
    use super::*;

    #[test]
    fn kind_follows_server_url_scheme() {
        let base = "https://clm.example.com:9443/rm/cm";
        assert_eq!(classify(&format!("{base}/stream/_x")), ConfigurationKind::Stream);
        assert_eq!(classify(&format!("{base}/baseline/_x")), ConfigurationKind::Baseline);
        assert_eq!(classify(&format!("{base}/changeset/_x")), ConfigurationKind::Changeset);
        assert_eq!(classify(&format!("{base}/component/_x")), ConfigurationKind::Unknown);
    }

    #[test]
    fn whole_uri_is_matched() {
        // A host name containing a kind word decides the kind.
        assert_eq!(
            classify("https://baseline-host.example.com/rm/cm/changeset/_x"),
            ConfigurationKind::Baseline
        );
    }

    #[test]
    fn only_baselines_are_read_only() {
        assert!(ConfigurationKind::Stream.is_editable());
        assert!(ConfigurationKind::Changeset.is_editable());
        assert!(!ConfigurationKind::Baseline.is_editable());
        assert!(!ConfigurationKind::Unknown.is_editable());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ConfigurationKind::Changeset).unwrap(),
            "\"changeset\""
        );
        assert_eq!(ConfigurationKind::Baseline.to_string(), "baseline");
    }

    proptest! {
        #[test]
        fn stream_wins_over_other_kinds(prefix in "[a-z/]{0,12}", suffix in "[a-z/]{0,12}") {
            let uri = format!("https://h/{prefix}baseline/changeset/stream{suffix}");
            prop_assert_eq!(classify(&uri), ConfigurationKind::Stream);
        }

        #[test]
        fn baseline_wins_over_changeset(id in "_[A-Za-z0-9]{1,16}") {
            prop_assume!(!id.contains("stream"));
            let uri = format!("https://h/rm/cm/changeset/baseline/{id}");
            prop_assert_eq!(classify(&uri), ConfigurationKind::Baseline);
        }

        #[test]
        fn uris_without_kind_words_are_unknown(id in "_[A-Za-z0-9]{1,16}") {
            let uri = format!("https://h/rm/cm/component/{id}");
            prop_assume!(!id.contains("stream") && !id.contains("baseline") && !id.contains("changeset"));
            prop_assert_eq!(classify(&uri), ConfigurationKind::Unknown);
        }
    }
}

mod uris {
    use super::*;

    #[test]
    fn equal_values_compare_equal() {
        let a = ConfigurationUri::new("https://h/rm/cm/stream/_s");
        let b = ConfigurationUri::new(String::from("https://h/rm/cm/stream/_s"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "https://h/rm/cm/stream/_s");
    }

    #[test]
    fn serializes_as_plain_string() {
        let uri = TrackerUri::new("https://h/rm/tracker/1");
        assert_eq!(serde_json::to_string(&uri).unwrap(), "\"https://h/rm/tracker/1\"");
    }

    proptest! {
        #[test]
        fn encoded_uri_is_query_safe(path in "[A-Za-z0-9_/?&=:%# .-]{0,40}") {
            let uri = ConfigurationUri::new(format!("https://h/rm/{path}"));
            let encoded = uri.encoded();
            prop_assert!(!encoded.contains(['/', '?', '&', '=', ':', '#', ' ']));
        }
    }
}

#[test]
fn timestamp_is_utc() {
    let stamp = timestamp();
    assert!(stamp.ends_with(" UTC"));
    assert_eq!(stamp.len(), "2024/03/01 10:15:00 UTC".len());
}
