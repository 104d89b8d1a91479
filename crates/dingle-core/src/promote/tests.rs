//! Tests for the promotion orchestrator.

use super::*;
use crate::remote::MemoryRemote;

const NO_SKIPS: &[&str] = &[];

fn host() -> MemoryRemote {
    MemoryRemote::new()
        .with_dir(
            "/rpms/dev",
            &[
                "repodata",
                "foo-1.0.0-8.noarch.rpm",
                "foo-1.0.0-9.noarch.rpm",
                "bar-2.1.0-1.noarch.rpm",
                "bar-2.2.0-1.noarch.rpm",
            ],
        )
        .with_dir("/rpms/qa", &["repodata", "foo-1.0.0-8.noarch.rpm"])
        .with_dir("/rpms/stage", &["repodata"])
        .with_dir("/rpms/prod", &["repodata"])
}

mod selection_tests {
    use super::*;

    #[test]
    fn latest_new_for_qa() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        let selected = promoter.latest_new_rpms(Tier::Qa, NO_SKIPS).unwrap();
        assert_eq!(selected, vec!["bar-2.2.0-1.noarch.rpm", "foo-1.0.0-9.noarch.rpm"]);
    }

    #[test]
    fn latest_new_for_dev_is_latest_per_name() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        let selected = promoter.latest_new_rpms(Tier::Dev, NO_SKIPS).unwrap();
        assert_eq!(selected, vec!["bar-2.2.0-1.noarch.rpm", "foo-1.0.0-9.noarch.rpm"]);
    }

    #[test]
    fn skip_list_applies_after_diff() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        let selected = promoter.latest_new_rpms(Tier::Qa, &["bar"]).unwrap();
        assert_eq!(selected, vec!["foo-1.0.0-9.noarch.rpm"]);
    }

    #[test]
    fn tier_diff_uses_upstream_tier() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        let result = promoter.tier_diff(Tier::Qa).unwrap();
        assert_eq!(result.new_set.len(), 3);
        assert_eq!(result.downstream, vec!["foo-1.0.0-8.noarch.rpm"]);
        assert_eq!(
            remote.history(),
            vec![
                RemoteCommand::list_dir("/rpms/dev"),
                RemoteCommand::list_dir("/rpms/qa"),
            ]
        );
    }

    #[test]
    fn dev_has_no_diff() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let err = Promoter::new(&config, &remote).tier_diff(Tier::Dev).unwrap_err();
        assert!(matches!(err, DingleError::NoUpstreamTier(Tier::Dev)));
    }
}

mod promote_tests {
    use super::*;

    #[test]
    fn promote_copies_refreshes_and_chowns_in_order() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let report = Promoter::new(&config, &remote)
            .promote(Tier::Qa, NO_SKIPS)
            .unwrap();

        assert_eq!(
            report.promoted,
            vec!["bar-2.2.0-1.noarch.rpm", "foo-1.0.0-9.noarch.rpm"]
        );
        assert_eq!(
            remote.mutations(),
            vec![
                RemoteCommand::copy_files(
                    &["bar-2.2.0-1.noarch.rpm", "foo-1.0.0-9.noarch.rpm"],
                    "/rpms/dev",
                    "/rpms/qa",
                ),
                RemoteCommand::refresh_metadata("/rpms/qa"),
                RemoteCommand::chown("/rpms/qa", "root:www", true),
            ]
        );
        let kinds: Vec<StepKind> = report.steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::Copy, StepKind::RefreshMetadata, StepKind::Chown]);
        assert!(report.steps.iter().all(|s| s.succeeded));
        assert!(
            remote
                .entries("/rpms/qa")
                .contains(&"bar-2.2.0-1.noarch.rpm".to_string())
        );
    }

    #[test]
    fn empty_selection_runs_nothing() {
        let config = DingleConfig::for_tests();
        let remote = host();
        // qa only holds foo, which is skipped.
        let report = Promoter::new(&config, &remote)
            .promote(Tier::Stage, &["foo"])
            .unwrap();

        assert!(report.is_noop());
        assert!(report.promoted.is_empty());
        assert!(remote.mutations().is_empty());
    }

    #[test]
    fn second_promotion_is_a_noop() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        promoter.promote(Tier::Qa, NO_SKIPS).unwrap();
        let mutations_after_first = remote.mutations().len();
        let second = promoter.promote(Tier::Qa, NO_SKIPS).unwrap();

        assert!(second.is_noop());
        assert_eq!(remote.mutations().len(), mutations_after_first);
    }

    #[test]
    fn promotion_chain_reaches_prod() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let promoter = Promoter::new(&config, &remote);

        for tier in [Tier::Qa, Tier::Stage, Tier::Prod] {
            promoter.promote(tier, NO_SKIPS).unwrap();
        }
        let prod = promoter.artifacts(Tier::Prod).unwrap();
        assert_eq!(prod.len(), 2);
        assert!(prod.contains(&"foo-1.0.0-9.noarch.rpm".to_string()));
        assert!(
            remote
                .mutations()
                .contains(&RemoteCommand::chown("/rpms/prod", "root:www", true))
        );
    }

    #[test]
    fn dev_update_refreshes_and_chowns_as_buildnanny() {
        let config = DingleConfig::for_tests();
        let remote = host();
        let report = Promoter::new(&config, &remote)
            .promote(Tier::Dev, NO_SKIPS)
            .unwrap();

        assert!(report.promoted.is_empty());
        assert_eq!(
            remote.mutations(),
            vec![
                RemoteCommand::refresh_metadata("/rpms/dev"),
                RemoteCommand::chown("/rpms/dev", "buildnanny:www", true),
            ]
        );
        // Dev updates never list anything.
        assert_eq!(remote.history().len(), 2);
    }

    #[test]
    fn failed_copy_stops_before_metadata_refresh() {
        let config = DingleConfig::for_tests();
        let remote = host().failing("copy_files");
        let err = Promoter::new(&config, &remote)
            .promote(Tier::Qa, NO_SKIPS)
            .unwrap_err();

        match err {
            DingleError::PromotionFailed { report, cause } => {
                assert!(report.promoted.is_empty());
                assert_eq!(report.steps.len(), 1);
                assert!(matches!(
                    *cause,
                    DingleError::RemoteCommandFailed { ref command, .. } if command.starts_with("cp ")
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(remote.mutations().len(), 1);
    }

    #[test]
    fn failed_chown_returns_the_steps_already_run() {
        let config = DingleConfig::for_tests();
        let remote = host().failing("chown");
        let err = Promoter::new(&config, &remote)
            .promote(Tier::Qa, NO_SKIPS)
            .unwrap_err();

        let report = err.partial_report().expect("failed promotion carries its report");
        let kinds: Vec<StepKind> = report.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Copy, StepKind::RefreshMetadata, StepKind::Chown]
        );
        let succeeded: Vec<bool> = report.steps.iter().map(|s| s.succeeded).collect();
        assert_eq!(succeeded, vec![true, true, false]);
        assert_eq!(
            report.promoted,
            vec!["bar-2.2.0-1.noarch.rpm", "foo-1.0.0-9.noarch.rpm"]
        );

        let failed = report.failed_step().unwrap();
        assert_eq!(failed.command, "chown -R root:www /rpms/qa");
        assert_eq!(failed.output, "chown: simulated failure");
        assert!(!err.is_caller_error());
    }

    #[test]
    fn failed_refresh_keeps_copied_files() {
        let config = DingleConfig::for_tests();
        let remote = host().failing("refresh_metadata");
        let err = Promoter::new(&config, &remote)
            .promote(Tier::Qa, NO_SKIPS)
            .unwrap_err();

        let report = err.partial_report().unwrap();
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.promoted.len(), 2);
        assert!(
            remote
                .entries("/rpms/qa")
                .contains(&"foo-1.0.0-9.noarch.rpm".to_string())
        );
        assert!(
            !remote
                .mutations()
                .iter()
                .any(|c| matches!(c, RemoteCommand::Chown { .. }))
        );
    }

    #[test]
    fn failed_listing_aborts_before_any_mutation() {
        let config = DingleConfig::for_tests();
        let remote = host().failing("list_dir");
        let result = Promoter::new(&config, &remote).promote(Tier::Qa, NO_SKIPS);

        assert!(matches!(result, Err(DingleError::RemoteCommandFailed { .. })));
        assert!(remote.mutations().is_empty());
    }
}
