use std::fs;

use tempfile::TempDir;

use dingle_core::config::ConfigStore;
use dingle_core::prelude::*;
use dingle_core::remote::RemoteCommand;

const CONFIG: &str = r#"{
    "staging_dir": "/tmp/dingle-staging",
    "yum_repo_host": "yum.example.org",
    "yum_dev_dir": "/var/www/rpms/dev/",
    "yum_qa_dir": "/var/www/rpms/qa/",
    "yum_stage_dir": "/var/www/rpms/stage/",
    "yum_prod_dir": "/var/www/rpms/prod/",
    "rpm_names": ["iplant-clavin", "iplant-donkey"],
    "prereq_repos": ["git@github.com:org/Clavin.git"],
    "list_of_repos": ["git@github.com:org/iplant-clavin.git", "git@github.com:org/donkey.git"]
}"#;

fn load_config(dir: &TempDir) -> DingleConfig {
    let path = dir.path().join("dingle.json");
    fs::write(&path, CONFIG).unwrap();
    ConfigStore::from_path(&path).load().unwrap()
}

fn host() -> MemoryRemote {
    MemoryRemote::new()
        .with_dir(
            "/var/www/rpms/dev",
            &[
                "repodata",
                "iplant-clavin-1.0.8-1.noarch.rpm",
                "iplant-clavin-1.0.9-1.noarch.rpm",
                "iplant-clavin-1.0.10-1.noarch.rpm",
                "iplant-donkey-2.0.0-3.noarch.rpm",
                "iplant-donkey-2.0.0-12.noarch.rpm",
                "README.txt",
            ],
        )
        .with_dir("/var/www/rpms/qa", &["repodata", "iplant-clavin-1.0.8-1.noarch.rpm"])
        .with_dir("/var/www/rpms/stage", &["repodata"])
        .with_dir("/var/www/rpms/prod", &["repodata"])
}

#[test]
fn new_rpms_pick_latest_per_name() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host();
    let promoter = Promoter::new(&config, &remote);

    let latest = promoter.latest_new_rpms::<&str>(Tier::Qa, &[]).unwrap();
    assert_eq!(
        latest,
        vec![
            "iplant-clavin-1.0.10-1.noarch.rpm",
            "iplant-donkey-2.0.0-12.noarch.rpm",
        ]
    );
}

#[test]
fn listing_keeps_non_artifacts() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host();

    let listing = Promoter::new(&config, &remote).list_fs(Tier::Dev).unwrap();
    assert!(listing.iter().any(|e| e == "README.txt"));
    assert!(listing.iter().any(|e| e == "repodata"));

    let artifacts = Promoter::new(&config, &remote).artifacts(Tier::Dev).unwrap();
    assert_eq!(artifacts.len(), 5);
}

#[test]
fn promotion_walks_every_tier() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host();
    let promoter = Promoter::new(&config, &remote);

    for tier in [Tier::Qa, Tier::Stage, Tier::Prod] {
        let report = promoter.promote::<&str>(tier, &[]).unwrap();
        assert_eq!(report.tier, tier);
        assert_eq!(
            report.promoted,
            vec![
                "iplant-clavin-1.0.10-1.noarch.rpm",
                "iplant-donkey-2.0.0-12.noarch.rpm",
            ]
        );
        let kinds: Vec<StepKind> = report.steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::Copy, StepKind::RefreshMetadata, StepKind::Chown]);
    }

    let prod = remote.entries("/var/www/rpms/prod");
    assert!(prod.iter().any(|e| e == "iplant-clavin-1.0.10-1.noarch.rpm"));
    assert!(!prod.iter().any(|e| e == "iplant-clavin-1.0.9-1.noarch.rpm"));

    // Once caught up, every tier reports a no-op.
    for tier in [Tier::Qa, Tier::Stage, Tier::Prod] {
        assert!(promoter.promote::<&str>(tier, &[]).unwrap().is_noop());
    }
}

#[test]
fn skipped_names_are_never_copied() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host();
    let promoter = Promoter::new(&config, &remote);

    let report = promoter.promote(Tier::Qa, &["iplant-donkey"]).unwrap();
    assert_eq!(report.promoted, vec!["iplant-clavin-1.0.10-1.noarch.rpm"]);

    for command in remote.mutations() {
        if let RemoteCommand::CopyFiles { sources, .. } = command {
            assert!(sources.iter().all(|s| !s.contains("iplant-donkey")));
        }
    }
}

#[test]
fn dev_update_only_refreshes_and_chowns() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host();

    let report = Promoter::new(&config, &remote)
        .promote::<&str>(Tier::Dev, &[])
        .unwrap();
    assert!(report.promoted.is_empty());
    assert_eq!(
        report.steps.iter().map(|s| s.command.as_str()).collect::<Vec<_>>(),
        vec![
            "createrepo --update /var/www/rpms/dev/",
            "chown -R buildnanny:www /var/www/rpms/dev/",
        ]
    );
}

#[test]
fn failed_refresh_reports_completed_steps() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp);
    let remote = host().failing("refresh_metadata");

    let err = Promoter::new(&config, &remote)
        .promote::<&str>(Tier::Qa, &[])
        .unwrap_err();
    let report = err.partial_report().expect("failed update keeps its steps");
    let failed = report.failed_step().unwrap();
    assert_eq!(failed.kind, StepKind::RefreshMetadata);
    assert_eq!(failed.command, "createrepo --update /var/www/rpms/qa/");
    assert_eq!(report.steps[0].kind, StepKind::Copy);
    assert!(report.steps[0].succeeded);
    assert!(err.to_string().starts_with("update of qa failed: remote command failed"));

    // The copy already landed and is not rolled back.
    assert!(
        remote
            .entries("/var/www/rpms/qa")
            .iter()
            .any(|e| e == "iplant-clavin-1.0.10-1.noarch.rpm")
    );
}
