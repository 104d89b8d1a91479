//! Exclusion of artifacts the operator asked to hold back.

use crate::version::parse_name;

/// Drop every filename that equals a skip entry or whose artifact name does.
///
/// Matching is exact and case-sensitive. Order of the survivors is kept.
pub fn filter_rpms<S: AsRef<str>, K: AsRef<str>>(filenames: &[S], skips: &[K]) -> Vec<String> {
    if skips.is_empty() {
        return filenames.iter().map(|f| f.as_ref().to_string()).collect();
    }

    let is_skipped = |filename: &str| {
        let name = parse_name(filename).ok();
        skips.iter().any(|skip| {
            let skip = skip.as_ref();
            skip == filename || name.as_deref() == Some(skip)
        })
    };

    filenames
        .iter()
        .map(|f| f.as_ref())
        .filter(|f| !is_skipped(*f))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RPMS: [&str; 4] = [
        "iplant-clavin-1.0.0-10.noarch.rpm",
        "iplant-donkey-2.1.0-3.noarch.rpm",
        "iplant-donkey-2.2.0-1.noarch.rpm",
        "facepalm-0.4.1-7.noarch.rpm",
    ];

    #[test]
    fn skips_by_name() {
        let kept = filter_rpms(&RPMS, &["iplant-donkey"]);
        assert_eq!(
            kept,
            vec!["iplant-clavin-1.0.0-10.noarch.rpm", "facepalm-0.4.1-7.noarch.rpm"]
        );
    }

    #[test]
    fn skips_by_exact_filename() {
        let kept = filter_rpms(&RPMS, &["iplant-donkey-2.1.0-3.noarch.rpm"]);
        assert_eq!(kept.len(), 3);
        assert!(!kept.contains(&"iplant-donkey-2.1.0-3.noarch.rpm".to_string()));
        assert!(kept.contains(&"iplant-donkey-2.2.0-1.noarch.rpm".to_string()));
    }

    #[test]
    fn name_prefixes_do_not_match() {
        // "iplant" is the first dash segment of several names but not a name.
        assert_eq!(filter_rpms(&RPMS, &["iplant"]), RPMS);
        assert_eq!(filter_rpms(&RPMS, &["IPLANT-CLAVIN"]), RPMS);
    }

    #[test]
    fn malformed_filenames_only_match_exactly() {
        let listing = ["repodata.rpm", "facepalm-0.4.1-7.noarch.rpm"];
        assert_eq!(filter_rpms(&listing, &["repodata"]), listing);
        assert_eq!(
            filter_rpms(&listing, &["repodata.rpm"]),
            vec!["facepalm-0.4.1-7.noarch.rpm"]
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let skips = ["facepalm", "iplant-donkey-2.1.0-3.noarch.rpm"];
        let once = filter_rpms(&RPMS, &skips);
        let twice = filter_rpms(&once, &skips);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_skip_list_keeps_everything() {
        assert_eq!(filter_rpms(&RPMS, &[] as &[&str]), RPMS);
    }
}
