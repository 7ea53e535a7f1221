//! Lifecycle tests against in-process fetcher and build driver fakes.

use async_trait::async_trait;
use psqlvm_config::{Config, Paths};
use psqlvm_core::{EditionId, Error, Result};
use psqlvm_edition::{
    ArchiveFetcher, BuildDriver, Catalog, EditionManager, EditionState, InstallOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Writes the edition name as the archive body.
#[derive(Default, Clone)]
struct FakeFetcher {
    calls: Arc<AtomicUsize>,
    fail_with_partial: bool,
}

#[async_trait]
impl ArchiveFetcher for FakeFetcher {
    async fn fetch(&self, edition: &EditionId, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_partial {
            fs::write(dest, "trunc").unwrap();
            return Err(Error::Download {
                url: format!("http://mirror.test/v{}", edition),
                status: 503,
                fixes: vec![],
            });
        }
        fs::write(dest, edition.as_str()).unwrap();
        Ok(())
    }
}

/// Lays out a source tree on extract and produces binaries on build.
#[derive(Default, Clone)]
struct FakeDriver {
    fail_target: Option<String>,
}

fn write_executable(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[async_trait]
impl BuildDriver for FakeDriver {
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let edition = fs::read_to_string(archive).unwrap();
        let root = dest_dir.join(format!("postgresql-{}", edition));
        fs::create_dir_all(root.join("src/bin/psql")).unwrap();
        fs::create_dir_all(root.join("src/include")).unwrap();
        fs::write(root.join("configure"), "#!/bin/sh\n").unwrap();
        fs::write(root.join("src/bin/psql/psql.c"), "int main;").unwrap();
        fs::write(root.join("src/include/pg_config.h"), "").unwrap();
        Ok(())
    }

    async fn configure(&self, source_dir: &Path) -> Result<()> {
        fs::write(source_dir.join("config.status"), "").unwrap();
        Ok(())
    }

    async fn build_targets(&self, source_dir: &Path, targets: &[String]) -> Result<()> {
        for target in targets {
            if self.fail_target.as_deref() == Some(target.as_str()) {
                return Err(Error::Build {
                    target: target.clone(),
                    exit_code: Some(2),
                    source_dir: source_dir.to_path_buf(),
                    fixes: vec![],
                });
            }
            if target == "src/bin" {
                write_executable(&source_dir.join("src/bin/psql/psql"));
                write_executable(&source_dir.join("src/bin/pg_dump/pg_dump"));
            }
        }
        Ok(())
    }
}

struct Harness {
    _tmp: TempDir,
    paths: Paths,
    fetcher: FakeFetcher,
    manager: EditionManager<FakeFetcher, FakeDriver>,
}

fn harness_with(fetcher: FakeFetcher, driver: FakeDriver) -> Harness {
    let tmp = TempDir::new().unwrap();
    let paths = Paths::new(tmp.path());
    let manager = EditionManager::new(
        paths.clone(),
        Config::default(),
        Catalog::builtin(),
        fetcher.clone(),
        driver,
    );
    Harness {
        _tmp: tmp,
        paths,
        fetcher,
        manager,
    }
}

fn harness() -> Harness {
    harness_with(FakeFetcher::default(), FakeDriver::default())
}

fn id(s: &str) -> EditionId {
    s.parse().unwrap()
}

fn names(editions: &[EditionId]) -> Vec<&str> {
    editions.iter().map(|e| e.as_str()).collect()
}

fn link_targets(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| fs::read_link(e.unwrap().path()).ok())
        .collect()
}

#[tokio::test]
async fn test_install_lists_edition_once() {
    let h = harness();
    let outcome = h
        .manager
        .install(&id("14.2"), &InstallOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.install_dir, h.paths.edition_dir(&id("14.2")));
    assert!(!outcome.reused_archive);
    assert_eq!(names(&h.manager.installed().unwrap()), vec!["14.2"]);
    assert_eq!(h.manager.state(&id("14.2")).unwrap(), EditionState::Built);
    assert!(outcome.install_dir.join("src/include/pg_config.h").is_file());
}

#[tokio::test]
async fn test_install_twice_is_already_installed_and_untouched() {
    let h = harness();
    let dir = h.paths.edition_dir(&id("14.2"));
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/keep.txt"), b"original bytes").unwrap();

    let err = h
        .manager
        .install(&id("14.2"), &InstallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyInstalled { .. }));
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fs::read(dir.join("src/keep.txt")).unwrap(), b"original bytes");
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_install_unknown_edition() {
    let h = harness();
    let err = h
        .manager
        .install(&id("99.9"), &InstallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEdition { .. }));
    assert!(!h.paths.download_dir().exists());
}

#[tokio::test]
async fn test_failed_download_removes_partial_archive() {
    let h = harness_with(
        FakeFetcher {
            fail_with_partial: true,
            ..Default::default()
        },
        FakeDriver::default(),
    );
    let err = h
        .manager
        .install(&id("14.2"), &InstallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Download { status: 503, .. }));
    assert!(!h.paths.archive_path(&id("14.2")).exists());
    assert!(h.manager.installed().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_build_keeps_source_tree() {
    let h = harness_with(
        FakeFetcher::default(),
        FakeDriver {
            fail_target: Some("src/include".into()),
        },
    );
    let err = h
        .manager
        .install(&id("14.2"), &InstallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Build { ref target, .. } if target == "src/include"));
    let dir = h.paths.edition_dir(&id("14.2"));
    assert!(dir.join("configure").is_file());
    assert!(dir.join("config.status").is_file());
    assert_eq!(
        h.manager.state(&id("14.2")).unwrap(),
        EditionState::SourceInstalled
    );
}

#[tokio::test]
async fn test_cached_archive_is_reused_unless_refetch() {
    let h = harness();
    let e = id("15.1");
    h.manager.install(&e, &InstallOptions::default()).await.unwrap();
    h.manager.remove(&e).await.unwrap();

    let again = h.manager.install(&e, &InstallOptions::default()).await.unwrap();
    assert!(again.reused_archive);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);

    h.manager.remove(&e).await.unwrap();
    let refetched = h
        .manager
        .install(&e, &InstallOptions { refetch: true })
        .await
        .unwrap();
    assert!(!refetched.reused_archive);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_state_probe_follows_download_cache() {
    let h = harness();
    let e = id("14.2");
    assert_eq!(h.manager.state(&e).unwrap(), EditionState::Unknown);

    fs::create_dir_all(h.paths.download_dir()).unwrap();
    fs::write(h.paths.archive_path(&e), "14.2").unwrap();
    assert_eq!(h.manager.state(&e).unwrap(), EditionState::Downloaded);

    fs::create_dir_all(h.paths.extracted_source_dir(&e)).unwrap();
    assert_eq!(h.manager.state(&e).unwrap(), EditionState::Extracted);
}

#[tokio::test]
async fn test_remove_rules() {
    let h = harness();
    let err = h.manager.remove(&id("14.2")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownEdition { .. }));

    h.manager
        .install(&id("14.2"), &InstallOptions::default())
        .await
        .unwrap();
    let first = h.manager.remove(&id("14.2")).await.unwrap();
    assert!(first.removed);
    let second = h.manager.remove(&id("14.2")).await.unwrap();
    assert!(!second.removed);

    assert!(h.manager.installed().unwrap().is_empty());
    assert_eq!(h.manager.state(&id("14.2")).unwrap(), EditionState::Removed);
}

#[tokio::test]
async fn test_reinstall_after_remove() {
    let h = harness();
    let e = id("14.2");
    h.manager.install(&e, &InstallOptions::default()).await.unwrap();
    h.manager.remove(&e).await.unwrap();
    h.manager.install(&e, &InstallOptions::default()).await.unwrap();
    assert_eq!(h.manager.state(&e).unwrap(), EditionState::Built);
}

#[tokio::test]
async fn test_activate_requires_installed_edition() {
    let h = harness();
    let err = h.manager.activate(&id("14.2")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownEdition { ref known, .. } if known.is_empty()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_activation_is_idempotent() {
    let h = harness();
    let e = id("14.2");
    h.manager.install(&e, &InstallOptions::default()).await.unwrap();

    let once = h.manager.activate(&e).await.unwrap();
    let mut after_once = link_targets(&h.paths.active_dir());
    after_once.sort();
    let twice = h.manager.activate(&e).await.unwrap();
    let mut after_twice = link_targets(&h.paths.active_dir());
    after_twice.sort();

    assert_eq!(once.linked, twice.linked);
    assert_eq!(after_once, after_twice);
    assert_eq!(h.manager.state(&e).unwrap(), EditionState::Active);
}

#[cfg(unix)]
#[tokio::test]
async fn test_removing_active_edition_clears_entries() {
    let h = harness();
    let e = id("14.2");
    h.manager.install(&e, &InstallOptions::default()).await.unwrap();
    h.manager.activate(&e).await.unwrap();
    assert_eq!(h.manager.active().unwrap(), Some(e.clone()));

    let outcome = h.manager.remove(&e).await.unwrap();
    assert!(outcome.deactivated);
    assert_eq!(fs::read_dir(h.paths.active_dir()).unwrap().count(), 0);
    assert_eq!(h.manager.active().unwrap(), None);
}

#[cfg(unix)]
#[tokio::test]
async fn test_scenario_install_switch_remove() {
    let h = harness();
    let a = id("14.2");
    let b = id("15.1");

    h.manager.install(&a, &InstallOptions::default()).await.unwrap();
    assert_eq!(names(&h.manager.installed().unwrap()), vec!["14.2"]);

    h.manager.activate(&a).await.unwrap();
    let active = h.paths.active_dir();
    assert_eq!(
        fs::read_link(active.join("psql")).unwrap(),
        h.paths.edition_dir(&a).join("src/bin/psql/psql")
    );
    assert!(active.join("pg_dump").exists());
    assert!(active.join("psql.c").exists());

    h.manager.install(&b, &InstallOptions::default()).await.unwrap();
    h.manager.activate(&b).await.unwrap();
    let a_dir = h.paths.edition_dir(&a);
    let targets = link_targets(&active);
    assert!(!targets.is_empty());
    assert!(targets.iter().all(|t| !t.starts_with(&a_dir)));
    assert_eq!(h.manager.active().unwrap(), Some(b.clone()));

    h.manager.remove(&a).await.unwrap();
    assert_eq!(names(&h.manager.installed().unwrap()), vec!["15.1"]);
    assert_eq!(h.manager.state(&b).unwrap(), EditionState::Active);
}

#[cfg(unix)]
#[tokio::test]
async fn test_relative_home_links_resolve() {
    let cwd = std::env::current_dir().unwrap();
    let tmp = tempfile::tempdir_in(&cwd).unwrap();
    let home = tmp.path().strip_prefix(&cwd).unwrap();
    assert!(home.is_relative());
    let manager = EditionManager::new(
        Paths::new(home),
        Config::default(),
        Catalog::builtin(),
        FakeFetcher::default(),
        FakeDriver::default(),
    );
    let e = id("14.2");
    manager.install(&e, &InstallOptions::default()).await.unwrap();

    let report = manager.activate(&e).await.unwrap();
    assert!(report.is_complete());
    assert!(!report.linked.is_empty());
    for entry in &report.linked {
        assert!(fs::read_link(entry).unwrap().is_absolute());
        assert!(entry.exists(), "{} does not resolve", entry.display());
    }
    assert_eq!(manager.active().unwrap(), Some(e));
}
