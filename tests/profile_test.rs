//! Disposable-profile tests.
//!
//! Everything touching the HOME variable is serialized; the variable
//! is process-wide and two scopes at once would trample each other.

use std::env;
use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use foxtrap::profile::{extension_id, with_clean_home, write_profile_tree, ProfileSpec};
use foxtrap::FoxtrapError;

const INSTALL_RDF: &str = r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:install-manifest">
    <em:id>y-u-no-validate@example.org</em:id>
    <em:name>Y U No Validate</em:name>
  </Description>
</RDF>
"#;

#[test]
fn extension_id_reads_a_manifest_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let rdf = tmp.path().join("install.rdf");
    fs::write(&rdf, INSTALL_RDF).unwrap();

    assert_eq!(extension_id(&rdf).unwrap(), "y-u-no-validate@example.org");
}

#[test]
fn written_tree_has_registry_and_prefs() {
    let tmp = tempfile::tempdir().unwrap();
    let spec = ProfileSpec::new("addon@example.org");

    write_profile_tree(tmp.path(), &spec).unwrap();

    let ini = fs::read_to_string(tmp.path().join(".mozilla/firefox/profiles.ini")).unwrap();
    assert!(ini.contains("StartWithLastProfile=1"));
    assert!(ini.contains("Path=default"));

    let prefs = fs::read_to_string(tmp.path().join(".mozilla/firefox/default/prefs.js")).unwrap();
    let today = chrono::Local::now().date_naive();
    assert!(prefs.contains(&format!(
        "user_pref(\"extensions.enabledItems\", \"addon@example.org:{}\");",
        today
    )));
    assert!(prefs.contains("user_pref(\"network.proxy.type\", 1);"));
}

#[test]
#[serial]
fn scope_redirects_home_then_restores_and_deletes() {
    let original_home = env::var("HOME").unwrap();
    let spec = ProfileSpec::new("addon@example.org");
    let mut inside_home = PathBuf::new();

    with_clean_home(&spec, || {
        inside_home = PathBuf::from(env::var("HOME").unwrap());
        assert_ne!(inside_home.to_string_lossy(), original_home.as_str());
        assert!(inside_home
            .join(".mozilla/firefox/profiles.ini")
            .is_file());
        assert!(inside_home
            .join(".mozilla/firefox/default/prefs.js")
            .is_file());
        Ok(())
    })
    .unwrap();

    assert_eq!(env::var("HOME").unwrap(), original_home);
    assert!(!inside_home.exists());
}

#[test]
#[serial]
fn failing_scope_still_restores_and_deletes() {
    let original_home = env::var("HOME").unwrap();
    let spec = ProfileSpec::new("addon@example.org");
    let mut inside_home = PathBuf::new();

    let err = with_clean_home(&spec, || -> foxtrap::Result<()> {
        inside_home = PathBuf::from(env::var("HOME").unwrap());
        Err(FoxtrapError::Automation("window never appeared".to_string()))
    })
    .unwrap_err();

    assert!(matches!(err, FoxtrapError::Automation(_)));
    assert_eq!(env::var("HOME").unwrap(), original_home);
    assert!(!inside_home.exists());
}

#[test]
#[serial]
#[cfg(unix)]
fn deletion_failure_beats_the_scope_error() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores directory write bits, so the cleanup cannot be made
    // to fail under it.
    if unsafe { libc::geteuid() } == 0 {
        eprintln!("Skipping test: running as root");
        return;
    }

    let original_home = env::var("HOME").unwrap();
    let spec = ProfileSpec::new("addon@example.org");
    let mut inside_home = PathBuf::new();

    let err = with_clean_home(&spec, || -> foxtrap::Result<()> {
        inside_home = PathBuf::from(env::var("HOME").unwrap());
        let sealed = inside_home.join("sealed");
        fs::create_dir(&sealed)?;
        fs::write(sealed.join("keep"), "x")?;
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o555))?;
        Err(FoxtrapError::Automation("window never appeared".to_string()))
    })
    .unwrap_err();

    assert!(matches!(err, FoxtrapError::IoError(_)), "got {:?}", err);
    assert_eq!(env::var("HOME").unwrap(), original_home);

    // The failed deletion leaves the tree behind; unseal and clear it.
    assert!(inside_home.exists());
    fs::set_permissions(
        inside_home.join("sealed"),
        fs::Permissions::from_mode(0o755),
    )
    .unwrap();
    fs::remove_dir_all(&inside_home).unwrap();
}

#[test]
#[serial]
fn unset_home_is_a_profile_error() {
    let original_home = env::var("HOME").unwrap();
    env::remove_var("HOME");
    let spec = ProfileSpec::new("addon@example.org");

    let mut entered = false;
    let result = with_clean_home(&spec, || {
        entered = true;
        Ok(())
    });

    env::set_var("HOME", &original_home);
    let err = result.unwrap_err();
    assert!(matches!(err, FoxtrapError::Profile(_)));
    assert!(!entered);
}

#[test]
#[serial]
fn panicking_scope_still_restores_home() {
    let original_home = env::var("HOME").unwrap();
    let spec = ProfileSpec::new("addon@example.org");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = with_clean_home(&spec, || -> foxtrap::Result<()> {
            panic!("driven test blew up");
        });
    }));

    assert!(result.is_err());
    assert_eq!(env::var("HOME").unwrap(), original_home);
}

#[test]
#[serial]
fn pipeline_from_manifest_to_live_home() {
    let tmp = tempfile::tempdir().unwrap();
    let rdf = tmp.path().join("install.rdf");
    fs::write(&rdf, INSTALL_RDF).unwrap();

    let id = extension_id(&rdf).unwrap();
    let spec = ProfileSpec::new(&id);

    with_clean_home(&spec, || {
        let home = PathBuf::from(env::var("HOME").unwrap());
        let prefs = fs::read_to_string(home.join(".mozilla/firefox/default/prefs.js"))?;
        assert!(prefs.contains("y-u-no-validate@example.org:"));
        Ok(())
    })
    .unwrap();
}
