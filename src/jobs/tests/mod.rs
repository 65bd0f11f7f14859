
use super::*;
use std::path::{Path, PathBuf};

#[test]
fn test_resolve_prefers_given_path() {
    let out = Path::new("output");
    assert_eq!(
        resolve(out, None, SITES_FILE),
        PathBuf::from("output/customer-sites-ids.json")
    );
    assert_eq!(
        resolve(out, Some(Path::new("elsewhere/sites.json")), SITES_FILE),
        PathBuf::from("elsewhere/sites.json")
    );
}

#[test]
fn test_require_dir() {
    let dir = tempfile::tempdir().unwrap();
    assert!(require_dir(dir.path()).is_ok());
    assert!(matches!(
        require_dir(&dir.path().join("absent")),
        Err(Error::Io { .. })
    ));
}
