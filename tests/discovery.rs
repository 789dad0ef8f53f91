use assert_fs::prelude::*;
use capcurate::glossary::{Glossary, DEFAULT_GLOSSARY_FILE};

// Changes the process working directory, so it stays the only test in this binary.
#[test]
fn test_discover_from_relative_directory_walks_parents() {
    let root = assert_fs::TempDir::new().unwrap();
    root.child(DEFAULT_GLOSSARY_FILE)
        .write_str("[[tools]]\nterm = \"DataLad\"\npatterns = [\"data lad\"]\n")
        .unwrap();
    root.child("talks/intro.vtt").write_str("WEBVTT\n").unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(root.child("talks").path()).unwrap();

    let from_dot = Glossary::discover(".", DEFAULT_GLOSSARY_FILE, true);
    let from_empty = Glossary::discover("", DEFAULT_GLOSSARY_FILE, true);
    let local_only = Glossary::discover(".", DEFAULT_GLOSSARY_FILE, false);

    std::env::set_current_dir(previous).unwrap();

    let from_dot = from_dot.unwrap();
    assert_eq!(from_dot.len(), 1);
    assert!(from_dot.get("DataLad").is_some());
    assert_eq!(from_empty.unwrap().len(), 1);
    assert!(local_only.unwrap().is_empty());
}
