use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StageError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(StageError::access("x").to_string().contains("access denied:"));
    assert!(
        StageError::transport("x")
            .to_string()
            .contains("transport error:")
    );
    assert!(StageError::render("x").to_string().contains("render error:"));
    assert!(
        StageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn access_denial_is_classified() {
    assert!(StageError::access("cross-origin").is_access_denied());
    assert!(!StageError::render("x").is_access_denied());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
