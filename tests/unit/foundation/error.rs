use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LpeError::invalid_parameter("x")
            .to_string()
            .contains("invalid parameter:")
    );
    assert!(
        LpeError::degenerate("x")
            .to_string()
            .contains("degenerate input:")
    );
    assert!(
        LpeError::unknown_kind("x")
            .to_string()
            .contains("unknown effect kind:")
    );
    assert!(LpeError::broken("x").to_string().contains("broken effect:"));
    assert!(
        LpeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LpeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_degenerate_is_recoverable() {
    assert!(LpeError::degenerate("too few nodes").is_degenerate());
    assert!(!LpeError::broken("orphan").is_degenerate());
}
