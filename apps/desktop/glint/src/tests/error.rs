// Unit tests for the shell error module
// Tests error serialization (errors cross the UI boundary as JSON)

use crate::error::GlintError;

use common::ErrorLocation;

/// **VALUE**: Tests that errors can be serialized for the UI surface.
///
/// **WHY THIS MATTERS**: Shell errors are shown in the frontend; if
/// serialization breaks, the user sees an opaque failure instead of the
/// diagnostic.
///
/// **BUG THIS CATCHES**: Would catch a removed `#[derive(Serialize)]` or a
/// non-serializable field sneaking into a variant.
#[test]
fn given_glint_error_when_serialized_then_succeeds() {
    // GIVEN: A shell error
    let err = GlintError::Core {
        message: String::from("Test"),
        location: ErrorLocation::here(),
    };

    // WHEN: Serializing to JSON
    let result = serde_json::to_string(&err);

    // THEN: Should succeed and carry the error data
    assert!(result.is_ok(), "Error should serialize for the UI");

    let json = result.unwrap();
    assert!(json.contains("Core"), "JSON should contain variant name");
    assert!(json.contains("Test"), "JSON should contain message");
}
