use super::*;
use rstest::rstest;

#[rstest]
fn generated_constructors_accept_borrowed_strings() {
    let error = UserPersistenceError::duplicate_email("rin@example.com");
    assert_eq!(
        error,
        UserPersistenceError::DuplicateEmail {
            email: "rin@example.com".to_owned()
        }
    );
}

#[rstest]
#[case(
    RelationshipRepositoryError::connection("refused"),
    "relationship repository connection failed: refused"
)]
#[case(
    RelationshipRepositoryError::query("deadlock"),
    "relationship repository query failed: deadlock"
)]
fn relationship_errors_format_message(
    #[case] error: RelationshipRepositoryError,
    #[case] expected: &str,
) {
    assert_eq!(error.to_string(), expected);
}

#[rstest]
fn media_errors_carry_message() {
    let error = MediaStoreError::io("disk full");
    assert!(error.to_string().contains("disk full"));
}
