//! Property-based tests for task validation and error normalization.
//!
//! Uses proptest to verify:
//! 1. Any title of 1..=200 characters with a description of at most 1000
//!    characters validates, and creating it yields a fresh id.
//! 2. Empty or over-long titles fail validation before any table call.
//! 3. Only canonical hyphenated UUID text parses as a task id.
//! 4. Store messages are classified by lowercase keywords only; other
//!    messages, including capitalized keywords, pass through unchanged.

use proptest::prelude::*;
use taskboard::table::MemoryTable;
use taskboard::tasks::ops::normalize_store_error;
use taskboard::tasks::validation::{Field, parse_task_id, validate_new_task};
use taskboard::tasks::{ErrorKind, TaskOps};
use taskboard_proto::table::StoreError;
use taskboard_proto::task::{NewTask, TaskId};
use uuid::Uuid;

/// Strategy for titles that satisfy the length rule.
fn arb_valid_title() -> impl Strategy<Value = String> {
    "[^\x00]{1,200}"
}

/// Strategy for optional descriptions that satisfy the length rule.
fn arb_valid_description() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[^\x00]{0,1000}")
}

/// Strategy for titles that break the length rule.
fn arb_invalid_title() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-zA-Z0-9 ]{201,400}"]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    #[test]
    fn valid_fields_validate(title in arb_valid_title(), description in arb_valid_description()) {
        let mut task = NewTask::new(title);
        task.description = description;
        prop_assert!(validate_new_task(&task).is_ok());
    }

    #[test]
    fn valid_create_assigns_new_id(title in arb_valid_title(), description in arb_valid_description()) {
        let mut task = NewTask::new(title.clone());
        task.description = description;
        let ops = TaskOps::new(MemoryTable::new());
        let created = runtime().block_on(ops.create(&task)).unwrap();
        prop_assert_eq!(created.title, title);
        prop_assert!(ops.table().row(&created.id).is_some());
        prop_assert_eq!(ops.table().len(), 1);
    }

    #[test]
    fn invalid_title_never_reaches_table(title in arb_invalid_title()) {
        let ops = TaskOps::new(MemoryTable::new());
        let err = runtime().block_on(ops.create(&NewTask::new(title))).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Validation);
        prop_assert_eq!(ops.table().calls(), 0);
    }

    #[test]
    fn invalid_title_is_a_title_error(title in arb_invalid_title()) {
        let err = validate_new_task(&NewTask::new(title)).unwrap_err();
        prop_assert!(err.has(Field::Title));
        prop_assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn canonical_uuid_text_parses(n in any::<u128>(), upper in any::<bool>()) {
        let uuid = Uuid::from_u128(n);
        let text = uuid.hyphenated().to_string();
        let text = if upper { text.to_uppercase() } else { text };
        prop_assert_eq!(parse_task_id(&text).unwrap(), TaskId::from_uuid(uuid));
    }

    #[test]
    fn non_canonical_uuid_text_is_rejected(n in any::<u128>()) {
        let uuid = Uuid::from_u128(n);
        prop_assert!(parse_task_id(&uuid.simple().to_string()).is_err());
        prop_assert!(parse_task_id(&uuid.braced().to_string()).is_err());
        prop_assert!(parse_task_id(&uuid.urn().to_string()).is_err());
    }

    #[test]
    fn arbitrary_text_never_panics(text in ".{0,64}") {
        let _ = parse_task_id(&text);
    }

    #[test]
    fn lowercase_keywords_are_classified(prefix in "[a-d ]{0,20}") {
        for (needle, kind) in [
            ("network", ErrorKind::Network),
            ("fetch", ErrorKind::Network),
            ("timeout", ErrorKind::Timeout),
        ] {
            let message = format!("{prefix}{needle}");
            prop_assert_eq!(normalize_store_error(&StoreError::new(message)).kind(), kind);
        }
    }

    #[test]
    fn uppercase_keywords_pass_through(prefix in "[A-D ]{0,20}") {
        for needle in ["NETWORK", "FETCH", "TIMEOUT"] {
            let message = format!("{prefix}{needle}");
            let err = normalize_store_error(&StoreError::new(message.clone()));
            prop_assert_eq!(err.kind(), ErrorKind::Remote);
            prop_assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn other_messages_pass_through(message in "[a-d ]{1,40}") {
        let err = normalize_store_error(&StoreError::new(message.clone()));
        prop_assert_eq!(err.kind(), ErrorKind::Remote);
        prop_assert_eq!(err.to_string(), message);
    }
}
