/*!
 * Secure Listing Tests
 * Labels, ordering and the listing sandbox switch
 */

use crate::fixtures::{mediator, RecordingSink, Sandbox};
use pretty_assertions::assert_eq;
use ssf_security_mcp::{EntryLabel, ListingEntry};

fn entry(name: &str, label: EntryLabel) -> ListingEntry {
    ListingEntry {
        name: name.to_string(),
        label,
    }
}

#[tokio::test]
async fn test_listing_marks_sensitive_entries() {
    let sandbox = Sandbox::new();
    sandbox.write("public-data.txt", "public");
    sandbox.write("api-keys.credentials", "key");

    let sink = RecordingSink::new();
    let mediator = mediator(sandbox.config(), sink.clone());
    let outcome = mediator.list_secure(Some(&sandbox.path(""))).await;

    assert_eq!(
        outcome.entries(),
        &[
            entry("api-keys.credentials", EntryLabel::Sensitive),
            entry("public-data.txt", EntryLabel::File),
        ]
    );
    // Listing is not an access signal
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_listing_labels_directories_and_sorts() {
    let sandbox = Sandbox::new();
    sandbox.write("zeta.txt", "z");
    sandbox.write("alpha.txt", "a");
    std::fs::create_dir(sandbox.root.join("docs")).unwrap();
    std::fs::create_dir(sandbox.root.join("secure")).unwrap();

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator.list_secure(None).await;

    // `secure` is a directory, but the child path `<root>/secure` does not
    // contain "/secure/", so it is labelled by kind
    assert_eq!(
        outcome.entries(),
        &[
            entry("alpha.txt", EntryLabel::File),
            entry("docs", EntryLabel::Directory),
            entry("secure", EntryLabel::Directory),
            entry("zeta.txt", EntryLabel::File),
        ]
    );

    let text = outcome.to_string();
    assert!(text.starts_with(&format!("Directory: {}\n\n", sandbox.root.display())));
    assert!(text.contains("[directory] docs"));
}

#[tokio::test]
async fn test_listing_inside_secure_directory_is_sensitive() {
    let sandbox = Sandbox::new();
    sandbox.write("secure/notes.txt", "n");

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator.list_secure(Some(&sandbox.path("secure"))).await;

    assert_eq!(outcome.entries(), &[entry("notes.txt", EntryLabel::Sensitive)]);
}

#[tokio::test]
async fn test_listing_missing_or_file_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox.write("public-data.txt", "public");

    let mediator = mediator(sandbox.config(), RecordingSink::new());

    let missing = mediator.list_secure(Some(&sandbox.path("nope"))).await;
    assert!(missing.is_not_found());
    assert!(missing.to_string().starts_with("Directory not found: "));

    let file = mediator.list_secure(Some(&sandbox.path("public-data.txt"))).await;
    assert!(file.is_not_found());
}

#[tokio::test]
async fn test_listing_outside_sandbox_allowed_by_default() {
    let sandbox = Sandbox::new();
    sandbox.write_outside("elsewhere/readme.txt", "r");
    let outside = sandbox.root.parent().unwrap().join("elsewhere");

    let mediator = mediator(sandbox.config(), RecordingSink::new());
    let outcome = mediator.list_secure(outside.to_str()).await;

    assert_eq!(outcome.entries(), &[entry("readme.txt", EntryLabel::File)]);
}

#[tokio::test]
async fn test_listing_outside_sandbox_denied_when_enforced() {
    let sandbox = Sandbox::new();
    sandbox.write_outside("elsewhere/readme.txt", "r");
    let outside = sandbox.root.parent().unwrap().join("elsewhere");

    let config = sandbox.config().with_sandbox_listings(true);
    let mediator = mediator(config, RecordingSink::new());

    let denied = mediator.list_secure(outside.to_str()).await;
    assert!(denied.is_denied());
    assert!(denied.entries().is_empty());

    // The sandbox root itself still lists
    let allowed = mediator.list_secure(None).await;
    assert!(!allowed.is_denied());
}
