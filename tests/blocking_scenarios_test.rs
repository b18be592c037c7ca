use adblock_dns::blocking::AdBlocker;
use adblock_dns::blocking::lookup::normalize;
use adblock_dns::blocking::parser::parse_line;

#[test]
fn load_and_block_scenario() {
    let lines = ["127.0.0.1 ads.example.com", "||tracker.example.net^", "0.0.0.0 www.metrics.example.org"];

    let mut domains: Vec<String> = lines
        .iter()
        .filter_map(|l| parse_line(l))
        .filter_map(|raw| normalize(raw, 255))
        .collect();
    domains.sort();

    assert_eq!(
        domains,
        vec!["ads.example.com".to_string(), "metrics.example.org".to_string(), "tracker.example.net".to_string()]
    );
}

#[test]
fn duplicate_and_www_stripping_scenario() {
    let a = normalize("WWW.foo.com", 255).unwrap();
    let b = normalize("foo.com", 255).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn override_add_and_persist_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = AdBlocker::new(1000, 65536, 255, dir.path().join("custom.txt"));

    assert!(blocker.add_override("new.bad").await.unwrap());
    assert!(blocker.contains("new.bad"));

    let contents = tokio::fs::read_to_string(dir.path().join("custom.txt")).await.unwrap();
    assert_eq!(contents, "new.bad\n");
}

#[tokio::test]
async fn override_delete_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = AdBlocker::new(1000, 65536, 255, dir.path().join("custom.txt"));

    blocker.add_override("ads.example.com").await.unwrap();
    assert!(blocker.remove_override("ads.example.com").await.unwrap());
    assert!(!blocker.contains("ads.example.com"));

    let contents = tokio::fs::read_to_string(dir.path().join("custom.txt")).await.unwrap();
    assert_eq!(contents, "ads.example.com\n#ads.example.com\n");
}
