use adblock_dns::blocking::index::{DomainIndex, SearchResult};

fn is_sorted_ascending(index: &DomainIndex, names: &[&str]) -> bool {
    let mut positions: Vec<usize> = names
        .iter()
        .filter_map(|n| match index.search(n) {
            SearchResult::Found(idx) => Some(idx),
            SearchResult::InsertAt(_) => None,
        })
        .collect();
    let sorted = {
        let mut copy = positions.clone();
        copy.sort_unstable();
        copy
    };
    positions == sorted
}

#[test]
fn ptrs_stay_ascending_after_arbitrary_insert_order() {
    let mut index = DomainIndex::new(1000, 65536);
    let names = ["zzz.com", "aaa.com", "mmm.com", "bbb.com", "yyy.com"];
    for name in names {
        index.insert(name);
    }
    assert!(is_sorted_ascending(&index, &names));
}

#[test]
fn contains_respects_tombstones_without_intervening_wipe() {
    let mut index = DomainIndex::new(1000, 65536);
    index.insert("a.com");
    index.insert("b.com");
    index.delete("a.com");

    assert!(!index.contains("a.com"));
    assert!(index.contains("b.com"));

    index.insert("a.com");
    assert!(index.contains("a.com"));
}

#[test]
fn add_then_delete_then_check() {
    let mut index = DomainIndex::new(1000, 65536);
    index.insert("x.com");
    index.delete("x.com");
    assert!(!index.contains("x.com"));
}

#[test]
fn delete_then_add_then_check() {
    let mut index = DomainIndex::new(1000, 65536);
    index.delete("x.com");
    index.insert("x.com");
    assert!(index.contains("x.com"));
}

#[test]
fn a_partially_filled_index_is_queryable_mid_fill() {
    let mut index = DomainIndex::new(1000, 65536);
    for i in 0..50 {
        index.insert(&format!("host{i}.example.com"));
    }
    assert_eq!(index.len(), 50);
    assert!(index.contains("host10.example.com"));
}
