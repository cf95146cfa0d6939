use serde_json::json;
use wirebind_pointer::{
    format_pointer, get, get_mut, is_strict_prefix, parse_pointer, PointerError,
};

#[test]
fn empty_key_steps_resolve() {
    let doc = json!({"": {"": "deep"}, "foo": "bar"});

    let path = parse_pointer("/").unwrap();
    assert_eq!(get(&doc, &path), Some(&json!({"": "deep"})));

    let path = parse_pointer("//").unwrap();
    assert_eq!(get(&doc, &path), Some(&json!("deep")));
}

#[test]
fn escaped_steps_address_literal_keys() {
    let doc = json!({"a/b": 1, "m~n": 2, "~1": 3});

    assert_eq!(get(&doc, &parse_pointer("/a~1b").unwrap()), Some(&json!(1)));
    assert_eq!(get(&doc, &parse_pointer("/m~0n").unwrap()), Some(&json!(2)));
    assert_eq!(get(&doc, &parse_pointer("/~01").unwrap()), Some(&json!(3)));
}

#[test]
fn rfc6901_example_document_matrix() {
    let doc = json!({
        "foo": ["bar", "baz"],
        "": 0,
        "a/b": 1,
        "c%d": 2,
        "e^f": 3,
        " ": 7,
        "m~n": 8
    });

    let cases: &[(&str, serde_json::Value)] = &[
        ("", doc.clone()),
        ("/foo", json!(["bar", "baz"])),
        ("/foo/0", json!("bar")),
        ("/", json!(0)),
        ("/a~1b", json!(1)),
        ("/c%d", json!(2)),
        ("/e^f", json!(3)),
        ("/ ", json!(7)),
        ("/m~0n", json!(8)),
    ];
    for (pointer, expected) in cases {
        let path = parse_pointer(pointer).unwrap();
        assert_eq!(get(&doc, &path), Some(expected), "pointer {pointer:?}");
        assert_eq!(&format_pointer(&path), pointer);
    }
}

#[test]
fn array_traversal_limits() {
    let doc = json!({"arr": [10, 20, 30]});

    assert_eq!(get(&doc, &parse_pointer("/arr/2").unwrap()), Some(&json!(30)));
    assert_eq!(get(&doc, &parse_pointer("/arr/3").unwrap()), None);
    assert_eq!(get(&doc, &parse_pointer("/arr/-").unwrap()), None);
    // scalars have no children
    assert_eq!(get(&doc, &parse_pointer("/arr/0/x").unwrap()), None);
}

#[test]
fn mutation_through_get_mut() {
    let mut doc = json!({"arr": [1, 2], "obj": {"k": "v"}});

    *get_mut(&mut doc, &parse_pointer("/arr/1").unwrap()).unwrap() = json!(99);
    *get_mut(&mut doc, &parse_pointer("/obj/k").unwrap()).unwrap() = json!("w");
    assert_eq!(doc, json!({"arr": [1, 99], "obj": {"k": "w"}}));
}

#[test]
fn strict_parse_rejections() {
    for bad in ["x", "foo/bar", "~1", " /foo"] {
        assert!(
            matches!(parse_pointer(bad), Err(PointerError::Invalid(_))),
            "expected rejection of {bad:?}"
        );
    }
}

#[test]
fn prefix_relation_over_parsed_pointers() {
    let from = parse_pointer("/a/b").unwrap();
    let into_child = parse_pointer("/a/b/c").unwrap();
    let sibling = parse_pointer("/a/bc").unwrap();

    assert!(is_strict_prefix(&from, &into_child));
    assert!(!is_strict_prefix(&from, &sibling));
    assert!(!is_strict_prefix(&from, &from));
}
