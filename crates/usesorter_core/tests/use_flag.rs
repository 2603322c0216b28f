use usesorter_core::{FlagState, UseFlag, UseFlagParseError};

#[test]
fn sorting_groups_unset_before_set_then_alphabetical() {
    let mut flags: Vec<UseFlag> = ["gtk", "-X11", "a11", "-doc", "ab", "A"]
        .iter()
        .map(|token| token.parse().expect("token should parse"))
        .collect();

    flags.sort();

    let rendered: Vec<String> = flags.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["-X11", "-doc", "A", "a11", "ab", "gtk"]);
}

#[test]
fn alphabetical_order_is_byte_wise() {
    let ascending = ["a", "a11", "ab", "abc", "ad"].map(|name| UseFlag::new_set(name));
    for pair in ascending.windows(2) {
        assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
    }
    assert!(UseFlag::new_set("A") < UseFlag::new_set("b"));
}

#[test]
fn parse_trims_whitespace_and_reads_state() {
    let set: UseFlag = " ssl\n".parse().expect("flag should parse");
    assert_eq!(set.name(), "ssl");
    assert_eq!(set.state(), FlagState::Set);
    assert!(set.is_set());

    let unset: UseFlag = "-ssl".parse().expect("flag should parse");
    assert_eq!(unset.name(), "ssl");
    assert_eq!(unset.state(), FlagState::Unset);
}

#[test]
fn parse_errors_are_descriptive() {
    let empty = "".parse::<UseFlag>().unwrap_err();
    assert_eq!(empty, UseFlagParseError::Empty);
    assert_eq!(empty.to_string(), "use flag must not be empty");

    let nameless = " - ".parse::<UseFlag>().unwrap_err();
    assert_eq!(nameless, UseFlagParseError::MissingName);
}

#[test]
fn serde_uses_display_form() {
    let flags = vec![UseFlag::new_set("X11"), UseFlag::new_unset("gtk")];
    let json = serde_json::to_string(&flags).unwrap();
    assert_eq!(json, r#"["X11","-gtk"]"#);

    let decoded: Vec<UseFlag> = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, flags);
}
