//! Behavioural properties of the rewriter over parsed listings.

use splice::pipeline::{load_patterns_str, rewrite_listing};
use splice_ir::{Label, RegionKind, Token, parse_listing, print_listing};
use splice_rewrite::{AmbiguityPolicy, Pattern, PatternSet, TargetMatcher};

fn pattern(name: &str, target: &[&str], replacement: &[&str]) -> Pattern {
    let target = target
        .iter()
        .map(|opcode| TargetMatcher::new(splice_ir::Opcode::from_dynamic(opcode)))
        .collect();
    let replacement = replacement
        .iter()
        .map(|opcode| Token::new(splice_ir::Opcode::from_dynamic(opcode)))
        .collect();
    Pattern::new(name, target, replacement).expect("valid pattern")
}

fn run(set: &PatternSet, listing: &str) -> Vec<Token> {
    set.rewrite(parse_listing(listing).expect("valid listing"))
        .collect()
}

#[test]
fn test_no_patterns_is_identity() {
    let listing = "#1: ldarg.0\n{try} dup\ncall method System.Console::WriteLine\n#2: ret\n";
    let output = run(&PatternSet::new(), listing);
    assert_eq!(print_listing(&output), listing);
}

#[test]
fn test_span_markers_and_region_move_to_replacement() {
    let set = PatternSet::new().add_pattern(pattern("bc", &["b", "c"], &["x"]));
    let output = run(&set, "a\n#1: {try} b\n#2: c\n#3: d\n");

    assert_eq!(output.len(), 3);
    let x = &output[1];
    assert_eq!(x.opcode.name(), "x");
    assert!(x.jump_markers.contains(Label(1)));
    assert!(x.jump_markers.contains(Label(2)));
    assert_eq!(x.jump_markers.len(), 2);
    assert_eq!(x.region_tag.map(|tag| tag.kind), Some(RegionKind::Try));

    // The token after the span keeps only its own marker.
    assert_eq!(output[2].jump_markers.iter().copied().collect::<Vec<_>>(), vec![Label(3)]);
    assert!(output[0].jump_markers.is_empty());
}

#[test]
fn test_deletion_keeps_jump_target() {
    let set = PatternSet::new().add_pattern(pattern("drop", &["pop"], &[]));
    let output = run(&set, "ldarg.0\n#7: pop\nret\n");
    assert_eq!(print_listing(&output), "ldarg.0\n#7: nop\nret\n");
}

#[test]
fn test_independent_patterns_both_fire() {
    let set = PatternSet::new()
        .add_pattern(pattern("ab", &["a", "b"], &["x"]))
        .add_pattern(pattern("cd", &["c", "d"], &["y", "z"]));
    let output = run(&set, "a\nb\ne\nc\nd\na\nb\n");
    assert_eq!(print_listing(&output), "x\ne\ny\nz\nx\n");
}

#[test]
fn test_independent_patterns_fire_inside_a_failed_longer_match() {
    let set = PatternSet::new()
        .add_pattern(pattern("ab", &["a", "b"], &["x"]))
        .add_pattern(pattern("c", &["c"], &["y"]))
        .add_pattern(pattern("abcq", &["a", "b", "c", "q"], &["z"]));
    let output = run(&set, "a\nb\nc\nw\n");
    assert_eq!(print_listing(&output), "x\ny\nw\n");
}

#[test]
fn test_abandoned_partial_match_passes_through() {
    let set = PatternSet::new().add_pattern(pattern("bc", &["b", "c"], &["x"]));
    let output = run(&set, "a\nb\na\nb\nc\n");
    assert_eq!(print_listing(&output), "a\nb\na\nx\n");
}

#[test]
fn test_unfinished_match_at_end_is_emitted_verbatim() {
    let set = PatternSet::new().add_pattern(pattern("abc", &["a", "b", "c"], &["x"]));
    let output = run(&set, "r\na\nb\n");
    assert_eq!(print_listing(&output), "r\na\nb\n");
}

#[test]
fn test_output_length_accounts_for_replacements() {
    let set = PatternSet::new()
        .add_pattern(pattern("shrink", &["a", "b", "c"], &["x"]))
        .add_pattern(pattern("grow", &["d"], &["y", "y", "y"]));
    let listing = "a\nb\nc\nd\ne\na\nb\nc\n";
    let mut rewrite = set.rewrite(parse_listing(listing).unwrap());
    let output: Vec<_> = rewrite.by_ref().collect();
    let stats = rewrite.stats();

    assert_eq!(stats.tokens_in, 8);
    assert_eq!(stats.per_pattern, vec![2, 1]);
    // 8 - 2 * (3 - 1) + 1 * (3 - 1)
    assert_eq!(output.len(), 6);
    assert_eq!(stats.tokens_out, output.len());
}

#[test]
fn test_no_state_leaks_between_rewrites() {
    let set = PatternSet::new().add_pattern(pattern("ab", &["a", "b"], &["x"]));

    // Ends mid-match; the next pass must start clean.
    assert_eq!(print_listing(&run(&set, "c\na\n")), "c\na\n");
    assert_eq!(print_listing(&run(&set, "b\na\nb\n")), "b\nx\n");
    assert_eq!(set.patterns()[0].replacement().len(), 1);
}

#[test]
fn test_parallel_rewrites_share_patterns() {
    let set = load_patterns_str(
        "pattern ab {\n  a\n  b\n} => {\n  x\n}\n",
        AmbiguityPolicy::Reject,
    )
    .unwrap();

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let set = &set;
                scope.spawn(move || {
                    let listing = "a\nb\nc\n".repeat(i + 1);
                    rewrite_listing(set, &listing).unwrap().listing
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output, &"x\nc\n".repeat(i + 1));
    }
}

#[test]
fn test_strict_policy_rejects_equal_targets() {
    let err = load_patterns_str(
        "pattern one {\n  pop\n} => {}\npattern two {\n  pop\n} => {\n  dup\n}\n",
        AmbiguityPolicy::Reject,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "patterns `one` and `two` can complete with equal length at the same position"
    );
}
