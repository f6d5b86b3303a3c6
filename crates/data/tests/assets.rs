use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use strategist_core::{
    evaluate, resolve_jokers, Card, HandKind, HandSelection, HandTable, Joker, OfferKind, Rank,
    ScoringEnv, Suit, TriggerContext,
};
use strategist_data::{
    load_assets, load_joker_defs, load_strategy_config, load_synergy_table, HANDS_FILE,
    JOKERS_FILE, STRATEGY_FILE, SYNERGY_FILE,
};

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

#[test]
fn bundled_assets_load() {
    let assets = load_assets(&assets_root()).expect("load assets");
    assert_eq!(assets.config.risk_tolerance, 0.5);
    assert_eq!(assets.config.discard_samples, 48);
    assert!(assets.config.memory_path.is_none());
    assert_eq!(
        assets.synergy.base_value("cavendish", OfferKind::Joker, None),
        2.0
    );
    assert!(assets.synergy.pair_bonus("wrathful_joker", "arrowhead") > 0.0);
    assert!(assets.catalog.joker("arrowhead").is_some());
    assert!(assets.catalog.joker("cavendish").is_some());
}

#[test]
fn loaded_joker_scores_like_its_description() {
    let assets = load_assets(&assets_root()).expect("load assets");
    let hand = vec![
        Card::standard(Suit::Spades, Rank::Nine),
        Card::standard(Suit::Spades, Rank::Nine),
    ];
    let selection = HandSelection::new(vec![0, 1]);
    let levels = HashMap::new();
    let env = ScoringEnv::new(&assets.table, &levels);
    let evaluation = evaluate(&hand, &selection, &env).expect("evaluate");
    assert_eq!(evaluation.hand, HandKind::Pair);
    let scoring: Vec<Card> = hand.clone();
    let ctx = TriggerContext::played(HandKind::Pair, &hand, &scoring, &[]);
    let resolution = resolve_jokers(
        evaluation,
        &ctx,
        &[Joker::new("arrowhead")],
        &assets.catalog,
    );
    // (10 + 9 + 9 + 50 + 50) x 2
    assert_eq!(resolution.evaluation.score(), 256);
}

#[test]
fn loaded_round_conditions_follow_the_context() {
    let assets = load_assets(&assets_root()).expect("load assets");
    let hand = vec![
        Card::standard(Suit::Spades, Rank::Nine),
        Card::standard(Suit::Hearts, Rank::Nine),
    ];
    let selection = HandSelection::new(vec![0, 1]);
    let levels = HashMap::new();
    let env = ScoringEnv::new(&assets.table, &levels);
    let evaluation = evaluate(&hand, &selection, &env).expect("evaluate");
    let mut ctx = TriggerContext::played(HandKind::Pair, &hand, &hand, &[]);
    let score = |ctx: &TriggerContext<'_>, id: &str| {
        resolve_jokers(evaluation.clone(), ctx, &[Joker::new(id)], &assets.catalog)
            .evaluation
            .score()
    };
    // (10 + 9 + 9) x 2, then x5 while the stencil is the only joker
    ctx.joker_count = 1;
    assert_eq!(score(&ctx, "joker_stencil"), 280);
    ctx.joker_count = 2;
    assert_eq!(score(&ctx, "joker_stencil"), 56);

    assert_eq!(score(&ctx, "veteran"), 56);
    ctx.ante = 5;
    assert_eq!(score(&ctx, "veteran"), 28 * 17);
}

#[test]
fn missing_files_keep_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let assets = load_assets(dir.path()).expect("load assets");
    assert_eq!(assets, strategist_data::Assets::default());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_assets(&dir.path().join("nope")).expect_err("missing dir");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn partial_strategy_file_fills_defaults_and_resolves_memory_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join(STRATEGY_FILE),
        r#"{"risk_tolerance": 0.9, "memory_path": "outcomes.jsonl"}"#,
    )
    .expect("write");
    let assets = load_assets(dir.path()).expect("load assets");
    assert_eq!(assets.config.risk_tolerance, 0.9);
    assert_eq!(assets.config.max_play_candidates, 24);
    assert_eq!(
        assets.config.memory_path,
        Some(dir.path().join("outcomes.jsonl"))
    );
}

#[test]
fn invalid_files_are_rejected_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let strategy = dir.path().join(STRATEGY_FILE);
    fs::write(&strategy, r#"{"risk_tolerance": 1.5}"#).expect("write");
    let err = load_strategy_config(&strategy).expect_err("risk out of range");
    assert!(format!("{err:#}").contains("risk_tolerance"));

    let synergy = dir.path().join(SYNERGY_FILE);
    fs::write(&synergy, "{not json").expect("write");
    let err = load_synergy_table(&synergy).expect_err("bad json");
    assert!(err.to_string().contains("parse"));

    let jokers = dir.path().join(JOKERS_FILE);
    fs::write(
        &jokers,
        r#"[{"id":"a","effect":"Passive"},{"id":"a","effect":"Passive"}]"#,
    )
    .expect("write");
    let err = load_joker_defs(&jokers).expect_err("duplicate");
    assert!(err.to_string().contains("duplicate joker id a"));
}

#[test]
fn hand_rules_override_the_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join(HANDS_FILE),
        r#"[{"hand":"Pair","chips":20,"mult":3.0,"level_chips":10,"level_mult":1.0}]"#,
    )
    .expect("write");
    let assets = load_assets(dir.path()).expect("load assets");
    assert_eq!(assets.table.hand_base_for_level(HandKind::Pair, 1), (20, 3.0));
    assert_eq!(assets.table.hand_base_for_level(HandKind::Pair, 3), (40, 5.0));
    assert_eq!(
        assets.table.rule(HandKind::Flush),
        HandTable::standard().rule(HandKind::Flush)
    );
}
