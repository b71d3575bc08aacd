use super::*;

#[test]
fn test_standard_anti_cheat_wins_over_later_rules() {
    let table = VerdictTable::standard();
    // Contains both "Invalid" and "Planting"; the anti-cheat rule comes first.
    let verdict = table.evaluate("Invalid_Planting_Screenshot");
    assert_eq!(verdict.category, VerdictCategory::Invalid);
    assert!(!verdict.is_verified());

    assert_eq!(
        table.evaluate("Non_SDG_Invalid").category,
        VerdictCategory::Invalid
    );
}

#[test]
fn test_standard_mission_and_recyclable() {
    let table = VerdictTable::standard();

    let planting = table.evaluate("SDG15_Planting");
    assert_eq!(planting.category, VerdictCategory::ValidMission);
    assert_eq!(planting.verdict, "VALID MISSION (SDG 13/15)");
    assert_eq!(planting.sdg.as_deref(), Some("SDG 13/15"));
    assert!(planting.is_verified());

    let recycling = table.evaluate("SDG12_Recycling");
    assert_eq!(recycling.category, VerdictCategory::ValidRecyclable);
    assert_eq!(recycling.sdg.as_deref(), Some("SDG 12"));
}

#[test]
fn test_standard_is_case_sensitive() {
    let table = VerdictTable::standard();
    assert_eq!(
        table.evaluate("sdg15_planting").category,
        VerdictCategory::Rejected
    );
}

#[test]
fn test_standard_fallback() {
    let table = VerdictTable::standard();
    let verdict = table.evaluate("Cars");
    assert_eq!(verdict.category, VerdictCategory::Rejected);
    assert_eq!(verdict.verdict, "REJECT");
    assert!(verdict.sdg.is_none());
}

#[test]
fn test_legacy_lowercase_matching() {
    let table = VerdictTable::legacy();

    assert_eq!(
        table.evaluate("Planting").category,
        VerdictCategory::ValidMission
    );
    for class in ["brown-glass", "PLASTIC", "metal", "paper", "cardboard"] {
        assert_eq!(
            table.evaluate(class).category,
            VerdictCategory::ValidRecyclable,
            "{class}"
        );
    }

    let trash = table.evaluate("trash");
    assert_eq!(trash.category, VerdictCategory::ReviewRequired);
    assert_eq!(trash.verdict, "GENERAL TRASH - REQUIRES REVIEW");
    assert!(!trash.is_verified());

    assert_eq!(table.evaluate("shoes").verdict, "REJECT");
}

#[test]
fn test_custom_table_priority_follows_insertion_order() {
    let table = VerdictTable::new(Verdict::new(VerdictCategory::Rejected, "NO", "no"))
        .rule(VerdictRule::new(
            ["bottle"],
            MatchMode::Lowercase,
            Verdict::new(VerdictCategory::ReviewRequired, "REVIEW", "review"),
        ))
        .rule(VerdictRule::new(
            ["plastic"],
            MatchMode::Lowercase,
            Verdict::new(VerdictCategory::ValidRecyclable, "OK", "ok"),
        ));

    assert_eq!(table.evaluate("plastic bottle").verdict, "REVIEW");
    assert_eq!(table.evaluate("plastic bag").verdict, "OK");
    assert_eq!(table.rules().len(), 2);
}

#[test]
fn test_empty_pattern_never_matches() {
    let rule = VerdictRule::new(
        [""],
        MatchMode::CaseSensitive,
        Verdict::new(VerdictCategory::ValidMission, "OK", "ok"),
    );
    assert!(!rule.matches("anything"));
}

#[test]
fn test_only_valid_categories_verify() {
    assert!(VerdictCategory::ValidMission.is_verified());
    assert!(VerdictCategory::ValidRecyclable.is_verified());
    for category in [
        VerdictCategory::Invalid,
        VerdictCategory::ReviewRequired,
        VerdictCategory::Rejected,
        VerdictCategory::Uncertain,
    ] {
        assert!(!category.is_verified());
    }
    assert!(!Verdict::uncertain().is_verified());
    assert_eq!(Verdict::ai_generated().verdict, AI_GENERATED_VERDICT);
}
