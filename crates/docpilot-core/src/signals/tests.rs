use super::*;

#[test]
fn test_kickoff_project_statement() {
    assert!(looks_like_kickoff(
        "this will be a project that will train local models for Forex trading"
    ));
    assert!(looks_like_kickoff(
        "We're building a new onboarding flow for the billing team"
    ));
}

#[test]
fn test_kickoff_creation_and_deliverable() {
    assert!(looks_like_kickoff(
        "I want to create a new product requirements document for our mobile app"
    ));
    assert!(looks_like_kickoff("Can you draft a design doc for the cache layer?"));
}

#[test]
fn test_short_utterances_are_not_kickoffs() {
    for text in ["yes", "no", "ok", "thanks", "fix this", "new prd", ""] {
        assert!(!looks_like_kickoff(text), "{text:?} should not be a kickoff");
    }
}

#[test]
fn test_questions_are_not_kickoffs() {
    assert!(!looks_like_kickoff("what architectural patterns do you use?"));
    assert!(!looks_like_kickoff("How do you usually structure a design doc?"));
}

#[test]
fn test_chatter_is_not_kickoff() {
    assert!(!looks_like_kickoff("the weather has been really nice lately"));
    assert!(!looks_like_kickoff("please summarize the last meeting for me"));
}

#[test]
fn test_custom_min_words() {
    let heuristic = KickoffHeuristic::new().with_min_words(2);
    assert!(heuristic.looks_like_kickoff("new prd"));
    assert!(!looks_like_kickoff("new prd"));
}

#[test]
fn test_custom_project_statement() {
    let mut heuristic = KickoffHeuristic::new();
    heuristic
        .add_project_statement(r"\bgreenfield\b")
        .unwrap();
    assert!(heuristic.looks_like_kickoff("we have a greenfield thing for the ops team"));
    assert!(heuristic.add_project_statement("(unclosed").is_err());
}

#[test]
fn test_revision_detection() {
    assert!(looks_like_revision(
        "fix the issues found in the document from the review"
    ));
    assert!(looks_like_revision("Please update the draft with the feedback"));
    assert!(!looks_like_revision("fix this"));
    assert!(!looks_like_revision("update me on the weather tomorrow"));
}

#[test]
fn test_revision_is_not_kickoff() {
    assert!(!looks_like_kickoff(
        "fix the issues found in the document from the review"
    ));
}

#[test]
fn test_completion_signal() {
    assert!(is_completion_signal("done"));
    assert!(is_completion_signal("  Done! "));
    assert!(is_completion_signal("I'm done."));
    assert!(is_completion_signal("that's all"));
    assert!(!is_completion_signal("done with the intro section, next"));
    assert!(!is_completion_signal(""));
}

#[test]
fn test_parse_confirmation() {
    assert_eq!(parse_confirmation("yes"), Confirmation::Affirmative);
    assert_eq!(parse_confirmation("Yes, switch"), Confirmation::Affirmative);
    assert_eq!(parse_confirmation("go ahead"), Confirmation::Affirmative);
    assert_eq!(parse_confirmation("no"), Confirmation::Negative);
    assert_eq!(parse_confirmation("Nope, keep going"), Confirmation::Negative);
    assert_eq!(parse_confirmation("tell me more about it"), Confirmation::Other);
    assert_eq!(parse_confirmation("   "), Confirmation::Other);
}

#[test]
fn test_parse_confirmation_hedged_yes() {
    assert_eq!(
        parse_confirmation("ok, but first tell me what is still missing from the current PRD"),
        Confirmation::Other
    );
    assert_eq!(parse_confirmation("yes, but not yet"), Confirmation::Other);
    assert_eq!(parse_confirmation("sure, wait a second"), Confirmation::Other);
    assert_eq!(parse_confirmation("Yeah, maybe later"), Confirmation::Other);
    assert_eq!(parse_confirmation("yes, start the design doc"), Confirmation::Affirmative);
}

#[test]
fn test_revision_custom_min_words() {
    let revision = RevisionDetector::new().with_min_words(6);
    assert!(!revision.looks_like_revision("fix the document"));
    assert!(looks_like_revision("fix the document"));
}
