use serde_json::json;

use super::*;

fn key() -> Vec<Statement> {
    vec![
        Statement { statement: "Teks berjudul Hutan".into(), answer: true, points: 10.0, evidence_points: 0.0 },
        Statement { statement: "Tokoh utama seekor kucing".into(), answer: false, points: 10.0, evidence_points: 5.0 },
        Statement { statement: "Latar di kota".into(), answer: true, points: 5.0, evidence_points: 0.0 },
    ]
}

#[test]
fn all_correct_earns_everything() {
    let score = statement_score(&key(), &json!({"statements": [true, false, true]}));
    assert_eq!(score, Score { earned: 25.0, possible: 25.0 });
}

#[test]
fn wrong_answers_earn_nothing() {
    let score = statement_score(&key(), &json!({"statements": [false, false, false]}));
    assert_eq!(score, Score { earned: 10.0, possible: 25.0 });
}

#[test]
fn missing_and_non_boolean_entries_earn_nothing() {
    let score = statement_score(&key(), &json!({"statements": [true, "false"]}));
    assert_eq!(score, Score { earned: 10.0, possible: 25.0 });
}

#[test]
fn no_answers_at_all() {
    let score = statement_score(&key(), &json!({"evidence": ["paragraf 1"]}));
    assert_eq!(score, Score { earned: 0.0, possible: 25.0 });
}

#[test]
fn empty_key_scores_zero() {
    assert_eq!(statement_score(&[], &json!({"statements": [true]})), Score::default());
}

#[test]
fn statement_reads_camel_case_with_defaults() {
    let s: Statement = serde_json::from_value(json!({"statement": "x", "answer": true, "evidencePoints": 2})).unwrap();
    assert!(s.points.abs() < f64::EPSILON);
    assert!((s.evidence_points - 2.0).abs() < f64::EPSILON);
}

#[test]
fn rubric_max_sums_criteria() {
    let rubric = vec![
        RubricItem { criterion: "Lafal".into(), max_score: 25.0 },
        RubricItem { criterion: "Intonasi".into(), max_score: 25.0 },
        RubricItem { criterion: "Isi".into(), max_score: 50.0 },
    ];
    assert!((rubric_max(&rubric) - 100.0).abs() < f64::EPSILON);
    assert!(rubric_max(&[]).abs() < f64::EPSILON);
}

#[test]
fn strip_answer_key_removes_only_answers() {
    let mut section = json!({
        "videoUrl": "https://youtu.be/dQw4w9WgXcQ",
        "statements": [
            {"statement": "a", "answer": true, "points": 5},
            {"statement": "b", "answer": false, "points": 5}
        ]
    });
    strip_answer_key(&mut section);
    assert_eq!(section["statements"][0], json!({"statement": "a", "points": 5}));
    assert!(section["statements"][1].get("answer").is_none());
    assert_eq!(section["videoUrl"], "https://youtu.be/dQw4w9WgXcQ");
}

#[test]
fn strip_answer_key_tolerates_missing_statements() {
    let mut section = json!({"prompts": ["Tulis pendapatmu"]});
    strip_answer_key(&mut section);
    assert_eq!(section, json!({"prompts": ["Tulis pendapatmu"]}));
}
