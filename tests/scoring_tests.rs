//! End-to-end tests: segmentation extraction through scoring, catalog
//! persistence, and the serialized result contract.

use posecoach::catalog::ReferenceCatalog;
use posecoach::densepose::types::InstanceResult;
use posecoach::densepose::snapshot_from_instance;
use posecoach::scorer::activation::ActivationModel;
use posecoach::scorer::config::{default_config, Thresholds};
use posecoach::scorer::types::{FeedbackItem, Importance, Landmark, PoseSnapshot};
use posecoach::scorer::PoseScorer;
use tempfile::TempDir;

fn full_pose() -> PoseSnapshot {
    PoseSnapshot::new(vec![
        Landmark::new("head", 100.0, 20.0, 0.9),
        Landmark::new("torso", 100.0, 60.0, 0.9),
        Landmark::new("left_upper_arm", 80.0, 55.0, 0.9),
        Landmark::new("right_upper_arm", 120.0, 55.0, 0.9),
        Landmark::new("left_lower_arm", 75.0, 80.0, 0.9),
        Landmark::new("right_lower_arm", 125.0, 80.0, 0.9),
        Landmark::new("left_hand", 70.0, 105.0, 0.9),
        Landmark::new("right_hand", 130.0, 105.0, 0.9),
        Landmark::new("left_upper_leg", 90.0, 100.0, 0.9),
        Landmark::new("right_upper_leg", 110.0, 100.0, 0.9),
        Landmark::new("left_lower_leg", 88.0, 140.0, 0.9),
        Landmark::new("right_lower_leg", 112.0, 140.0, 0.9),
        Landmark::new("left_foot", 86.0, 175.0, 0.9),
        Landmark::new("right_foot", 114.0, 175.0, 0.9),
    ])
}

#[test]
fn extraction_feeds_scoring_pipeline() {
    // A mirrored segmentation grid: head, torso, and both hands
    let grid = vec![
        vec![0, 23, 24, 0],
        vec![1, 1, 2, 2],
        vec![1, 1, 2, 2],
        vec![4, 0, 0, 3],
    ];
    let instance = InstanceResult {
        body_parts: grid,
        u_coordinates: vec![],
        v_coordinates: vec![],
        bbox: vec![40.0, 10.0, 120.0, 170.0],
        score: 0.9,
    };
    let snapshot = snapshot_from_instance(&instance).unwrap();
    assert!(snapshot.get("torso").is_some());
    assert!(snapshot.get("head").is_some());

    // The extracted snapshot scores cleanly against itself
    let scorer = PoseScorer::new(default_config());
    let result = scorer.compare(&snapshot, &snapshot).unwrap();
    assert!(result.alignment_score.unwrap() >= 9.5);
    // Hand centroids sit at uneven midline distances in this grid, so
    // symmetry is below max but the total still lands high
    assert!(result.total_score >= 7.5);
}

#[test]
fn catalog_round_trip_preserves_scoring_behavior() {
    let dir = TempDir::new().unwrap();
    let catalog = ReferenceCatalog::new(&dir.path().join("catalog.db")).unwrap();
    let scorer = PoseScorer::new(default_config());

    let reference = full_pose();
    catalog
        .add("front_relaxed", "front_relaxed", None, &reference, "test")
        .unwrap();

    let stored = catalog.get_by_name("front_relaxed").unwrap().unwrap();
    let direct = scorer.compare(&reference, &reference).unwrap();
    let via_catalog = scorer.compare(&reference, &stored.snapshot).unwrap();
    assert_eq!(direct, via_catalog);
}

#[test]
fn custom_activation_model_is_pluggable() {
    struct FixedScore(f32);

    impl ActivationModel for FixedScore {
        fn name(&self) -> &str {
            "fixed"
        }
        fn score(
            &self,
            _user: &PoseSnapshot,
            _reference: &PoseSnapshot,
            _thresholds: &Thresholds,
        ) -> Option<(f32, Vec<FeedbackItem>)> {
            Some((
                self.0,
                vec![FeedbackItem {
                    message: "Flex harder through the hold".to_string(),
                    importance: Importance::Medium,
                    score: Some(self.0),
                }],
            ))
        }
    }

    let scorer = PoseScorer::with_activation_model(default_config(), Box::new(FixedScore(2.0)));
    let pose = full_pose();
    let result = scorer.compare(&pose, &pose).unwrap();

    assert_eq!(result.muscle_activation_score, Some(2.0));
    // Symmetry/alignment are perfect, so the activation model's score
    // drags the weighted total below the maximum
    assert!(result.total_score < 9.0);
    assert!(result
        .feedback
        .iter()
        .any(|f| f.message.contains("Flex harder")));
}

#[test]
fn result_json_contract() {
    let scorer = PoseScorer::new(default_config());
    let reference = full_pose();
    let mut user = full_pose();
    for l in &mut user.landmarks {
        if l.name == "right_hand" {
            l.x += 60.0;
        }
    }

    let result = scorer.compare(&user, &reference).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["totalScore"].is_number());
    assert!(value["symmetryScore"].is_number());
    assert!(value["alignmentScore"].is_number());
    assert!(value["muscleActivationScore"].is_number());
    let feedback = value["feedback"].as_array().unwrap();
    assert!(!feedback.is_empty());
    for item in feedback {
        assert!(item["message"].is_string());
        let importance = item["importance"].as_str().unwrap();
        assert!(matches!(importance, "LOW" | "MEDIUM" | "HIGH"));
    }
}

#[test]
fn session_history_stores_full_result() {
    use posecoach::history::SessionHistory;

    let dir = TempDir::new().unwrap();
    let history = SessionHistory::new(&dir.path().join("history.db")).unwrap();
    let scorer = PoseScorer::new(default_config());

    let pose = full_pose();
    let result = scorer.compare(&pose, &pose).unwrap();
    let id = history.record("front_relaxed", None, &result).unwrap();

    let detail = history.get(id).unwrap();
    assert_eq!(detail.result, result);
}
