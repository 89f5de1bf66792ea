use scene_layout::cli::{self, Args, PLACED_OBJECTS_FILE, RENDER_LAYOUT_FILE};
use scene_layout::config::LayoutSettings;
use scene_layout::export::output_records;
use scene_layout::oracle::ScriptedOracle;
use scene_layout::test_utils::RecordingOracle;
use scene_layout::{LayoutEngine, ObjectDescriptor, Placement, Vector3D};
use std::collections::BTreeSet;
use std::sync::Arc;

fn table_and_cup() -> Vec<ObjectDescriptor> {
    vec![
        ObjectDescriptor::new("Table", Vector3D::new(1.0, 1.0, 1.0)),
        ObjectDescriptor::new("Cup", Vector3D::new(0.1, 0.1, 0.1)),
    ]
}

fn cup_oracle() -> RecordingOracle {
    RecordingOracle::stacking()
        .with_place("Table", Placement::new(Vector3D::ZERO, Vector3D::ZERO))
        .with_place(
            "Cup",
            Placement::new(Vector3D::new(0.05, 0.5, 0.05), Vector3D::ZERO),
        )
        .with_update(
            "Cup",
            Placement::new(Vector3D::new(0.0, 1.0, 0.0), Vector3D::ZERO),
        )
}

fn settings(collision_epsilon: f64) -> LayoutSettings {
    LayoutSettings {
        collision_epsilon,
        ..LayoutSettings::default()
    }
}

#[tokio::test]
async fn test_cup_lifted_off_table() {
    let oracle = Arc::new(cup_oracle());
    let engine = LayoutEngine::new(oracle.clone(), settings(0.0));

    let outcome = engine
        .run(&table_and_cup(), "a kitchen", "")
        .await
        .unwrap();

    let table = &outcome.placed[0];
    let cup = &outcome.placed[1];
    assert_eq!(table.center(), Vector3D::ZERO);
    assert_eq!(table.rotation(), Vector3D::ZERO);
    assert_eq!(cup.center(), Vector3D::new(0.0, 1.0, 0.0));

    // Table is visited first and answered with its own placement
    let requests = oracle.update_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].0, "Cup");
    assert_eq!(requests[1].1, BTreeSet::from(["Table".to_string()]));
}

#[tokio::test]
async fn test_shallow_overlap_tolerated_at_default_epsilon() {
    let oracle = Arc::new(cup_oracle());
    let engine = LayoutEngine::new(oracle.clone(), LayoutSettings::default());

    let outcome = engine
        .run(&table_and_cup(), "a kitchen", "")
        .await
        .unwrap();

    assert_eq!(oracle.update_calls(), 0);
    assert_eq!(outcome.placed[1].center(), Vector3D::new(0.05, 0.5, 0.05));
}

#[tokio::test]
async fn test_cascade_updates_each_object_once() {
    let descriptors: Vec<ObjectDescriptor> = ["A", "B", "C"]
        .iter()
        .map(|name| ObjectDescriptor::new(*name, Vector3D::new(2.0, 2.0, 2.0)))
        .collect();
    let oracle = Arc::new(RecordingOracle::fixed(Placement::new(
        Vector3D::ZERO,
        Vector3D::ZERO,
    )));
    let engine = LayoutEngine::new(oracle.clone(), LayoutSettings::default());

    let outcome = engine.run(&descriptors, "", "").await.unwrap();

    assert_eq!(oracle.update_calls(), 3);
    assert_eq!(outcome.refinement.unwrap().corrected_count(), 3);
}

#[tokio::test]
async fn test_deterministic_oracle_reproduces_output() {
    let script = || {
        ScriptedOracle::default()
            .with_place("Table", Placement::new(Vector3D::ZERO, Vector3D::ZERO))
            .with_place(
                "Cup",
                Placement::new(Vector3D::new(0.05, 0.5, 0.05), Vector3D::new(0.0, 30.0, 0.0)),
            )
            .with_update("Table", Placement::new(Vector3D::ZERO, Vector3D::ZERO))
            .with_update(
                "Cup",
                Placement::new(Vector3D::new(0.0, 1.0, 0.0), Vector3D::ZERO),
            )
    };

    let first = LayoutEngine::new(Arc::new(script()), settings(0.0))
        .run(&table_and_cup(), "a kitchen", "")
        .await
        .unwrap();
    let second = LayoutEngine::new(Arc::new(script()), settings(0.0))
        .run(&table_and_cup(), "a kitchen", "")
        .await
        .unwrap();

    assert_eq!(output_records(&first.placed), output_records(&second.placed));
}

#[tokio::test]
async fn test_output_matches_input_order() {
    let descriptors: Vec<ObjectDescriptor> = (0..6)
        .map(|i| ObjectDescriptor::new(format!("Box{}", i), Vector3D::new(1.0, 1.0, 1.0)))
        .collect();
    let engine = LayoutEngine::new(Arc::new(RecordingOracle::stacking()), LayoutSettings::default());

    let outcome = engine.run(&descriptors, "", "").await.unwrap();

    let names: Vec<&str> = outcome.placed.iter().map(|p| p.name()).collect();
    let expected: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_cli_run_with_replay_script() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("assets.json"),
        r#"{"assets": [
            {"id": "tbl-01", "name": "Table", "size": [1, 1, 1]},
            {"id": "cup-07", "name": "Cup", "size": [0.1, 0.1, 0.1],
             "pivot_offset": [0, 0.05, 0]}
        ]}"#,
    )
    .unwrap();
    std::fs::write(root.join("objects.json"), r#"["tbl-01", "cup-07"]"#).unwrap();
    std::fs::write(
        root.join("script.json"),
        r#"{
            "place": {
                "Table": {"center": [0, 0, 0], "rotation": [0, 0, 0]},
                "Cup": {"center": [0.05, 0.5, 0.05], "rotation": [0, 0, 0]}
            },
            "update": {
                "Table": {"center": [0, 0, 0], "rotation": [0, 0, 0]},
                "Cup": {"center": [0, 1.0, 0], "rotation": [0, 0, 0]}
            }
        }"#,
    )
    .unwrap();
    let config_path = root.join("scene-layout.toml");
    std::fs::write(
        &config_path,
        format!(
            "[layout]\ncollision_epsilon = 0.0\n\n[model]\nprovider = \"replay\"\nreplay_file = {:?}\n\n[paths]\nassets = {:?}\n",
            root.join("script.json"),
            root.join("assets.json"),
        ),
    )
    .unwrap();

    let out = root.join("results");
    let args = Args {
        scene: "a kitchen".to_string(),
        objects: root.join("objects.json"),
        constraints: None,
        keep_order: false,
        config: Some(config_path),
        assets: None,
        no_refinement: false,
        model: None,
        output_dir: Some(out.clone()),
    };
    cli::run(args).await.unwrap();

    let placed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(PLACED_OBJECTS_FILE)).unwrap())
            .unwrap();
    assert_eq!(placed[1]["name"], "Cup");
    assert_eq!(placed[1]["center"], serde_json::json!([0.0, 1.0, 0.0]));

    let render: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(RENDER_LAYOUT_FILE)).unwrap())
            .unwrap();
    assert_eq!(render[1]["uid"], "cup-07");
    // Pivot 0.05 below the center, then y/z swapped
    assert_eq!(render[1]["position"], serde_json::json!([0.0, 0.0, 0.95]));
}

#[tokio::test]
async fn test_model_order_feeds_sequencer() {
    use scene_layout::assets::{prepare_descriptors, AssetCatalog, AssetRecord};
    use scene_layout::oracle::providers::MockProvider;
    use scene_layout::oracle::OrderResolver;
    use scene_layout::LayoutError;

    let catalog = AssetCatalog::new([
        AssetRecord {
            id: "cup-07".to_string(),
            name: "Cup".to_string(),
            size: Vector3D::new(0.1, 0.1, 0.1),
            pivot_offset: None,
            fixed_rotation: None,
        },
        AssetRecord {
            id: "tbl-01".to_string(),
            name: "Table".to_string(),
            size: Vector3D::new(1.0, 1.0, 1.0),
            pivot_offset: None,
            fixed_rotation: None,
        },
    ]);
    let ids = vec!["cup-07".to_string(), "tbl-01".to_string()];
    let prepared = prepare_descriptors(&catalog, &ids).unwrap();

    let resolver = OrderResolver::new(Arc::new(MockProvider::new(r#"["Table", "Cup"]"#)));
    let ordered = resolver
        .arrange("The cup is on the table.", prepared.clone())
        .await
        .unwrap();
    let descriptors: Vec<ObjectDescriptor> =
        ordered.iter().map(|p| p.descriptor.clone()).collect();

    let oracle = Arc::new(RecordingOracle::stacking());
    let outcome = LayoutEngine::new(oracle.clone(), LayoutSettings::default())
        .run(&descriptors, "a kitchen", "The cup is on the table.")
        .await
        .unwrap();
    assert_eq!(outcome.placed[0].name(), "Table");
    assert_eq!(oracle.context_sizes(), vec![0, 1]);

    let dropping = OrderResolver::new(Arc::new(MockProvider::new(r#"["Table"]"#)));
    let err = dropping.arrange("", prepared).await.unwrap_err();
    assert!(matches!(err, LayoutError::OrderIntegrity { .. }));
}
