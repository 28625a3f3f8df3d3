mod common;

use ausf_operator::{
    DirWorkload, JsonRelationStore, OperatorConfig, OperatorEngine, PlaceholderRenderer,
    RelationSnapshot, Trigger, UnitStatus,
};
use common::{add_related_app, nrf_data, udm_data, APP};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const EXPECTED_CONFIG: &str = include_str!("fixtures/ausf_scenario.conf");

type FileEngine = OperatorEngine<DirWorkload, JsonRelationStore, PlaceholderRenderer, bool>;

fn file_engine(config: OperatorConfig, state_dir: &Path) -> FileEngine {
    let relations = JsonRelationStore::open(state_dir.join("relations.json"), APP).unwrap();
    let workload = DirWorkload::new(state_dir.join("workload"));
    OperatorEngine::new(
        config,
        workload,
        relations,
        PlaceholderRenderer::builtin().unwrap(),
        true,
    )
}

fn config_from_toml() -> OperatorConfig {
    let toml = r#"
[unit]
app_name = "oai-5g-ausf"
model_name = "whatever"
leader = true

[sbi]
interface_name = "eth0"
port = 80
"#;
    OperatorConfig::from_toml_str(toml).unwrap()
}

#[tokio::test]
async fn test_end_to_end_with_file_backed_adapters() {
    // Setup temporary state directory
    let temp_dir = TempDir::new().unwrap();
    let state_dir = temp_dir.path();

    let mut snapshot = RelationSnapshot::new(APP);
    add_related_app(&mut snapshot, "fiveg-nrf", "nrf", &nrf_data());
    add_related_app(&mut snapshot, "fiveg-udm", "udm", &udm_data());
    let consumer = snapshot.add_relation("fiveg-ausf", Some("amf"));
    fs::write(
        state_dir.join("relations.json"),
        serde_json::to_vec_pretty(&snapshot).unwrap(),
    )
    .unwrap();

    let config = config_from_toml();

    // Workload root does not exist yet: container not reachable
    let mut engine = file_engine(config.clone(), state_dir);
    let report = engine.deliver(Trigger::ConfigChanged).await.unwrap();
    assert_eq!(report.deferred.len(), 1);
    assert_eq!(
        engine.status(),
        &UnitStatus::Waiting("Waiting for workload management layer to be reachable".to_string())
    );
    let state = engine.state().clone();

    // Container comes up; a fresh process resumes from the saved state
    fs::create_dir_all(state_dir.join("workload")).unwrap();
    let mut engine = file_engine(config.clone(), state_dir).with_state(state);
    let report = engine.redeliver().await.unwrap();
    assert_eq!(report.completed, vec![Trigger::ConfigChanged]);
    assert_eq!(engine.status(), &UnitStatus::Active);

    // Verify rendered file and service plan
    let rendered =
        fs::read_to_string(state_dir.join("workload/openair-ausf/etc/ausf.conf")).unwrap();
    assert_eq!(rendered, EXPECTED_CONFIG);

    let plan = engine.workload().plan().unwrap();
    assert_eq!(plan.summary, "ausf layer");
    assert_eq!(plan.services["ausf"].startup, "enabled");
    assert_eq!(engine.workload().services().unwrap()["ausf"].restarts, 1);

    // Service is running now, so a consumer join publishes straight away
    let report = engine
        .deliver(Trigger::RelationJoined {
            relation: "fiveg-ausf".to_string(),
            id: consumer,
        })
        .await
        .unwrap();
    assert_eq!(report.completed.len(), 1);

    let reopened = JsonRelationStore::open(state_dir.join("relations.json"), APP).unwrap();
    let saved = reopened.snapshot().unwrap();
    let published = saved.app_data(consumer, APP).unwrap();
    assert_eq!(published["ausf_ipv4_address"], "127.0.0.1");
    assert_eq!(published["ausf_fqdn"], "oai-5g-ausf.whatever.svc.cluster.local");
}

#[tokio::test]
async fn test_template_override_directory() {
    let temp_dir = TempDir::new().unwrap();
    let state_dir = temp_dir.path();
    let templates = state_dir.join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("ausf.conf.tmpl"),
        "nrf={{ nrf_ipv4_address }}:{{ nrf_port }} udm={{ udm_fqdn }}\n",
    )
    .unwrap();
    fs::create_dir_all(state_dir.join("workload")).unwrap();

    let mut snapshot = RelationSnapshot::new(APP);
    add_related_app(&mut snapshot, "fiveg-nrf", "nrf", &nrf_data());
    add_related_app(&mut snapshot, "fiveg-udm", "udm", &udm_data());

    let mut engine = OperatorEngine::new(
        config_from_toml(),
        DirWorkload::new(state_dir.join("workload")),
        JsonRelationStore::in_memory(snapshot),
        PlaceholderRenderer::with_overrides(&templates).unwrap(),
        true,
    );
    engine.deliver(Trigger::ConfigChanged).await.unwrap();

    let rendered =
        fs::read_to_string(state_dir.join("workload/openair-ausf/etc/ausf.conf")).unwrap();
    assert_eq!(rendered, "nrf=1.2.3.4:81 udm=b.example.com");
}
