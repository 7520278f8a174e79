use std::sync::Arc;

use serde_json::{json, Value};

use crate::backends::stub::RecordingBackend;
use crate::config::{BackendConfig, BackendKind, HostPlatform};
use crate::dispatcher::Connection;
use crate::graph::{
    build_workflow, create_parametric_definition, edit_script_component, invoke_plugin, NodeSpec,
    WorkflowBuilder, WorkflowExecutor,
};
use crate::protocol::{ErrorKind, HostCommand, NodeId, Parameters, Status};

fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => Parameters::new(),
    }
}

fn stub_connection(backend: Arc<RecordingBackend>) -> Connection {
    let mut connection = Connection::new(BackendConfig::default());
    connection.initialize_with(backend).unwrap();
    connection
}

fn native_connection(install_dir: &tempfile::TempDir) -> Connection {
    let config = BackendConfig {
        use_native_binding: true,
        install_path: Some(install_dir.path().to_path_buf()),
        ..BackendConfig::default()
    };
    let mut connection = Connection::new(config).with_platform(HostPlatform::Windows);
    connection.initialize().unwrap();
    connection
}

fn connect_count(commands: &[HostCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, HostCommand::Connect { .. }))
        .count()
}

/// The box template uses caller values and only references defined nodes.
#[test]
fn test_box_workflow_from_description() {
    let workflow = build_workflow(
        "Create a box 10x20x30",
        &params(json!({"Width": 10, "Height": 20, "Depth": 30})),
    );

    let names: Vec<&str> = workflow.parameters.names().collect();
    assert_eq!(names, vec!["Width", "Height", "Depth"]);
    assert_eq!(workflow.parameters.get("Depth").unwrap().value, Some(json!(30)));
    assert!(workflow.components.contains("Box"));
    assert_eq!(workflow.connections.len(), 4);

    for connection in &workflow.connections {
        for endpoint in [connection.source().unwrap(), connection.target().unwrap()] {
            assert!(
                workflow.parameters.contains(endpoint.node) || workflow.components.contains(endpoint.node),
                "{} is not defined",
                endpoint.node
            );
        }
    }
}

/// Nodes are created before any connection, in declaration order.
#[tokio::test]
async fn test_materialize_orders_nodes_before_connections() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Socket));
    let connection = stub_connection(backend.clone());
    let workflow = build_workflow("loft", &Parameters::new());

    let report = WorkflowExecutor::materialize(&workflow, &connection).await.unwrap();

    let commands = backend.commands();
    assert_eq!(commands.len(), 10 + 8);
    let first_connect = commands
        .iter()
        .position(|c| matches!(c, HostCommand::Connect { .. }))
        .unwrap();
    assert_eq!(first_connect, 10);
    assert!(matches!(
        &commands[9],
        HostCommand::CreateScriptComponent { description, .. } if description == "HeightVector"
    ));
    assert!(matches!(
        &commands[0],
        HostCommand::AddComponent { name, category, parameters, .. }
            if name == "Number Slider" && category == "Params" && parameters["NickName"] == "Points"
    ));

    assert_eq!(report.node_ids.len(), 10);
    assert_eq!(report.connections_made, 8);
    assert!(report.warnings.is_empty());
    assert!(report.node_ids["HeightVector"].as_str().starts_with("py_"));
    assert!(report.node_ids["Loft"].as_str().starts_with("comp_"));
}

/// A connection naming an unknown node is skipped; everything else is made.
#[tokio::test]
async fn test_materialize_skips_unresolved_connection() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
    let connection = stub_connection(backend.clone());
    let workflow = WorkflowBuilder::new()
        .parameter("Width", NodeSpec::slider(json!(10)))
        .parameter("Height", NodeSpec::slider(json!(20)))
        .component("Box", NodeSpec::component("Box", "Surface"))
        .connect("Width.output", "Box.X Size")
        .connect("Ghost.output", "Box.Y Size")
        .connect("Height.output", "Box.Z Size")
        .finish();

    let report = WorkflowExecutor::materialize(&workflow, &connection).await.unwrap();

    assert_eq!(report.node_ids.len(), 3);
    assert_eq!(report.connections_made, 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("Ghost"));

    let targets: Vec<String> = backend
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            HostCommand::Connect { target_param, .. } => Some(target_param),
            _ => None,
        })
        .collect();
    assert_eq!(targets, vec!["X Size", "Z Size"]);
}

/// The first backend error stops materialization and is returned verbatim.
#[tokio::test]
async fn test_materialize_fails_fast() {
    let backend = Arc::new(RecordingBackend::failing_after(BackendKind::Http, 2));
    let connection = stub_connection(backend.clone());
    let workflow = build_workflow("box", &Parameters::new());

    let envelope = WorkflowExecutor::materialize(&workflow, &connection)
        .await
        .unwrap_err();

    assert_eq!(envelope.status, Status::Error);
    assert_eq!(envelope.kind, Some(ErrorKind::Transport));
    assert_eq!(envelope.error_message(), Some("Transport error: stub refused add_node"));
    assert_eq!(backend.commands().len(), 2);
}

/// The portable backend cannot materialize; the gating envelope is returned.
#[tokio::test]
async fn test_parametric_definition_on_portable_backend() {
    let mut connection = Connection::new(BackendConfig::default()).with_platform(HostPlatform::Linux);
    connection.initialize().unwrap();

    let envelope = create_parametric_definition(&connection, "box", &Parameters::new(), None).await;

    assert_eq!(envelope.kind, Some(ErrorKind::UnsupportedOperation));
    assert!(envelope.error_message().unwrap().contains("add_node"));
}

/// End to end on the native document: build, wire, run and save.
#[tokio::test]
async fn test_parametric_definition_on_native_document() {
    let install_dir = tempfile::tempdir().unwrap();
    let connection = native_connection(&install_dir);
    let output = install_dir.path().join("cylinder.gh.json");

    let envelope = create_parametric_definition(
        &connection,
        "A tall cylinder",
        &params(json!({"Height": 50})),
        Some(&output),
    )
    .await;

    assert!(envelope.is_success(), "{:?}", envelope);
    assert!(envelope.warnings.is_empty());
    let data = envelope.data();
    assert_eq!(data["components_created"], 5);
    assert_eq!(data["parameter_count"], 2);
    assert_eq!(data["saved_to"], json!(output.display().to_string()));
    assert!(data["node_ids"]["Cylinder"].as_str().unwrap().starts_with("comp_"));

    let summary = data["run"]["output_summary"].as_array().unwrap();
    assert!(summary.contains(&json!({"component": "Radius", "param": "output", "data_count": 1})));
    assert!(output.exists());

    let wires = connection
        .execute_code("let result = wire_count();", Parameters::new())
        .await;
    assert_eq!(wires.data(), &json!(4));
}

/// A requested output file triggers a second, saving run.
#[tokio::test]
async fn test_parametric_definition_runs_and_saves() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Socket));
    let connection = stub_connection(backend.clone());
    let output = std::path::Path::new("/tmp/box.gh");

    let envelope = create_parametric_definition(&connection, "cube", &Parameters::new(), Some(output)).await;

    assert!(envelope.is_success());
    let commands = backend.commands();
    assert_eq!(connect_count(&commands), 4);
    let runs: Vec<bool> = commands
        .iter()
        .filter_map(|c| match c {
            HostCommand::RunDefinition(options) => Some(options.save_output),
            _ => None,
        })
        .collect();
    assert_eq!(runs, vec![false, true]);
    assert_eq!(envelope.data()["saved_to"], "/tmp/box.gh");
}

/// Plugin inputs get typed parameter nodes wired to the plugin component.
#[tokio::test]
async fn test_invoke_plugin() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
    let connection = stub_connection(backend.clone());

    let envelope = invoke_plugin(
        &connection,
        "Ladybug",
        "Sunpath",
        &params(json!({"latitude": 47.6, "label": "Seattle", "daylight": true})),
        Some(std::path::Path::new("/tmp/site.gh")),
    )
    .await;

    assert!(envelope.is_success(), "{:?}", envelope);
    assert_eq!(envelope.data()["inputs"].as_object().unwrap().len(), 3);

    let commands = backend.commands();
    assert!(matches!(&commands[0], HostCommand::RunDefinition(o) if o.file_path.is_some()));
    assert!(matches!(
        &commands[1],
        HostCommand::AddComponent { name, category, .. } if name == "Sunpath" && category == "Ladybug"
    ));
    let kinds: Vec<String> = commands
        .iter()
        .skip(2)
        .filter_map(|c| match c {
            HostCommand::AddComponent { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(kinds.len(), 3);
    for kind in ["Number", "Text", "Boolean"] {
        assert!(kinds.iter().any(|k| k == kind), "missing {}", kind);
    }
    assert_eq!(connect_count(&commands), 3);
    assert!(matches!(commands.last(), Some(HostCommand::RunDefinition(o)) if o.file_path.is_none()));
}

/// Unsupported input types are rejected before their node is created.
#[tokio::test]
async fn test_invoke_plugin_rejects_structured_inputs() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
    let connection = stub_connection(backend.clone());

    let envelope = invoke_plugin(
        &connection,
        "Kangaroo",
        "Solver",
        &params(json!({"points": [1, 2, 3]})),
        None,
    )
    .await;

    assert_eq!(envelope.kind, Some(ErrorKind::InvalidInput));
    assert!(envelope.error_message().unwrap().contains("points"));
    assert_eq!(backend.commands().len(), 1);
}

/// Script edits open the definition first and stop when it cannot be opened.
#[tokio::test]
async fn test_edit_script_component_opens_file_first() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
    let connection = stub_connection(backend.clone());
    let id = NodeId::from("py_0000abcd");

    let envelope = edit_script_component(
        &connection,
        Some(std::path::Path::new("/tmp/site.gh")),
        &id,
        "y = x + 2",
    )
    .await;

    assert!(envelope.is_success(), "{:?}", envelope);
    let commands = backend.commands();
    assert_eq!(commands.len(), 2);
    assert!(matches!(&commands[0], HostCommand::RunDefinition(o) if o.file_path.is_some()));
    assert!(matches!(
        &commands[1],
        HostCommand::UpdateScriptCode { id: edited, code } if edited == &id && code == "y = x + 2"
    ));

    let refusing = Arc::new(RecordingBackend::failing_after(BackendKind::Http, 0));
    let connection = stub_connection(refusing.clone());
    let envelope = edit_script_component(
        &connection,
        Some(std::path::Path::new("/tmp/missing.gh")),
        &id,
        "y = 0",
    )
    .await;

    assert_eq!(envelope.kind, Some(ErrorKind::Transport));
    assert!(refusing.commands().is_empty());
}
