use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::backends::stub::RecordingBackend;
use crate::config::{BackendConfig, BackendKind, BackendMode, HostPlatform};
use crate::dispatcher::{Connection, ConnectionState};
use crate::errors::{ConfigError, DispatchError, DispatchResult};
use crate::protocol::{
    ErrorKind, ExecutionResult, HostCommand, ModelSummary, NodeId, ObjectSummary, ParamDecl,
    Parameters, RunOptions, Status,
};
use crate::traits::ModelReader;

fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        _ => Parameters::new(),
    }
}

fn is_generated_id(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .map(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// Run every public operation once and collect the envelopes.
async fn all_operations(connection: &Connection) -> Vec<(&'static str, ExecutionResult)> {
    let a = NodeId::from("comp_00000000");
    let b = NodeId::from("comp_11111111");
    vec![
        ("execute_code", connection.execute_code("let result = 1;", Parameters::new()).await),
        ("read_file", connection.read_file(Path::new("model.3dm")).await),
        ("read_object", connection.read_object(Path::new("model.3dm"), 0).await),
        (
            "create_script_node",
            connection
                .create_script_node("Offset", vec![], vec![], "let y = 1;")
                .await,
        ),
        ("add_node", connection.add_node("Box", "Surface", Parameters::new()).await),
        ("connect_nodes", connection.connect_nodes(&a, "output", &b, "X Size").await),
        ("edit_script_node", connection.edit_script_node(&b, "let y = 2;").await),
        ("run_definition", connection.run_definition(RunOptions::current()).await),
        ("add_node", connection.add_node(" ", "Surface", Parameters::new()).await),
        ("create_script_node", connection.create_script_node("", vec![], vec![], "").await),
        ("connect_nodes", connection.connect_nodes(&a, "", &b, " ").await),
    ]
}

/// Model reader returning a fixed object table.
struct TableReader {
    objects: Vec<ObjectSummary>,
}

impl ModelReader for TableReader {
    fn read_model(&self, path: &Path) -> DispatchResult<ModelSummary> {
        Ok(ModelSummary {
            file_path: path.to_path_buf(),
            size_bytes: 1024,
            format_version: Some(7),
            object_count: Some(self.objects.len()),
            layer_count: Some(1),
            objects: self.objects.clone(),
        })
    }
}

/// Every operation before initialize() and after close() is NotConnected.
#[tokio::test]
async fn test_operations_outside_lifecycle_are_not_connected() {
    let mut connection = Connection::new(BackendConfig::default());

    for (operation, envelope) in all_operations(&connection).await {
        assert_eq!(envelope.status, Status::Error, "{} before initialize", operation);
        assert_eq!(envelope.kind, Some(ErrorKind::NotConnected), "{}", operation);
    }

    connection.initialize().unwrap();
    connection.close().await;
    connection.close().await;

    for (operation, envelope) in all_operations(&connection).await {
        assert_eq!(envelope.kind, Some(ErrorKind::NotConnected), "{} after close", operation);
        assert_eq!(envelope.error_message(), Some("Not connected to the geometry backend"));
    }
}

/// The portable backend executes and reads but refuses graph operations.
#[tokio::test]
async fn test_portable_backend_gates_graph_operations() {
    let mut connection = Connection::new(BackendConfig::default()).with_platform(HostPlatform::Linux);
    assert_eq!(connection.initialize().unwrap(), BackendKind::EmbeddedPortable);

    for (operation, envelope) in all_operations(&connection).await {
        match operation {
            "execute_code" => assert!(envelope.is_success()),
            "read_file" | "read_object" => assert_eq!(envelope.kind, Some(ErrorKind::NotFound)),
            _ => {
                assert_eq!(envelope.kind, Some(ErrorKind::UnsupportedOperation), "{}", operation);
                let message = envelope.error_message().unwrap();
                assert!(message.contains(operation));
                assert!(message.contains("socket") && message.contains("http"));
            }
        }
    }
}

/// Script faults on the embedded backend carry a trace.
#[tokio::test]
async fn test_embedded_fault_envelope() {
    let mut connection = Connection::new(BackendConfig::default());
    connection.initialize().unwrap();

    let ok = connection
        .execute_code("let result = #{ area: radius * radius };", params(json!({"radius": 3})))
        .await;
    assert_eq!(ok.data(), &json!({"area": 9}));

    let failed = connection.execute_code("let result = radius * 2;", Parameters::new()).await;
    assert_eq!(failed.status, Status::Error);
    assert_eq!(failed.kind, Some(ErrorKind::ExecutionFault));
    assert!(!failed.error_message().unwrap_or_default().is_empty());
    assert!(!failed.trace.unwrap_or_default().is_empty());
}

/// add_node followed by connect_nodes with the returned ids never yields NotFound.
#[tokio::test]
async fn test_native_add_then_connect_round_trip() {
    let install_dir = tempfile::tempdir().unwrap();
    let config = BackendConfig {
        use_native_binding: true,
        install_path: Some(install_dir.path().to_path_buf()),
        ..BackendConfig::default()
    };
    let mut connection = Connection::new(config).with_platform(HostPlatform::Windows);
    assert_eq!(connection.initialize().unwrap(), BackendKind::EmbeddedNative);

    let slider = connection
        .add_node("Number Slider", "Params", params(json!({"NickName": "Width", "Value": 10})))
        .await;
    let script = connection
        .create_script_node(
            "Double",
            vec![ParamDecl::new("x", "float", "")],
            vec![ParamDecl::new("y", "float", "")],
            "y = x * 2",
        )
        .await;

    let slider_id = slider.component_id().unwrap().to_string();
    let script_id = script.component_id().unwrap().to_string();
    assert!(is_generated_id(&slider_id, "comp"), "{}", slider_id);
    assert!(is_generated_id(&script_id, "py"), "{}", script_id);

    let wired = connection
        .connect_nodes(&NodeId::from(slider_id), "output", &NodeId::from(script_id), "x")
        .await;
    assert!(wired.is_success(), "{:?}", wired);

    let run = connection.run_definition(RunOptions::current()).await;
    let summary = run.data()["output_summary"].as_array().unwrap().clone();
    assert!(summary.contains(&json!({"component": "Width", "param": "output", "data_count": 1})));

    let count = connection.execute_code("let result = component_count();", Parameters::new()).await;
    assert_eq!(count.data(), &json!(2));
}

/// Unknown ids are reported as NotFound.
#[tokio::test]
async fn test_native_connect_unknown_id() {
    let install_dir = tempfile::tempdir().unwrap();
    let config = BackendConfig {
        use_native_binding: true,
        install_path: Some(install_dir.path().to_path_buf()),
        ..BackendConfig::default()
    };
    let mut connection = Connection::new(config).with_platform(HostPlatform::Windows);
    connection.initialize().unwrap();

    let envelope = connection
        .connect_nodes(&NodeId::from("comp_deadbeef"), "output", &NodeId::from("py_deadbeef"), "x")
        .await;
    assert_eq!(envelope.kind, Some(ErrorKind::NotFound));
}

/// A failed initialize leaves the connection uninitialized and retryable.
#[tokio::test]
async fn test_initialize_failure_is_configuration_error() {
    let mut connection = Connection::new(BackendConfig {
        use_compute_api: true,
        ..BackendConfig::default()
    });

    let error = connection.initialize().unwrap_err();
    assert_eq!(
        error,
        DispatchError::Configuration(ConfigError::MissingComputeCredentials)
    );
    assert_eq!(connection.state(), ConnectionState::Uninitialized);

    let native = Connection::new(BackendConfig {
        use_native_binding: true,
        install_path: Some(PathBuf::from("/nonexistent/install")),
        ..BackendConfig::default()
    })
    .with_platform(HostPlatform::Windows)
    .initialize()
    .map(|_| ());
    assert!(matches!(
        native,
        Err(DispatchError::Configuration(ConfigError::InvalidInstallPath(_)))
    ));
}

/// read_object resolves indices against the reader's object table.
#[tokio::test]
async fn test_read_object_bounds() {
    let reader = TableReader {
        objects: vec![
            ObjectSummary {
                index: 0,
                name: "base".into(),
                object_type: "Brep".into(),
                layer: Some("Default".into()),
            },
            ObjectSummary {
                index: 1,
                name: "axis".into(),
                object_type: "Curve".into(),
                layer: None,
            },
        ],
    };
    let mut connection = Connection::new(BackendConfig::default()).with_model_reader(Arc::new(reader));
    connection.initialize().unwrap();

    let file = connection.read_file(Path::new("tower.3dm")).await;
    assert_eq!(file.data()["object_count"], 2);

    let object = connection.read_object(Path::new("tower.3dm"), 1).await;
    assert_eq!(object.data()["object_type"], "Curve");

    let missing = connection.read_object(Path::new("tower.3dm"), 5).await;
    assert_eq!(missing.kind, Some(ErrorKind::NotFound));
    assert_eq!(
        missing.error_message(),
        Some("Not found: Invalid object index 5. File has 2 objects.")
    );
}

/// The header-only reader cannot enumerate objects, so read_object says so.
#[tokio::test]
async fn test_read_object_without_object_table() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"3D Geometry File Format        7").unwrap();
    std::io::Write::write_all(&mut file, &[0u8; 64]).unwrap();

    let mut connection = Connection::new(BackendConfig::default());
    connection.initialize().unwrap();

    let summary = connection.read_file(file.path()).await;
    assert!(summary.is_success(), "{:?}", summary);
    assert_eq!(summary.data()["format_version"], 7);

    let object = connection.read_object(file.path(), 0).await;
    assert_eq!(object.kind, Some(ErrorKind::UnsupportedOperation));
    let message = object.error_message().unwrap();
    assert!(message.contains("read_object"), "{}", message);
    assert!(!message.contains("0 objects"), "{}", message);
}

/// Script edits replace the code of script nodes only.
#[tokio::test]
async fn test_native_edit_script_node() {
    let install_dir = tempfile::tempdir().unwrap();
    let config = BackendConfig {
        use_native_binding: true,
        install_path: Some(install_dir.path().to_path_buf()),
        ..BackendConfig::default()
    };
    let mut connection = Connection::new(config).with_platform(HostPlatform::Windows);
    connection.initialize().unwrap();

    let script = connection
        .create_script_node("Double", vec![], vec![ParamDecl::new("y", "float", "")], "y = 2")
        .await;
    let plugin = connection.add_node("Box", "Surface", Parameters::new()).await;
    let script_id = NodeId::from(script.component_id().unwrap());
    let plugin_id = NodeId::from(plugin.component_id().unwrap());

    let edited = connection.edit_script_node(&script_id, "y = 4").await;
    assert!(edited.is_success(), "{:?}", edited);
    assert_eq!(edited.data(), &json!({"component_name": "Double", "code_length": 5}));

    for id in [plugin_id, NodeId::from("py_deadbeef")] {
        let envelope = connection.edit_script_node(&id, "y = 8").await;
        assert_eq!(envelope.kind, Some(ErrorKind::NotFound), "{}", id);
    }
}

/// Graph operations send structured commands carrying the generated ids.
#[tokio::test]
async fn test_graph_commands_reach_backend_in_order() {
    let backend = Arc::new(RecordingBackend::new(BackendKind::Http));
    let mut connection = Connection::new(BackendConfig::default());
    connection.initialize_with(backend.clone()).unwrap();

    let node = connection.add_node("Box", "Surface", Parameters::new()).await;
    let id = NodeId::from(node.component_id().unwrap());
    connection.connect_nodes(&id, "Box", &id, "Base").await;
    connection.edit_script_node(&id, "y = 3").await;
    connection.run_definition(RunOptions::save_to("/tmp/out.gh")).await;

    let commands = backend.commands();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[0].created_id(), Some(&id));
    assert!(matches!(&commands[1], HostCommand::Connect { source_id, .. } if source_id == &id));
    assert!(matches!(&commands[2], HostCommand::UpdateScriptCode { code, .. } if code == "y = 3"));
    assert!(matches!(&commands[3], HostCommand::RunDefinition(o) if o.save_output));
    assert_eq!(node.data()["response"]["operation"], "add_node");

    connection.close().await;
    assert_eq!(backend.close_count(), 1);
}

/// The socket backend is selected by mode and talks to the listener.
#[tokio::test]
async fn test_socket_connection_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = vec![0u8; 4096];
        let read = socket.read(&mut buffer).await.unwrap();
        let message: Value = serde_json::from_slice(&buffer[..read]).unwrap();
        let code = std::fs::read_to_string(message["filename"].as_str().unwrap()).unwrap();
        let reply = json!({"status": "success", "data": {"ran": code}});
        socket.write_all(reply.to_string().as_bytes()).await.unwrap();
    });

    let mut connection = Connection::new(BackendConfig {
        mode: Some(BackendMode::Socket),
        port,
        ..BackendConfig::default()
    });
    assert_eq!(connection.initialize().unwrap(), BackendKind::Socket);

    let envelope = connection
        .execute_code("import rhinoscriptsyntax as rs", params(json!({"ignored": true})))
        .await;
    assert_eq!(envelope.data(), &json!({"ran": "import rhinoscriptsyntax as rs"}));

    let read = connection.read_file(Path::new("model.3dm")).await;
    assert_eq!(read.kind, Some(ErrorKind::UnsupportedOperation));
}
