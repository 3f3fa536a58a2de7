use std::{sync::Arc, time::Duration};

use flowcanvas::{AiScoreLeadConfig, Bounds, Connection, EditorConfig, ExecutionMonitor, FixedHandle, MemWorkflowApi, NodeKind, PaletteTemplate, Position, WorkflowEditor};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

    let api = Arc::new(MemWorkflowApi::new());
    let config = EditorConfig::default();
    let editor = WorkflowEditor::new(api.clone(), &config);

    // start from the demo graph and save it as a new workflow
    editor.select(None);
    let workflow = editor.create_workflow("Lead nurture").await.unwrap();

    let sms = PaletteTemplate::find(NodeKind::Action, "send_sms").unwrap();
    let node_id = editor.edit(|c| c.drop_payload(&sms.drag_payload(), Position::new(520.0, 480.0), Bounds::default())).unwrap();
    editor.edit(|c| c.connect(Connection::new("3", node_id).from_handle(FixedHandle::False)));

    let mut dialog = editor.open_dialog::<AiScoreLeadConfig>("2").unwrap();
    dialog.draft_mut().threshold = serde_json::Number::from(80);
    editor.apply_dialog(dialog).unwrap();

    editor.save().await.unwrap();
    println!("{}", editor.with_canvas(|c| c.outline()));

    let monitor = ExecutionMonitor::start_with_ms(api.clone(), config.execution_poll_interval_ms.min(200));
    editor.run_test().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("Executions: {:#?}", monitor.executions_for(workflow.id));

    for notice in editor.notices().drain() {
        println!("[{}] {}", notice.level.as_ref(), notice.message);
    }
}
