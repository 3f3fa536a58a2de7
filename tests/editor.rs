use std::{sync::Arc, time::Duration};

use flowcanvas::{
    AiScoreLeadConfig, Bounds, CanvasMode, Connection, EditorConfig, FlowError, MemWorkflowApi, NodeKind, NoticeLevel, PaletteTemplate, Position, SavePhase, StepsConfig, Workflow, WorkflowApi,
    WorkflowEditor, demo_graph,
};
use serde_json::{Number, json};

fn editor(api: &Arc<MemWorkflowApi>) -> WorkflowEditor {
    WorkflowEditor::new(api.clone(), &EditorConfig::default())
}

fn stored_workflow(api: &MemWorkflowApi) -> Workflow {
    let workflow: Workflow = serde_json::from_value(json!({
        "id": 11,
        "name": "Re-engagement",
        "is_active": true,
        "status": "active",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-02T10:00:00Z",
        "trigger_config": {"event": "tag_added"},
        "steps_config": {
            "nodes": [
                {"id": "trigger-1", "type": "trigger", "position": {"x": 0.0, "y": 0.0}, "data": {"label": "Tag Added", "triggerType": "tag_added"}},
                {"id": "aiScoreLead-2", "type": "aiScoreLead", "position": {"x": 0.0, "y": 120.0}, "data": {"label": "AI Score Lead", "aiType": "score_lead", "threshold": 60}}
            ],
            "edges": [
                {"id": "e1", "source": "trigger-1", "target": "aiScoreLead-2", "type": "smoothstep"}
            ]
        }
    }))
    .unwrap();
    api.insert(workflow.clone());
    workflow
}

fn steps_of(workflow: &Workflow) -> StepsConfig {
    serde_json::from_value(workflow.steps_config.clone()).unwrap()
}

#[tokio::test]
async fn save_without_workflow_warns_and_skips_network() {
    let api = Arc::new(MemWorkflowApi::new());
    api.set_offline(true);
    let editor = editor(&api);
    editor.select(None);

    assert_eq!(editor.save().await, Err(FlowError::NoWorkflowSelected));

    let notices = editor.notices().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(editor.with_canvas(|c| c.save_phase()), SavePhase::Idle);
}

#[tokio::test]
async fn save_sends_latest_graph() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow.clone()));

    let template = PaletteTemplate::find(NodeKind::Action, "send_email").unwrap();
    let dropped = editor.edit(|c| c.drop_payload(&template.drag_payload(), Position::new(100.0, 300.0), Bounds::default())).unwrap();
    editor.edit(|c| c.connect(Connection::new("aiScoreLead-2", dropped.clone())));
    assert!(editor.has_unsaved_changes());

    let saved = editor.save().await.unwrap();

    let live = editor.with_canvas(|c| c.steps());
    assert_eq!(steps_of(&saved), live);
    assert_eq!(steps_of(&api.get(workflow.id).unwrap()), live);
    assert!(!editor.has_unsaved_changes());
    assert_eq!(editor.notices().drain()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn failed_save_keeps_canvas_and_allows_retry() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow.clone()));
    editor.edit(|c| c.remove_node("trigger-1")).unwrap();
    let edited = editor.with_canvas(|c| c.steps());

    api.set_offline(true);
    assert!(matches!(editor.save().await, Err(FlowError::Transport(_))));
    assert_eq!(editor.with_canvas(|c| c.steps()), edited);
    assert_eq!(editor.with_canvas(|c| c.save_phase()), SavePhase::Idle);
    assert_eq!(editor.notices().drain()[0].level, NoticeLevel::Error);
    assert_eq!(steps_of(&api.get(workflow.id).unwrap()), steps_of(&workflow));

    api.set_offline(false);
    editor.save().await.unwrap();
    assert_eq!(steps_of(&api.get(workflow.id).unwrap()), edited);
}

#[tokio::test]
async fn concurrent_edit_is_reported_as_conflict() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow.clone()));

    api.touch(workflow.id);
    assert_eq!(editor.save().await, Err(FlowError::Conflict {
        id: workflow.id
    }));
}

#[tokio::test]
async fn consecutive_saves_track_server_version() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow));

    editor.save().await.unwrap();
    editor.edit(|c| c.move_node("trigger-1", Position::new(40.0, 0.0))).unwrap();
    editor.save().await.unwrap();
}

#[tokio::test]
async fn second_save_while_outstanding_is_rejected() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = Arc::new(editor(&api));
    editor.select(Some(workflow));
    api.set_latency(Some(Duration::from_millis(200)));

    let first = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.save().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(editor.with_canvas(|c| c.is_saving()));
    assert_eq!(editor.save().await, Err(FlowError::SaveInProgress));
    // editing is still possible during the save
    editor.edit(|c| c.move_node("trigger-1", Position::new(1.0, 1.0))).unwrap();

    first.await.unwrap().unwrap();
    assert_eq!(editor.with_canvas(|c| c.save_phase()), SavePhase::Idle);
    assert!(editor.has_unsaved_changes());
}

#[tokio::test]
async fn abandoned_save_returns_to_idle() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow));
    editor.edit(|c| c.move_node("trigger-1", Position::new(5.0, 5.0))).unwrap();
    api.set_latency(Some(Duration::from_millis(200)));

    assert!(tokio::time::timeout(Duration::from_millis(50), editor.save()).await.is_err());
    assert_eq!(editor.with_canvas(|c| c.save_phase()), SavePhase::Idle);
    assert!(editor.has_unsaved_changes());

    api.set_latency(None);
    editor.save().await.unwrap();
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn create_workflow_then_select() {
    let api = Arc::new(MemWorkflowApi::new());
    let editor = editor(&api);
    editor.select(None);
    editor.edit(|c| c.clear()).unwrap();

    let created = editor.create_workflow("Fresh").await.unwrap();

    assert_eq!(editor.with_canvas(|c| c.workflow_id()), Some(created.id));
    assert_eq!(editor.with_canvas(|c| c.mode()), CanvasMode::Workflow);
    assert!(editor.with_canvas(|c| c.nodes().is_empty()));
    assert_eq!(editor.workflows().len(), 1);
    editor.save().await.unwrap();
}

#[tokio::test]
async fn dialog_write_back_is_persisted() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);
    editor.select(Some(workflow.clone()));

    let mut dialog = editor.open_dialog::<AiScoreLeadConfig>("aiScoreLead-2").unwrap();
    assert_eq!(dialog.draft().threshold, Number::from(60));
    dialog.draft_mut().threshold = Number::from(42);
    editor.apply_dialog(dialog).unwrap();

    editor.save().await.unwrap();
    let stored = steps_of(&api.get(workflow.id).unwrap());
    let node = stored.nodes.iter().find(|n| n.id == "aiScoreLead-2").unwrap();
    assert_eq!(node.data.get("threshold"), Some(&json!(42)));
    assert_eq!(stored.nodes[0], steps_of(&workflow).nodes[0]);
}

#[tokio::test]
async fn malformed_workflow_falls_back_to_demo() {
    let api = Arc::new(MemWorkflowApi::new());
    let mut workflow = stored_workflow(&api);
    workflow.steps_config = json!({"nodes": []});
    let editor = editor(&api);

    editor.select(Some(workflow));
    assert_eq!(editor.with_canvas(|c| c.steps()), demo_graph());
    assert!(editor.with_canvas(|c| c.shows_demo_controls()));
}

#[tokio::test]
async fn test_run_and_refresh() {
    let api = Arc::new(MemWorkflowApi::new());
    let workflow = stored_workflow(&api);
    let editor = editor(&api);

    assert_eq!(editor.run_test().await, Err(FlowError::NoWorkflowSelected));

    assert_eq!(editor.refresh_workflows().await.unwrap().len(), 1);
    editor.select(editor.workflows().into_iter().next());
    let execution = editor.run_test().await.unwrap();
    assert_eq!(execution.workflow, workflow.id);
    assert_eq!(api.list_executions().await.unwrap().len(), 1);
}
