use crate::{
    common::Vars,
    model::{Edge, FixedHandle, Node, NodeKind, Position, StepsConfig},
};

/// Sample graph shown when no workflow graph is loaded.
///
/// trigger -> AI score -> condition -> {true: AI generate content, false: send email}
pub fn demo_graph() -> StepsConfig {
    let nodes = vec![
        Node::new(
            "1",
            NodeKind::Trigger,
            Position::new(250.0, 0.0),
            Vars::new().with("label", "Form Submission").with("triggerType", "form_submission"),
        ),
        Node::new(
            "2",
            NodeKind::AiScoreLead,
            Position::new(250.0, 120.0),
            Vars::new()
                .with("label", "AI Score Lead")
                .with("aiType", "score_lead")
                .with("scoringModel", "engagement")
                .with("contextFields", serde_json::json!(["email_opens", "page_visits"]))
                .with("threshold", 70)
                .with("outputField", "lead_score"),
        ),
        Node::new(
            "3",
            NodeKind::Condition,
            Position::new(250.0, 240.0),
            Vars::new().with("label", "Lead Score > 70").with("conditionType", "lead_score"),
        ),
        Node::new(
            "4",
            NodeKind::AiGenerateContent,
            Position::new(100.0, 360.0),
            Vars::new()
                .with("label", "AI Generate Content")
                .with("aiType", "generate_content")
                .with("contentType", "email")
                .with("prompt", "Write a personalised follow-up email for a highly engaged lead.")
                .with("outputField", "generated_content"),
        ),
        Node::new(
            "5",
            NodeKind::Action,
            Position::new(400.0, 360.0),
            Vars::new().with("label", "Send Email").with("actionType", "send_email"),
        ),
    ];

    let edges = vec![
        Edge::new("e1-2", "1", "2"),
        Edge::new("e2-3", "2", "3"),
        Edge::new("e3-4", "3", "4").with_source_handle(FixedHandle::True),
        Edge::new("e3-5", "3", "5").with_source_handle(FixedHandle::False),
    ];

    StepsConfig::new(nodes, edges)
}
