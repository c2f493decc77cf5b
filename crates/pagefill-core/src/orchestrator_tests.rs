use super::*;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use pagefill_protocols::{DomTree, FieldHandle, GenerationResult, NodeSpec};

struct FakePage {
    document: DomTree,
    values: Mutex<HashMap<usize, String>>,
    failing_writes: HashSet<usize>,
    unreadable: bool,
    reads: Mutex<usize>,
}

impl FakePage {
    fn new(document: DomTree) -> Self {
        Self {
            document,
            values: Mutex::new(HashMap::new()),
            failing_writes: HashSet::new(),
            unreadable: false,
            reads: Mutex::new(0),
        }
    }

    fn value(&self, index: usize) -> Option<String> {
        self.values.lock().get(&index).cloned()
    }
}

#[async_trait]
impl Page for FakePage {
    async fn document(&self) -> Result<DomTree, PageError> {
        *self.reads.lock() += 1;
        Ok(self.document.clone())
    }

    async fn read_value(&self, field: &FieldHandle) -> Result<String, PageError> {
        if self.unreadable {
            return Err(PageError::Transport("detached".to_string()));
        }
        Ok(self.value(field.index()).unwrap_or_default())
    }

    async fn fill(&self, field: &FieldHandle, value: &str) -> Result<(), PageError> {
        if self.failing_writes.contains(&field.index()) {
            return Err(PageError::NodeNotFound(format!("field {}", field.index())));
        }
        self.values.lock().insert(field.index(), value.to_string());
        Ok(())
    }
}

/// Replies with a numbered answer, failing on chosen call indices.
struct ScriptedGenerator {
    failing_calls: HashSet<usize>,
    reply: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedGenerator {
    fn new() -> Self {
        Self {
            failing_calls: HashSet::new(),
            reply: None,
            calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing_calls: calls.into_iter().collect(),
            ..Self::new()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, credential: &str) -> GenerationResult {
        let call = {
            let mut calls = self.calls.lock();
            calls.push((prompt.to_string(), credential.to_string()));
            calls.len() - 1
        };
        if let Some((after, token)) = &self.cancel_after {
            if call + 1 == *after {
                token.cancel();
            }
        }
        if self.failing_calls.contains(&call) {
            return Err(GenerationError::Api {
                model: "gemini-test".to_string(),
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("answer {}", call)))
    }
}

fn page_with_inputs(n: usize) -> DomTree {
    let inputs = (0..n).map(|i| {
        NodeSpec::element("div")
            .child(NodeSpec::element("label").with_text(format!("Question {}", i)))
            .child(NodeSpec::element("input").attr("name", format!("q{}", i)))
    });
    DomTree::from_specs([NodeSpec::element("html").children([
        NodeSpec::element("head").child(NodeSpec::element("title").with_text("Survey")),
        NodeSpec::element("body").children(inputs),
    ])])
}

fn drain(rx: &mut broadcast::Receiver<AutofillEvent>) -> Vec<AutofillEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn orchestrator(
    page: FakePage,
    generator: ScriptedGenerator,
) -> (AutofillOrchestrator, Arc<FakePage>, Arc<ScriptedGenerator>) {
    let page = Arc::new(page);
    let generator = Arc::new(generator);
    let orchestrator = AutofillOrchestrator::new(page.clone(), generator.clone());
    (orchestrator, page, generator)
}

#[tokio::test]
async fn test_no_fields() {
    let (mut orch, _page, generator) =
        orchestrator(FakePage::new(page_with_inputs(0)), ScriptedGenerator::new());
    let mut rx = orch.subscribe();

    let summary = orch.run("KEY", &CancellationToken::new()).await.unwrap();

    assert_eq!(summary, PassSummary { filled: 0, errors: 0, total: 0 });
    assert_eq!(drain(&mut rx), vec![AutofillEvent::NoFields]);
    assert_eq!(generator.call_count(), 0);
    assert_eq!(orch.state(), PassState::Done);
}

#[tokio::test]
async fn test_missing_credential_aborts_before_any_field() {
    let (mut orch, page, generator) =
        orchestrator(FakePage::new(page_with_inputs(3)), ScriptedGenerator::new());
    let mut rx = orch.subscribe();

    let err = orch.run("   ", &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, AutofillError::MissingCredential));
    assert_eq!(generator.call_count(), 0);
    assert_eq!(*page.reads.lock(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_contact_page_single_field() {
    let document = DomTree::from_specs([NodeSpec::element("html").children([
        NodeSpec::element("head").child(NodeSpec::element("title").with_text("Contact Us")),
        NodeSpec::element("body").child(NodeSpec::element("form").child(
            NodeSpec::element("input")
                .attr("name", "email")
                .attr("placeholder", "you@example.com"),
        )),
    ])]);
    let generator = ScriptedGenerator {
        reply: Some("  hello@example.com \n".to_string()),
        ..ScriptedGenerator::new()
    };
    let (mut orch, page, generator) = orchestrator(FakePage::new(document), generator);
    let mut rx = orch.subscribe();

    let summary = orch.run("KEY123", &CancellationToken::new()).await.unwrap();

    assert_eq!(summary, PassSummary { filled: 1, errors: 0, total: 1 });
    assert_eq!(page.value(0).as_deref(), Some("hello@example.com"));

    let calls = generator.calls.lock();
    assert_eq!(calls.len(), 1);
    let (prompt, credential) = &calls[0];
    assert_eq!(credential, "KEY123");
    assert!(prompt.contains("Page: \"Contact Us\""));
    assert!(prompt.contains("- Name: \"email\""));
    assert!(prompt.contains("- Placeholder: \"you@example.com\""));
    assert!(!prompt.contains("Current value:"));

    assert_eq!(
        drain(&mut rx),
        vec![
            AutofillEvent::Started { total: 1 },
            AutofillEvent::Completed { filled: 1, errors: 0, total: 1 },
        ]
    );
}

#[tokio::test]
async fn test_failures_counted_and_pass_continues() {
    let (mut orch, page, generator) = orchestrator(
        FakePage::new(page_with_inputs(7)),
        ScriptedGenerator::failing_on([1, 4]),
    );
    let mut rx = orch.subscribe();

    let summary = orch.run("KEY", &CancellationToken::new()).await.unwrap();

    assert_eq!(summary, PassSummary { filled: 5, errors: 2, total: 7 });
    assert_eq!(generator.call_count(), 7);
    assert!(page.value(1).is_none());
    assert_eq!(page.value(6).as_deref(), Some("answer 6"));

    let events = drain(&mut rx);
    assert_eq!(events.first(), Some(&AutofillEvent::Started { total: 7 }));
    assert_eq!(
        events.last(),
        Some(&AutofillEvent::Completed { filled: 5, errors: 2, total: 7 })
    );
    let progress: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, AutofillEvent::Progress { .. }))
        .collect();
    assert_eq!(
        progress,
        vec![
            &AutofillEvent::Progress { filled: 1, total: 7 },
            &AutofillEvent::Progress { filled: 3, total: 7 },
            &AutofillEvent::Progress { filled: 5, total: 7 },
        ]
    );
    let failed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            AutofillEvent::FieldFailed { index, field, .. } => Some((*index, field.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![(1, "q1"), (4, "q4")]);
}

#[tokio::test]
async fn test_no_progress_on_small_pages() {
    let (mut orch, _page, _generator) =
        orchestrator(FakePage::new(page_with_inputs(5)), ScriptedGenerator::new());
    let mut rx = orch.subscribe();

    orch.run("KEY", &CancellationToken::new()).await.unwrap();

    assert!(!drain(&mut rx)
        .iter()
        .any(|event| matches!(event, AutofillEvent::Progress { .. })));
}

#[tokio::test]
async fn test_write_failure_counts_as_error() {
    let mut page = FakePage::new(page_with_inputs(2));
    page.failing_writes.insert(0);
    let (mut orch, page, _generator) = orchestrator(page, ScriptedGenerator::new());
    let mut rx = orch.subscribe();

    let summary = orch.run("KEY", &CancellationToken::new()).await.unwrap();

    assert_eq!(summary, PassSummary { filled: 1, errors: 1, total: 2 });
    assert_eq!(page.value(1).as_deref(), Some("answer 1"));
    let failure = drain(&mut rx)
        .into_iter()
        .find(|event| matches!(event, AutofillEvent::FieldFailed { .. }))
        .unwrap();
    assert!(failure.message().starts_with("Failed to fill field 1 (q0): write failed"));
}

#[tokio::test]
async fn test_cancellation_stops_before_next_field() {
    let cancel = CancellationToken::new();
    let generator = ScriptedGenerator {
        cancel_after: Some((2, cancel.clone())),
        ..ScriptedGenerator::new()
    };
    let (mut orch, page, generator) = orchestrator(FakePage::new(page_with_inputs(4)), generator);
    let mut rx = orch.subscribe();

    let summary = orch.run("KEY", &cancel).await.unwrap();

    assert_eq!(summary, PassSummary { filled: 2, errors: 0, total: 4 });
    assert_eq!(generator.call_count(), 2);
    assert!(page.value(2).is_none());
    assert_eq!(
        drain(&mut rx).last(),
        Some(&AutofillEvent::Cancelled { filled: 2, errors: 0, total: 4 })
    );
    assert_eq!(orch.state(), PassState::Done);
}

#[tokio::test]
async fn test_unreadable_value_falls_back_to_snapshot() {
    let document = DomTree::from_specs([NodeSpec::element("label").children([
        NodeSpec::text("Bio "),
        NodeSpec::element("textarea").with_text("old text"),
    ])]);
    let mut page = FakePage::new(document);
    page.unreadable = true;
    let (mut orch, _page, generator) = orchestrator(page, ScriptedGenerator::new());

    let summary = orch.run("KEY", &CancellationToken::new()).await.unwrap();

    assert_eq!(summary.filled, 1);
    let calls = generator.calls.lock();
    assert!(calls[0].0.contains("- Current value: \"old text\""));
    assert!(calls[0].0.contains("- Label: \"Bio\""));
}

#[tokio::test]
async fn test_snapshot_reused_until_invalidated() {
    let (mut orch, page, _generator) =
        orchestrator(FakePage::new(page_with_inputs(1)), ScriptedGenerator::new());

    orch.run("KEY", &CancellationToken::new()).await.unwrap();
    orch.run("KEY", &CancellationToken::new()).await.unwrap();
    assert_eq!(*page.reads.lock(), 1);
    assert_eq!(orch.snapshot().map(|s| s.field_count()), Some(1));

    orch.invalidate_snapshot();
    assert!(orch.snapshot().is_none());
    orch.run("KEY", &CancellationToken::new()).await.unwrap();
    assert_eq!(*page.reads.lock(), 2);
}
