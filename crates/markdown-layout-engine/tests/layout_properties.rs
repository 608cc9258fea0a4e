use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use markdown_layout_engine::layout::{
    LayoutCache, LayoutResult, LayoutSolver, MathRenderer, RasterImage, Size, StyledText, Theme,
};
use markdown_layout_engine::nodes::{MathStyle, Node, NodeKind};
use markdown_layout_engine::parsing::parse_document;
use markdown_layout_engine::plugins::default_plugins;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn solver() -> LayoutSolver {
    LayoutSolver::new(Theme::default()).with_cache(Arc::new(LayoutCache::default()))
}

/// Never finishes rendering, standing in for a renderer that is still busy
/// when its caller gives up.
struct PendingMath;

#[async_trait]
impl MathRenderer for PendingMath {
    async fn render(&self, _latex: &str, _display_mode: bool) -> Option<RasterImage> {
        futures::future::pending::<()>().await;
        None
    }
}

#[tokio::test]
async fn relayout_is_idempotent() {
    let doc = parse_document(
        "# Title\n\nA paragraph with **bold** text.\n\n- one\n- two\n\n```rust\nlet x = 1;\n```",
        &default_plugins(),
    );

    // Separate caches so the second pass really recomputes.
    let first = solver().solve(&doc, 320.0).await;
    let second = solver().solve(&doc, 320.0).await;

    assert_eq!(first.size, second.size);
    assert_eq!(first.children.len(), second.children.len());
    for (a, b) in first.children.iter().zip(&second.children) {
        assert_eq!(a.size, b.size);
        assert_eq!(a.styled_text, b.styled_text);
    }
}

#[tokio::test]
async fn narrower_widths_never_need_less_height() {
    let paragraph = Node::paragraph(vec![Node::text("w".repeat(500))]);
    let solver = solver();

    let mut previous = f64::INFINITY;
    for width in [50.0, 100.0, 200.0, 400.0, 800.0, 1600.0] {
        let height = solver.solve(&paragraph, width).await.size.height;
        assert!(height <= previous, "height grew from {previous} to {height} at {width}");
        previous = height;
    }
}

#[rstest]
#[case(1.0)]
#[case(17.5)]
#[case(320.0)]
#[case(10_000.0)]
#[tokio::test]
async fn width_is_never_exceeded(#[case] width: f64) {
    let doc = parse_document(
        "Long paragraph text that should wrap several times over.\n\n| a | b |\n|---|---|\n| 1 | 2 |",
        &default_plugins(),
    );
    let result = solver().solve(&doc, width).await;
    for child in &result.children {
        assert!(child.size.width <= width);
        assert!(child.size.height.is_finite() && child.size.height >= 0.0);
    }
}

#[test]
fn cache_matches_exact_widths_only() {
    let cache = LayoutCache::default();
    let node = Node::text("cached");
    cache.set(
        Arc::new(LayoutResult {
            node: node.clone(),
            size: Size::new(42.0, 7.0),
            styled_text: StyledText::new(),
            children: vec![],
        }),
        300.0,
    );

    assert_eq!(cache.get(node.id(), 300.0).map(|r| r.size), Some(Size::new(42.0, 7.0)));
    assert!(cache.get(node.id(), 300.000_000_001).is_none());
    assert!(cache.get(node.id(), 299.0).is_none());
}

#[tokio::test]
async fn solved_documents_populate_the_shared_cache() {
    let cache = Arc::new(LayoutCache::new(1_000));
    let solver = solver().with_cache(cache.clone());
    let doc = parse_document("one\n\ntwo\n\nthree", &[]);

    solver.solve(&doc, 200.0).await;
    assert_eq!(cache.len(), 4);
    assert!(cache.get(doc.children()[2].id(), 200.0).is_some());
}

#[tokio::test]
async fn mermaid_without_adapter_matches_a_code_block() {
    let solver = solver();
    let diagram_doc = parse_document("```mermaid\ngraph TD\n  A-->B\n```", &default_plugins());
    let diagram = &diagram_doc.children()[0];
    assert!(matches!(diagram.kind(), NodeKind::Diagram { .. }));

    let code = Node::new(NodeKind::CodeBlock {
        language: Some("mermaid".into()),
        code: "graph TD\n  A-->B\n".into(),
    });

    let a = solver.solve(diagram, 400.0).await;
    let b = solver.solve(&code, 400.0).await;
    assert_eq!(a.styled_text, b.styled_text);
    assert_eq!(a.size, b.size);
    assert!(a.styled_text.plain_text().starts_with("MERMAID\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_solves_share_one_cache() {
    let cache = Arc::new(LayoutCache::default());
    let solver = solver().with_cache(cache.clone());
    let doc = parse_document(
        &"Some paragraph text.\n\n- item\n\n> quote\n\n".repeat(20),
        &default_plugins(),
    );

    let widths = [120.0, 240.0, 360.0, 480.0];
    let tasks: Vec<_> = widths
        .iter()
        .flat_map(|&w| [w, w])
        .map(|width| {
            let solver = solver.clone();
            let doc = doc.clone();
            tokio::spawn(async move { (width, solver.solve(&doc, width).await) })
        })
        .collect();

    for task in tasks {
        let (width, result) = task.await.unwrap();
        assert_eq!(result.children.len(), doc.children().len());
        assert!(result.children.iter().all(|c| c.size.width <= width));
    }
    for width in widths {
        assert!(cache.get(doc.id(), width).is_some());
    }
}

#[tokio::test]
async fn cancelled_solve_leaves_no_cache_entry() {
    let cache = Arc::new(LayoutCache::default());
    let solver = solver()
        .with_cache(cache.clone())
        .with_math_renderer(Arc::new(PendingMath));
    let math = Node::math(MathStyle::Block, "x^2");

    let outcome = tokio::time::timeout(Duration::from_millis(50), solver.solve(&math, 300.0)).await;
    assert!(outcome.is_err());
    assert!(cache.get(math.id(), 300.0).is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn escaped_dollars_stay_text() {
    let doc = parse_document("Escaped \\$notMath\\$ and real $x$", &default_plugins());
    let mut equations = Vec::new();
    doc.walk(&mut |n| {
        if let NodeKind::Math { equation, .. } = n.kind() {
            equations.push(equation.clone());
        }
    });
    assert_eq!(equations, vec!["x".to_string()]);

    let result = solver().solve(&doc, 600.0).await;
    let text = result.children[0].styled_text.plain_text();
    assert!(text.contains("$notMath"), "{text}");
    assert!(text.ends_with("real x"));
}
