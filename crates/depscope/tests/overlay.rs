//! Interaction overlay tests against an analyzed graph.

use depscope::overlay::{EdgeStyle, Emphasis};
use depscope::{
    ApiResponse, CameraRequest, Config, DepScope, Focus, OverlayConfig, OverlayEvent, RawEdge,
    RawNode,
};
use rstest::{fixture, rstest};

fn auth_response() -> ApiResponse {
    ApiResponse {
        nodes: vec![
            RawNode::new("src/authMiddleware.ts").with_label("authMiddleware.ts"),
            RawNode::new("src/auth.ts").with_label("auth.ts"),
            RawNode::new("src/api/oauth.ts").with_label("oauth.ts"),
            RawNode::new("src/index.ts").with_label("index.ts"),
        ],
        edges: vec![
            RawEdge::new("src/authMiddleware.ts", "src/auth.ts"),
            RawEdge::new("src/index.ts", "src/authMiddleware.ts"),
            RawEdge::new("src/api/oauth.ts", "src/auth.ts"),
        ],
        ..ApiResponse::default()
    }
}

#[fixture]
fn view() -> depscope::GraphView {
    let mut config = Config::default();
    config.layout.iterations = 10;
    config.layout.seed = Some(11);
    DepScope::new(config)
        .expect("valid config")
        .analyze(&auth_response())
        .expect("graph has nodes")
}

#[rstest]
fn search_ranks_label_prefix_before_substring(view: depscope::GraphView) {
    let mut overlay = view.overlay(OverlayConfig::default());

    let hits = overlay.search("auth");

    let labels: Vec<&str> = hits.iter().map(|h| h.label.as_str()).collect();
    assert_eq!(labels, vec!["auth.ts", "authMiddleware.ts", "oauth.ts"]);
}

#[rstest]
#[case::upper("AUTH")]
#[case::mixed("aUtH")]
fn search_ignores_case(view: depscope::GraphView, #[case] query: &str) {
    let mut overlay = view.overlay(OverlayConfig::default());

    assert_eq!(overlay.search(query).len(), 3);
}

#[rstest]
#[case::trailing_space("auth ")]
#[case::leading_space(" auth")]
fn search_keeps_surrounding_spaces(view: depscope::GraphView, #[case] query: &str) {
    let mut overlay = view.overlay(OverlayConfig::default());

    assert!(overlay.search(query).is_empty());
    assert_eq!(overlay.query(), query);
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn blank_query_matches_nothing(view: depscope::GraphView, #[case] query: &str) {
    let mut overlay = view.overlay(OverlayConfig::default());

    assert!(overlay.search(query).is_empty());
}

#[rstest]
fn search_limit_comes_from_config(view: depscope::GraphView) {
    let mut overlay = view.overlay(OverlayConfig {
        search_limit: 1,
        ..OverlayConfig::default()
    });

    let hits = overlay.search("auth");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "src/auth.ts");
}

#[rstest]
fn hover_then_search_then_clear(view: depscope::GraphView) {
    let graph = &view.graph;
    let auth = graph.node_id("src/auth.ts").unwrap();
    let index = graph.node_id("src/index.ts").unwrap();
    let middleware = graph.node_id("src/authMiddleware.ts").unwrap();
    let mut overlay = view.overlay(OverlayConfig::default());

    // Hover: auth and its importers light up, index fades
    assert!(overlay.hover_enter(auth));
    assert_eq!(overlay.node_style(auth).unwrap().emphasis, Emphasis::Focused);
    assert_eq!(overlay.node_style(middleware).unwrap().emphasis, Emphasis::Neighbor);
    assert_eq!(overlay.node_style(index).unwrap().emphasis, Emphasis::Faded);
    assert_eq!(
        overlay.edge_styles(),
        vec![EdgeStyle::Emphasized, EdgeStyle::Hidden, EdgeStyle::Emphasized]
    );

    overlay.hover_leave();
    assert_eq!(overlay.focus(), Focus::None);

    // Search and pick a result: pinned, camera moves, query cleared
    let hits = overlay.search("index");
    let event = overlay.select_result(hits[0].node);
    assert_eq!(overlay.focus(), Focus::Pinned(index));
    assert!(overlay.query().is_empty());
    let position = graph.node(index).position;
    assert_eq!(
        event,
        Some(OverlayEvent::Camera(CameraRequest::Animate {
            x: position.x,
            y: position.y,
            ratio: OverlayConfig::default().search_zoom_ratio,
            duration_ms: OverlayConfig::default().animation_duration_ms,
        }))
    );
    assert_eq!(overlay.node_style(auth).unwrap().emphasis, Emphasis::Faded);

    // Clear: everything back to default
    assert!(matches!(
        overlay.clear_search(),
        OverlayEvent::Camera(CameraRequest::Reset { .. })
    ));
    assert!(overlay
        .node_styles()
        .iter()
        .all(|style| style.emphasis == Emphasis::Default));
}

#[rstest]
fn click_emits_file_path(view: depscope::GraphView) {
    let overlay = view.overlay(OverlayConfig::default());
    let oauth = view.graph.node_id("src/api/oauth.ts").unwrap();

    assert_eq!(
        overlay.click(oauth),
        Some(OverlayEvent::SelectFile("src/api/oauth.ts".to_string()))
    );
}

#[rstest]
fn faded_nodes_blend_toward_background(view: depscope::GraphView) {
    let config = OverlayConfig {
        background_color: "#000000".to_string(),
        fade_amount: 1.0,
        ..OverlayConfig::default()
    };
    let mut overlay = view.overlay(config);
    let auth = view.graph.node_id("src/auth.ts").unwrap();
    let index = view.graph.node_id("src/index.ts").unwrap();

    overlay.hover_enter(auth);

    let faded = overlay.node_style(index).unwrap();
    assert_eq!(faded.color, "#000000");
    assert!(faded.label.is_none());
}

#[test]
fn events_serialize_for_renderer() {
    let event = OverlayEvent::Camera(CameraRequest::Animate {
        x: 1.5,
        y: -2.0,
        ratio: 0.3,
        duration_ms: 500,
    });

    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["event"], "camera");
    assert_eq!(json["payload"]["kind"], "animate");
    assert_eq!(json["payload"]["duration_ms"], 500);
}
