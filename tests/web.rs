//! Browser smoke tests for the JS bindings. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use diagram_layout_wasm::{DiagramLayoutWasm, LayoutState};
use wasm_bindgen::{JsError, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn ok<T>(result: Result<T, JsError>) -> T {
    result.map_err(JsValue::from).unwrap()
}

fn config(entries: &[(&str, f64)]) -> JsValue {
    let object = js_sys::Object::new();
    for (key, value) in entries {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_f64(*value)).unwrap();
    }
    object.into()
}

#[wasm_bindgen_test]
fn test_nodes_and_nesting() {
    let mut layout = ok(DiagramLayoutWasm::new());
    let parent = layout.add_node(0.0, 0.0, 300.0, 200.0);
    let child = ok(layout.add_child(parent, 10.0, 10.0, 60.0, 30.0));

    assert_eq!(layout.node_count(), 2);
    assert_eq!(layout.get_node_depth(child), Some(1));
    assert_eq!(layout.get_parent(child), Some(parent));
    assert_eq!(layout.get_children(parent), vec![child]);
    assert!(layout.add_child(999, 0.0, 0.0, 1.0, 1.0).is_err());
    assert!(layout.set_parent(parent, Some(child)).is_err());
}

#[wasm_bindgen_test]
fn test_layout_session_runs_to_completion() {
    let mut layout = ok(DiagramLayoutWasm::with_config(config(&[
        ("coolingDelayMs", 0.0),
        ("annealingRate", 0.5),
    ])));
    let a = layout.add_node(0.0, 0.0, 80.0, 40.0);
    let b = layout.add_node(200.0, 0.0, 80.0, 40.0);
    layout.add_edge(a, b).unwrap();

    layout.start_layout(&[]);
    assert!(layout.is_layout_running());

    let mut state = LayoutState::Running;
    for _ in 0..5_000 {
        state = layout.tick();
        if state != LayoutState::Running {
            break;
        }
    }
    assert_eq!(state, LayoutState::Settled);
    assert!(!layout.is_layout_running());

    let distance = layout.get_node_x(b).unwrap() - layout.get_node_x(a).unwrap();
    assert!((distance - 125.0).abs() <= 5.0, "settled at {distance}");
}

#[wasm_bindgen_test]
fn test_config_round_trip_through_js() {
    let mut layout = ok(DiagramLayoutWasm::new());
    ok(layout.update_config(config(&[("springLength", 90.0)])));

    let current = ok(layout.get_config());
    let spring = js_sys::Reflect::get(&current, &JsValue::from_str("springLength")).unwrap();
    assert_eq!(spring.as_f64(), Some(90.0));

    assert!(layout.update_config(config(&[("annealingRate", 1.5)])).is_err());
    assert!(layout.update_config(config(&[("notAField", 1.0)])).is_err());
}

#[wasm_bindgen_test]
fn test_anchored_node_stays_put() {
    let mut layout = ok(DiagramLayoutWasm::new());
    let anchor = layout.add_node(50.0, 50.0, 80.0, 40.0);
    layout.set_anchored(anchor, true);
    layout.add_node(70.0, 60.0, 80.0, 40.0);

    for _ in 0..100 {
        layout.step();
    }
    assert_eq!(layout.get_node_x(anchor), Some(50.0));
    assert_eq!(layout.get_node_y(anchor), Some(50.0));
}
