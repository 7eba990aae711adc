//! Page lifecycle across navigations: each page owns its own state and
//! unmount leaves nothing listening.

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use scrolly_core::{Rect, Viewport};
use scrolly_page::{PageConfig, PageSession, load_trace, replay};

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

fn page(name: &str, ids: &[&str]) -> PageConfig {
    let mut toml = format!("[page]\nname = \"{name}\"\n\n[[ambient]]\nperiod_ms = 4000.0\n");
    for id in ids {
        toml.push_str(&format!("\n[[scenes]]\nid = \"{id}\"\npalette = \"#336699\"\n"));
    }
    PageConfig::from_toml_str(&toml).unwrap()
}

fn lay_out(session: &mut PageSession, ids: &[&str]) {
    for (i, id) in ids.iter().enumerate() {
        session.layout(id, Some(Rect::band(i as f64 * 900.0, 900.0)), 0.0);
    }
}

#[test]
fn navigating_between_pages_does_not_leak() {
    let viewport = Viewport::new(1280.0, 900.0);
    let home_ids = ["hero", "features", "pricing"];
    let about_ids = ["story", "team"];

    let mut home = PageSession::mount(&page("home", &home_ids), viewport, 0.0, &mut rng());
    lay_out(&mut home, &home_ids);
    home.scroll(1800.0, 50.0);
    assert_eq!(home.frame(50.0).active_id.as_deref(), Some("pricing"));

    home.unmount();
    assert_eq!(home.registry().live_count(), 0);
    assert_eq!(home.registry().listener_count(), 0);
    let emitted = home.registry().crossings_emitted();
    home.scroll(0.0, 60.0);
    assert_eq!(home.registry().crossings_emitted(), emitted);

    let mut about = PageSession::mount(&page("about", &about_ids), viewport, 100.0, &mut rng());
    lay_out(&mut about, &about_ids);
    let f = about.frame(100.0);
    assert_eq!(f.active_index, 0, "fresh page starts at its first scene");
    assert_eq!(f.active_id.as_deref(), Some("story"));
}

#[test]
fn ambient_loops_run_independently_of_scenes() {
    let ids = ["a", "b"];
    let mut s = PageSession::mount(&page("p", &ids), Viewport::new(800.0, 900.0), 0.0, &mut rng());
    lay_out(&mut s, &ids);

    let before = s.frame(1000.0).ambient[0];
    s.scroll(900.0, 1000.0);
    let after = s.frame(1000.0).ambient[0];
    assert_eq!(before, after, "scene change does not touch ambient motion");

    let later = s.frame(2000.0).ambient[0];
    assert_abs_diff_eq!(
        (later.rotation_deg - after.rotation_deg).rem_euclid(360.0),
        90.0,
        epsilon = 1e-6
    );
}

#[test]
fn replay_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.json");
    std::fs::write(
        &trace_path,
        r#"[
            {"type": "layout", "scene": "a", "top": 0, "height": 900},
            {"type": "layout", "scene": "b", "top": 900, "height": 900},
            {"type": "scroll", "y": 900, "at_ms": 10},
            {"type": "detach", "scene": "b"},
            {"type": "scroll_to", "scene": "b"}
        ]"#,
    )
    .unwrap();

    let events = load_trace(&trace_path).unwrap();
    let report = replay(&page("files", &["a", "b"]), &events, Viewport::new(800.0, 900.0), &mut rng());
    assert_eq!(report.changes, vec![1]);
    assert!(report.steps[4].scroll_target.is_none(), "detached scene is a silent no-op");
    assert_eq!(report.steps[4].frame.active_index, 1);
}
