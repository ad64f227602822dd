//! Navigation reconciliation: the five-branch algorithm.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{settle, test_app, CallLog, RecordingHooks, TestHost};
use viewtree::{App, RouteManager, Status, ViewStateSpec};

fn view_spec(name: &str, path: &str, log: &CallLog) -> ViewStateSpec {
    ViewStateSpec::new(name, path)
        .template(&format!("<section>{name}</section>"))
        .hooks(RecordingHooks::new(name, log))
}

/// parent `p/:id` with children `a` and `b` (siblings) and `c`, plus an
/// unrelated root `d/:id`.
fn family(app: &App, host: &TestHost, log: &CallLog) -> RouteManager {
    let routes = RouteManager::new();
    for name in ["parent", "a", "b", "c", "d"] {
        host.provide_slot(name);
    }
    routes
        .register(app, view_spec("parent", "p/:id", log))
        .unwrap();
    routes
        .register_child(app, view_spec("a", "a", log), "parent")
        .unwrap();
    routes
        .register_child(app, view_spec("b", "b", log), "parent")
        .unwrap();
    routes
        .register_child(app, view_spec("c", "c", log), "parent")
        .unwrap();
    routes.register(app, view_spec("d", "d/:id", log)).unwrap();
    routes
}

fn active_name(routes: &RouteManager) -> String {
    routes.active_view_state().unwrap().name()
}

#[test]
fn child_routes_carry_the_parent_prefix() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);
    let (view, args) = routes.match_url("p/7/a").unwrap();
    assert_eq!(view.name(), "a");
    assert_eq!(args, vec!["7".to_string()]);
    assert!(routes.match_url("q/7/a").is_none());
}

#[test]
fn first_navigation_enters_ancestors_before_target() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/5/a").unwrap();
    settle(&app);

    let parent = routes.view_state("parent").unwrap();
    let a = routes.view_state("a").unwrap();
    assert!(parent.node().is_active());
    assert!(a.node().is_active());
    assert_eq!(a.node().status(), Status::Loaded);
    assert_eq!(active_name(&routes), "a");
    assert_eq!(routes.last_route_args(), vec!["5".to_string()]);

    // The parent's hooks ran before the target's.
    let entries = log.entries();
    let parent_enter = entries
        .iter()
        .position(|entry| entry == "parent:enter(5)")
        .unwrap();
    let a_enter = entries.iter().position(|entry| entry == "a:enter(5)").unwrap();
    assert!(parent_enter < a_enter);
}

#[test]
fn sibling_navigation_transitions_cleans_up_and_enters() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/5/a").unwrap();
    settle(&app);
    routes.navigate(&app, "p/5/b").unwrap();
    settle(&app);

    let a = routes.view_state("a").unwrap();
    let b = routes.view_state("b").unwrap();
    // a was parked, not destroyed: inactive, subtree gone, output intact.
    assert!(!a.node().is_active());
    assert_eq!(a.node().status(), Status::Unrendered);
    assert_eq!(host.markup("a").unwrap(), "<section>a</section>");
    assert!(log.entries().contains(&"a:transition".to_string()));
    assert!(log.entries().contains(&"b:enter(5)".to_string()));
    assert!(b.node().is_active());
    assert_eq!(active_name(&routes), "b");
    assert!(b.is_active(&routes));
    assert!(!a.is_active(&routes));
}

#[test]
fn navigating_to_an_ancestor_only_transitions() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/7/c").unwrap();
    settle(&app);
    routes.navigate(&app, "p/7").unwrap();
    settle(&app);

    let parent = routes.view_state("parent").unwrap();
    let c = routes.view_state("c").unwrap();
    // Only the soft transition ran: c's subtree was neither cleaned up nor
    // destroyed.
    assert!(log.entries().contains(&"c:transition".to_string()));
    assert!(c.node().is_active());
    assert_eq!(c.node().status(), Status::Loaded);
    assert_eq!(host.markup("c").unwrap(), "<section>c</section>");
    assert_eq!(active_name(&routes), "parent");
    assert!(parent.node().is_active());
}

#[test]
fn same_context_descendant_keeps_the_parent_mounted() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/7").unwrap();
    settle(&app);
    routes.navigate(&app, "p/7/c").unwrap();
    settle(&app);

    assert!(log.entries().contains(&"parent:transition".to_string()));
    assert!(log.entries().contains(&"c:enter(7)".to_string()));
    // The parent was parked and re-entered by the cascade; its output never
    // left the document.
    let parent = routes.view_state("parent").unwrap();
    assert!(parent.node().is_active());
    assert_eq!(host.markup("parent").unwrap(), "<section>parent</section>");
    assert_eq!(active_name(&routes), "c");
}

#[test]
fn descendant_navigation_with_changed_context_is_unrelated() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/7").unwrap();
    settle(&app);
    routes.navigate(&app, "p/8/c").unwrap();
    settle(&app);

    // No soft transition: the positional context changed, so the old branch
    // was destroyed outright before re-entry.
    assert!(!log.entries().contains(&"parent:transition".to_string()));
    assert_eq!(active_name(&routes), "c");
    assert_eq!(routes.last_route_args(), vec!["8".to_string()]);
}

#[test]
fn unrelated_navigation_destroys_the_whole_previous_branch() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/7/c").unwrap();
    settle(&app);
    routes.navigate(&app, "d/x").unwrap();
    settle(&app);

    let parent = routes.view_state("parent").unwrap();
    let c = routes.view_state("c").unwrap();
    let d = routes.view_state("d").unwrap();
    // c and every ancestor were destroyed: inactive, output emptied but the
    // singleton slots persist.
    assert!(!c.node().is_active());
    assert!(!parent.node().is_active());
    assert_eq!(host.markup("c").unwrap(), "");
    assert_eq!(host.markup("parent").unwrap(), "");
    assert!(!log.entries().contains(&"c:transition".to_string()));
    assert!(log.entries().contains(&"d:enter(x)".to_string()));
    assert!(d.node().is_active());
    assert_eq!(active_name(&routes), "d");
}

#[test]
fn parked_sibling_renders_fresh_on_revisit() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);

    routes.navigate(&app, "p/5/a").unwrap();
    settle(&app);
    routes.navigate(&app, "p/5/b").unwrap();
    settle(&app);
    routes.navigate(&app, "p/5/a").unwrap();
    settle(&app);

    let a = routes.view_state("a").unwrap();
    assert!(a.node().is_active());
    assert_eq!(a.node().status(), Status::Loaded);
    assert_eq!(active_name(&routes), "a");
}

#[test]
fn navigated_fires_once_per_navigation_with_the_target_name() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        routes.on_navigated(move |event| seen.borrow_mut().push(event.name.clone()));
    }

    routes.navigate(&app, "p/5/a").unwrap();
    routes.navigate(&app, "p/5/b").unwrap();
    settle(&app);

    assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn unmatched_urls_fail_fast_naming_the_url() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);
    let error = routes.navigate(&app, "nowhere/1").unwrap_err();
    assert!(error.to_string().contains("nowhere/1"));
    assert!(routes.active_view_state().is_none());
}

#[test]
fn registration_is_singleton_per_name() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);
    let again = routes
        .register(&app, view_spec("parent", "p/:id", &log))
        .unwrap();
    assert!(again.ptr_eq(&routes.view_state("parent").unwrap()));
}

#[test]
fn registering_a_child_under_an_unknown_parent_fails_fast() {
    let (app, _host) = test_app();
    let log = CallLog::new();
    let routes = RouteManager::new();
    let error = routes
        .register_child(&app, view_spec("orphan", "o", &log), "ghost")
        .unwrap_err();
    assert!(error.to_string().contains("ghost"));
}

#[test]
fn relation_queries_walk_the_logical_chain() {
    let (app, host) = test_app();
    let log = CallLog::new();
    let routes = family(&app, &host, &log);
    host.provide_slot("grand");
    routes
        .register_child(&app, view_spec("grand", "g", &log), "c")
        .unwrap();

    let parent = routes.view_state("parent").unwrap();
    let a = routes.view_state("a").unwrap();
    let b = routes.view_state("b").unwrap();
    let c = routes.view_state("c").unwrap();
    let d = routes.view_state("d").unwrap();
    let grand = routes.view_state("grand").unwrap();

    assert!(parent.is_parent_of(&a));
    assert!(parent.is_parent_of(&grand));
    assert!(!a.is_parent_of(&parent));
    assert!(!parent.is_parent_of(&d));
    assert!(a.is_sibling(&b));
    assert!(b.is_sibling(&a));
    assert!(!a.is_sibling(&grand));
    assert!(!parent.is_sibling(&d));
    assert!(!a.is_active(&routes));
}
