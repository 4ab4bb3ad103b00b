//! End-to-end task list scenario.
//!
//! A small task app (input field, create button, removable items) mounted on
//! the in-memory host. Events are fired through the host the way a platform
//! would fire them, and assertions read the host's op log.
//!
//! Run with: cargo test --test todo_scenario

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use spark_vdom::host::{dispatch, input};
use spark_vdom::{
    Host, HostOp, ManualScheduler, MemoryHost, Mutation, MutationMap, NodeId, RootLocator, Store,
    StoreOptions, VNode,
};

// =============================================================================
// APP
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
struct Form {
    input: String,
    has_error: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct State {
    tasks: Vec<String>,
    form: Form,
}

#[derive(Clone)]
struct Mutations {
    update_input: Mutation<State, String>,
    update_has_error: Mutation<State, bool>,
    create_task: Mutation<State, ()>,
    remove_task: Mutation<State, usize>,
}

fn is_invalid(input: &str) -> bool {
    let len = input.chars().count();
    !(3..=20).contains(&len)
}

fn register(map: &mut MutationMap<State>) -> Mutations {
    Mutations {
        update_input: map.register("updateInput", |s: &State, input: String| State {
            form: Form {
                input,
                ..s.form.clone()
            },
            ..s.clone()
        }),
        update_has_error: map.register("updateHasError", |s: &State, has_error: bool| State {
            form: Form {
                has_error,
                ..s.form.clone()
            },
            ..s.clone()
        }),
        create_task: map.register("createTask", |s: &State, (): ()| {
            let mut tasks = s.tasks.clone();
            tasks.push(s.form.input.clone());
            State {
                tasks,
                form: Form {
                    input: String::new(),
                    ..s.form.clone()
                },
            }
        }),
        remove_task: map.register("removeTask", |s: &State, index: usize| {
            let mut tasks = s.tasks.clone();
            if index < tasks.len() {
                tasks.remove(index);
            }
            State {
                tasks,
                ..s.clone()
            }
        }),
    }
}

fn view(state: &State, m: &Mutations) -> VNode {
    let on_input = {
        let (m, state) = (m.clone(), state.clone());
        move |ev: &spark_vdom::Event| {
            let value = ev.value.clone().unwrap_or_default();
            let invalid = is_invalid(&value);
            let next = m.update_input.call(&state, value);
            m.update_has_error.call(&next, invalid);
        }
    };
    let on_create = {
        let (m, state) = (m.clone(), state.clone());
        move |_: &spark_vdom::Event| {
            let invalid = is_invalid(&state.form.input);
            let next = m.update_has_error.call(&state, invalid);
            if !invalid {
                m.create_task.call(&next, ());
            }
        }
    };
    let display = if state.form.has_error { "block" } else { "none" };

    VNode::new("div")
        .attr("class", "app")
        .child(VNode::new("h1").attr("class", "title").child("Tasks"))
        .child(
            VNode::new("div")
                .attr("class", "field")
                .child(
                    VNode::new("input")
                        .attr("type", "text")
                        .attr("class", "input")
                        .attr("value", &state.form.input)
                        .on("input", on_input),
                )
                .child(
                    VNode::new("button")
                        .attr("class", "create")
                        .on("click", on_create)
                        .child("create"),
                )
                .child(
                    VNode::new("p")
                        .attr("class", "notification")
                        .attr("style", format!("display: {display}"))
                        .child("3 to 20 characters"),
                ),
        )
        .child(
            VNode::new("ul")
                .attr("class", "panel")
                .children(state.tasks.iter().enumerate().map(|(index, task)| {
                    let (m, state) = (m.clone(), state.clone());
                    VNode::new("li")
                        .attr("class", "panel-block")
                        .child(
                            VNode::new("button")
                                .attr("class", "delete")
                                .on("click", move |_| {
                                    m.remove_task.call(&state, index);
                                })
                                .child("remove"),
                        )
                        .child(task.as_str())
                })),
        )
}

struct App {
    store: Store<State, Mutations, MemoryHost>,
    frames: Rc<ManualScheduler>,
    host: Rc<RefCell<MemoryHost>>,
}

impl App {
    fn mount(tasks: &[&str]) -> Self {
        let host = Rc::new(RefCell::new(MemoryHost::new()));
        let root = host.borrow_mut().mount_point("app");
        let frames = Rc::new(ManualScheduler::new());
        let state = State {
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            form: Form::default(),
        };
        let store = Store::new(
            host.clone(),
            RootLocator::Node(root),
            view,
            state,
            register,
            frames.clone(),
            StoreOptions::default(),
        )
        .unwrap();
        frames.run_frame();
        host.borrow_mut().clear_ops();
        Self {
            store,
            frames,
            host,
        }
    }

    fn one(&self, selector: &str) -> NodeId {
        let found = self.host.borrow().query_selector_all(selector);
        assert_eq!(found.len(), 1, "expected one match for {selector}");
        found[0]
    }

    fn items(&self) -> Vec<NodeId> {
        let list = self.one(".panel");
        self.host.borrow().children(&list)
    }

    fn item_texts(&self) -> Vec<String> {
        let host = self.host.borrow();
        self.items()
            .into_iter()
            .map(|li| host.text_content(li).trim_start_matches("remove").to_string())
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_create_task_is_one_insertion() {
    let app = App::mount(&["a"]);
    let m = app.store.mutations();
    let list = app.one(".panel");
    let first_item = app.items()[0];

    let typed = m.update_input.call(&app.store.state(), "b".to_string());
    app.frames.run_frame();
    app.host.borrow_mut().clear_ops();

    let next = m.create_task.call(&typed, ());
    assert_eq!(next.tasks, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(next.form.input, "");

    // The next tree's list section gained exactly one item node.
    let tree = app.store.next_tree();
    let list_node = tree.child_nodes()[2].as_element().unwrap();
    assert_eq!(list_node.child_nodes().len(), 2);

    // Appends into freshly built (still detached) subtrees do not count.
    let attached = attached_nodes(&app.host.borrow());
    app.frames.run_frame();

    let host = app.host.borrow();
    let insertions: Vec<_> = host
        .ops()
        .iter()
        .filter(|op| match op {
            HostOp::Append { parent, .. } => attached.contains(parent),
            HostOp::Replace { .. } | HostOp::Remove { .. } => true,
            _ => false,
        })
        .collect();
    assert_eq!(insertions.len(), 1, "ops: {:?}", host.ops());
    assert!(matches!(insertions[0], HostOp::Append { parent, .. } if *parent == list));
    assert_eq!(host.children(&list)[0], first_item);
    drop(host);

    assert_eq!(app.item_texts(), vec!["a", "b"]);
}

/// Every node reachable from the body.
fn attached_nodes(host: &MemoryHost) -> HashSet<NodeId> {
    let mut attached = HashSet::new();
    let mut stack = vec![host.body()];
    while let Some(node) = stack.pop() {
        stack.extend(host.children(&node));
        attached.insert(node);
    }
    attached
}

#[test]
fn test_typing_updates_live_value_and_validation() {
    let app = App::mount(&[]);
    let field = app.one(".input");
    let notification = app.one(".notification");

    assert_eq!(input(&app.host, field, "ab"), 1);
    assert_eq!(app.store.state().form.input, "ab");
    assert!(app.store.state().form.has_error);

    app.frames.run_frame();
    {
        let host = app.host.borrow();
        assert_eq!(host.value(field), Some("ab"));
        // The value rule pushes only the live value, not the attribute.
        assert_eq!(host.attribute(field, "value"), Some(""));
        assert_eq!(host.attribute(notification, "style"), Some("display: block"));
    }

    input(&app.host, field, "abc");
    app.frames.run_frame();
    assert!(!app.store.state().form.has_error);
}

#[test]
fn test_click_create_with_valid_input() {
    let app = App::mount(&["first"]);
    let field = app.one(".input");
    let create = app.one(".create");

    input(&app.host, field, "second");
    app.frames.run_frame();

    // Listeners were rebound after the pass, so the click sees the new input.
    assert_eq!(dispatch(&app.host, create, "click"), 1);
    app.frames.run_frame();

    assert_eq!(app.store.state().tasks, vec!["first", "second"]);
    assert_eq!(app.item_texts(), vec!["first", "second"]);
    assert_eq!(app.host.borrow().value(field), Some(""));
}

#[test]
fn test_click_create_with_invalid_input_shows_error() {
    let app = App::mount(&[]);
    let create = app.one(".create");
    let notification = app.one(".notification");

    dispatch(&app.host, create, "click");
    app.frames.run_frame();

    assert!(app.store.state().tasks.is_empty());
    assert_eq!(
        app.host.borrow().attribute(notification, "style"),
        Some("display: block")
    );
}

#[test]
fn test_remove_first_task_patches_positionally() {
    let app = App::mount(&["a", "b", "c"]);
    let before = app.items();
    let delete_first = app.host.borrow().query_selector_all(".delete")[0];

    dispatch(&app.host, delete_first, "click");
    app.frames.run_frame();

    assert_eq!(app.store.state().tasks, vec!["b", "c"]);
    // Items 0 and 1 are kept and their text patched; the last one is removed.
    assert_eq!(app.items(), before[..2].to_vec());
    assert_eq!(app.item_texts(), vec!["b", "c"]);
    let removals = app
        .host
        .borrow()
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::Remove { .. }))
        .count();
    assert_eq!(removals, 1);
}

#[test]
fn test_rendered_markup() {
    let app = App::mount(&["a"]);
    let markup = app.host.borrow().to_markup(app.store.root());
    assert_eq!(
        markup,
        "<div id=\"app\"><div class=\"app\">\
         <h1 class=\"title\">Tasks</h1>\
         <div class=\"field\">\
         <input type=\"text\" class=\"input\" value=\"\"></input>\
         <button class=\"create\">create</button>\
         <p class=\"notification\" style=\"display: none\">3 to 20 characters</p>\
         </div>\
         <ul class=\"panel\"><li class=\"panel-block\"><button class=\"delete\">remove</button>a</li></ul>\
         </div></div>"
    );
}
