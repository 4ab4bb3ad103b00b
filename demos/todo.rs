//! Todo Example - Store, reconciler and terminal presenter working together
//!
//! This example demonstrates:
//! - Typed mutations and a view rebuilt from state
//! - Coalesced per-frame reconciliation on a FrameLoop
//! - Events fired through the in-memory host
//! - Repainting from the store's revision signal
//!
//! Keys: type to edit, Backspace, Enter creates, Alt+1-9 removes, Esc quits.
//! Set SPARK_VDOM_LOG=/tmp/vdom.log to write a trace file.
//!
//! Run with: cargo run --example todo

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use spark_signals::flush_sync;
use spark_vdom::host::{dispatch, input};
use spark_vdom::renderer::terminal::present;
use spark_vdom::{
    Event, FrameLoop, Host, MemoryHost, Mutation, MutationMap, NodeId, RootLocator, Store,
    StoreOptions, TerminalRenderer, VNode,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// =============================================================================
// State
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

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 20;

fn is_invalid(input: &str) -> bool {
    !(MIN_LEN..=MAX_LEN).contains(&input.chars().count())
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

// =============================================================================
// View
// =============================================================================

fn view(state: &State, m: &Mutations) -> VNode {
    let on_input = {
        let (m, state) = (m.clone(), state.clone());
        move |ev: &Event| {
            let value = ev.value.clone().unwrap_or_default();
            let invalid = is_invalid(&value);
            // Chain so the second transition sees the first one's result.
            let next = m.update_input.call(&state, value);
            m.update_has_error.call(&next, invalid);
        }
    };
    let on_create = {
        let (m, state) = (m.clone(), state.clone());
        move |_: &Event| {
            let invalid = is_invalid(&state.form.input);
            let next = m.update_has_error.call(&state, invalid);
            if !invalid {
                m.create_task.call(&next, ());
            }
        }
    };
    let display = if state.form.has_error { "block" } else { "none" };

    VNode::new("div")
        .attr("class", "container")
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
                        .child(format!("{MIN_LEN} to {MAX_LEN} characters")),
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

// =============================================================================
// Main
// =============================================================================

fn init_tracing() {
    // The terminal is the display, so logs only ever go to a file.
    let Ok(log_path) = std::env::var("SPARK_VDOM_LOG") else {
        return;
    };
    let Ok(file) = std::fs::File::create(&log_path) else {
        eprintln!("Warning: Failed to create log file: {log_path}");
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
}

fn first(host: &RefCell<MemoryHost>, selector: &str) -> Option<NodeId> {
    host.borrow().query_selector_all(selector).into_iter().next()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let host = Rc::new(RefCell::new(MemoryHost::new()));
    host.borrow_mut().mount_point("app");
    // Nothing reads the op log here.
    host.borrow_mut().set_recording(false);
    let frames = Rc::new(FrameLoop::new());

    let initial = State {
        tasks: vec!["learn the reconciler".to_string()],
        form: Form::default(),
    };
    let store = Store::new(
        host.clone(),
        RootLocator::selector("#app"),
        view,
        initial,
        register,
        frames.clone(),
        StoreOptions::default(),
    )?;

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

    let _stop = present(
        store.revision(),
        host.clone(),
        store.root(),
        TerminalRenderer::stdout(),
        Some("type: edit | enter: create | alt+1-9: remove | esc: quit".to_string()),
    );

    let result = run(&host, &frames);

    execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    tracing::info!(tasks = store.state().tasks.len(), "todo demo finished");
    result
}

fn run(host: &RefCell<MemoryHost>, frames: &FrameLoop) -> Result<(), Box<dyn std::error::Error>> {
    while frames.is_running() {
        if event::poll(frames.time_until_next_frame())? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = key_action(key.code, key.modifiers) {
                        apply(host, frames, action);
                    }
                }
            }
        }
        if frames.run_due() > 0 {
            flush_sync();
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Create,
    Backspace,
    Remove(usize),
    Type(char),
}

/// Digits type into the field unless Alt is held, which makes them remove
/// the task at that position.
fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Enter => Some(Action::Create),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c @ '1'..='9') if modifiers.contains(KeyModifiers::ALT) => {
            Some(Action::Remove(c as usize - '1' as usize))
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::ALT) => Some(Action::Type(c)),
        _ => None,
    }
}

fn apply(host: &RefCell<MemoryHost>, frames: &FrameLoop, action: Action) {
    let Some(field) = first(host, ".input") else {
        return;
    };
    let current = host.borrow().value(field).unwrap_or_default().to_string();

    match action {
        Action::Quit => frames.stop(),
        Action::Create => {
            if let Some(button) = first(host, ".create") {
                dispatch(host, button, "click");
            }
        }
        Action::Backspace => {
            let mut edited = current;
            edited.pop();
            input(host, field, &edited);
        }
        Action::Remove(index) => {
            let delete = host.borrow().query_selector_all(".delete").get(index).copied();
            if let Some(delete) = delete {
                dispatch(host, delete, "click");
            }
        }
        Action::Type(c) => {
            let mut edited = current;
            edited.push(c);
            input(host, field, &edited);
        }
    }
}
