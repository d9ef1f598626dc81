//! Counter Example - state updates driven from the terminal
//!
//! Renders a counter component into the in-memory DOM and prints the markup
//! after every commit. Press `+` or space to click, `q` to quit.
//!
//! Run with: RUST_LOG=spark_fiber=debug cargo run --example counter

use std::error::Error;
use std::io::{self, Write};

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::terminal;
use spark_fiber::{
    render_root, use_state, Component, Element, Event, MemoryDom, NodeId, Props, SliceHost,
};
use tracing_subscriber::EnvFilter;
use web_time::Duration;

fn counter() -> Component {
    Component::new("Counter", |props| {
        let step = props.get("step").and_then(|v| v.as_int()).unwrap_or(1);
        let (count, state) = use_state(0i64);
        Element::host("div")
            .attr("class", "counter")
            .child(Element::host("h1").child(format!("Count: {count}")))
            .child(
                Element::host("button")
                    .on("onClick", move |_| {
                        let _ = state.update(move |c| c + step);
                    })
                    .child(format!("+{step}")),
            )
    })
}

fn print_frame(dom: &MemoryDom, container: NodeId) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "\r{}\r\n", dom.inner_html(container))?;
    out.flush()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut dom = MemoryDom::new();
    let container = dom.create_container("root");
    let app = counter().element(Props::new().with("step", 1));
    let mut runtime = render_root(dom, container, app);

    // Each key press gets a handful of 4ms idle periods.
    let idle = || SliceHost::new(Duration::from_millis(4), 16);
    runtime.run(&mut idle())?;
    print_frame(runtime.sink(), container)?;

    terminal::enable_raw_mode()?;
    let result = (|| -> Result<(), Box<dyn Error>> {
        loop {
            let TermEvent::Key(key) = event::read()? else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('+') | KeyCode::Char(' ') => {
                    if let Some(button) = runtime.sink().find(container, "button") {
                        runtime.sink().dispatch(button, &Event::new("click"));
                    }
                    let commits = runtime.run(&mut idle())?;
                    if commits > 0 {
                        print_frame(runtime.sink(), container)?;
                    }
                }
                _ => {}
            }
        }
    })();
    terminal::disable_raw_mode()?;
    result
}
