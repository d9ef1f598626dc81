//! Mount Example - initial mount, re-render and time-sliced work
//!
//! Walks through what the runtime sends to the sink: detached node creation
//! while a generation is being built, then one atomic commit.
//!
//! Run with: cargo run --example mount

use spark_fiber::{
    create_element, render_root, Child, Element, MemoryDom, Mutation, Props, Result, StepDeadline,
};

fn print_log(title: &str, log: &[Mutation]) {
    println!("{title}:");
    for mutation in log {
        println!("  {mutation:?}");
    }
}

fn main() -> Result<()> {
    let mut dom = MemoryDom::new();
    let container = dom.create_container("root");

    let tree = create_element(
        "div",
        Some(Props::new().with("id", "foo")),
        [
            Child::from(create_element("a", None, [Child::from("bar")])),
            Child::from(Element::host("b")),
        ],
    );
    let mut runtime = render_root(dom, container, tree);

    // Two units per slice, so the work spans several slices.
    let mut slice = 0;
    loop {
        slice += 1;
        let report = runtime.work_loop(&StepDeadline::new(2))?;
        print_log(&format!("slice {slice}"), &runtime.sink_mut().take_log());
        if let Some(summary) = report.committed {
            println!("committed: {summary:?}");
            break;
        }
    }
    println!("{}\n", runtime.sink().inner_html(container));

    // Same shape, one kind change and one attribute change.
    runtime.render_root(
        Element::host("div")
            .attr("id", "bar")
            .child(Element::host("a").child("bar"))
            .child(Element::host("i")),
    );
    let report = runtime.flush()?;
    print_log("re-render", &runtime.sink_mut().take_log());
    println!("committed: {:?}", report.committed);
    println!("{}", runtime.sink().inner_html(container));
    Ok(())
}
