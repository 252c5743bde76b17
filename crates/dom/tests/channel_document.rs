//! End-to-end test: a document talking to a native host over the channel
//! transport, with the native mirror served from its own thread.

use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Context as _;

use bridge::{BridgeConfig, NativeHost, SharedModuleBridge, TargetId, channel};
use dom::{Document, FormData, FormDataPart};

#[test]
fn document_and_form_data_over_one_channel() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = BridgeConfig::default().with_batch_updates(true);
    let (bridge, mut mirror) = channel(NativeHost::new(&config));
    let server = thread::spawn(move || {
        mirror.serve_blocking();
        mirror.into_host()
    });

    let modules: SharedModuleBridge = Arc::new(Mutex::new(bridge.clone()));
    let mut document = Document::with_config(Box::new(bridge), &config);
    let body = document.body();
    let node = document.create_element("section")?;
    document.set_attribute(node, "id", "root")?;
    document.set_style(node, "margin-top", "4px")?;
    document.append_child(body, node)?;
    let target = document.target_of(node).context("section has no target")?;

    // A native read forces the queued commands across first.
    assert_eq!(document.get_attribute(node, "missing"), Ok(None));
    assert_eq!(document.pending_commands(), 0);
    assert_eq!(document.get_element_by_id("root"), Some(node));

    let mut form = FormData::new(Arc::clone(&modules))?;
    form.append("user", "ada")?;
    assert_eq!(form.get_all(), vec![FormDataPart::from(("user", "ada"))]);
    form.release()?;

    drop(document);
    drop(modules);
    let host = server.join().unwrap();
    let tree = host.tree();
    assert_eq!(tree.children_of(TargetId::BODY), &[target]);
    assert_eq!(tree.property(target, "id"), Some("root"));
    assert_eq!(tree.style(target, "marginTop"), Some("4px"));
    Ok(())
}
