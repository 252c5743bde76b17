//! Tests for the channel transport.
//!
//! The native mirror runs on its own thread, the way an embedder would host
//! it, while the test thread plays the object model.

use std::thread;

use bridge::{
    BridgeConfig, BridgeError, ModuleBridge, NativeBridge, NativeHost, NativeValue, TargetId,
    UiCommand, channel,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reads issued after a mutation observe it: the channel preserves order.
#[test]
fn reads_observe_earlier_mutations() {
    init_logging();
    let (mut bridge, mut mirror) = channel(NativeHost::new(&BridgeConfig::default()));
    let server = thread::spawn(move || {
        mirror.serve_blocking();
        mirror.into_host()
    });

    bridge
        .apply(vec![
            UiCommand::CreateElement { target: TargetId(2), tag: String::from("DIV") },
            UiCommand::SetProperty {
                target: TargetId(2),
                name: String::from("title"),
                value: String::from("hello"),
            },
        ])
        .unwrap();
    let title = bridge.get_property(TargetId(2), "title").unwrap();
    assert_eq!(title, NativeValue::from("hello"));

    bridge.method(TargetId(2), "click", Vec::new()).unwrap();
    drop(bridge);

    let host = server.join().unwrap();
    assert_eq!(host.tree().clicks(TargetId(2)), 1);
}

/// Native failures travel back to the caller unchanged.
#[test]
fn native_errors_are_returned_to_the_caller() {
    init_logging();
    let (mut bridge, mut mirror) = channel(NativeHost::new(&BridgeConfig::default()));
    let server = thread::spawn(move || mirror.serve_blocking());

    let missing = bridge.get_property(TargetId(40), "title");
    assert_eq!(missing, Err(BridgeError::UnknownTarget(TargetId(40))));

    let module = bridge.invoke_module("Nope", "init", Vec::new());
    assert_eq!(module, Err(BridgeError::UnknownModule(String::from("Nope"))));

    drop(bridge);
    server.join().unwrap();
}

/// Module calls from several clones reach the same registry.
#[test]
fn clones_share_one_native_host() {
    init_logging();
    let (mut first, mut mirror) = channel(NativeHost::new(&BridgeConfig::default()));
    let mut second = first.clone();
    let server = thread::spawn(move || mirror.serve_blocking());

    let handle = first.invoke_module("FormData", "init", Vec::new()).unwrap();
    second
        .invoke_module(
            "FormData",
            "append",
            vec![handle.clone(), NativeValue::from("k"), NativeValue::from("v")],
        )
        .unwrap();
    let has = first
        .invoke_module("FormData", "has", vec![handle, NativeValue::from("k")])
        .unwrap();
    assert_eq!(has, NativeValue::Boolean(true));

    drop(first);
    drop(second);
    server.join().unwrap();
}
