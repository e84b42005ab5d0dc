//! Reuse decisions: kind gating, same-content swaps and rotations.

mod common;

use bridge_desktop::StdFileAccessor;
use common::{engine, node, GatedClient};
use core_playback::{
    FingerprintEngine, PlaybackContext, PreloadOutcome, PreloadScheduler, PreloadState, ReuseController,
    ReuseOutcome, SourceDescriptor, SourceKind,
};
use core_runtime::events::{ContextEvent, CoreEvent, EventBus};
use std::sync::Arc;

#[cfg(unix)]
#[test]
fn test_file_uri_of_same_file_keeps_progress() {
    let dir = std::env::temp_dir().join(format!("playback reuse {}", uuid::Uuid::new_v4()));
    std::fs::create_dir(&dir).unwrap();
    let path = dir.join("road trip.mp4");
    std::fs::write(&path, vec![9u8; 256]).unwrap();

    let reuse = ReuseController::new(FingerprintEngine::new(Arc::new(StdFileAccessor::new())));
    let mut ctx = PlaybackContext::for_file(path.clone(), reuse.engine());
    ctx.mark_played_once();

    let uri = format!("file://{}", path.display().to_string().replace(' ', "%20"));
    let outcome = reuse
        .reuse(&mut ctx, SourceDescriptor::local_file(uri))
        .unwrap();

    assert_eq!(outcome, ReuseOutcome::SameContent);
    assert!(ctx.has_played_once_before());

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_file_context_refuses_node() {
    let reuse = ReuseController::new(engine());
    let mut ctx = PlaybackContext::for_file("/a.mp4", reuse.engine());
    ctx.mark_played_once();
    let fingerprint = ctx.fingerprint().copied();

    let accepted = reuse.try_reuse_with_node(&mut ctx, node(1, "cfp-x"), false, GatedClient::open());

    assert!(!accepted);
    assert_eq!(ctx.kind(), SourceKind::LocalFile);
    assert_eq!(ctx.fingerprint().copied(), fingerprint);
    assert!(ctx.has_played_once_before());
    assert_eq!(
        ctx.descriptor().locator().map(|l| l.as_str()),
        Some("/a.mp4")
    );
}

#[test]
fn test_node_context_refuses_file() {
    let reuse = ReuseController::new(engine());
    let mut ctx = PlaybackContext::for_node(node(1, "cfp-x"), false, GatedClient::open(), reuse.engine());

    assert!(!reuse.try_reuse_with_file(&mut ctx, "/a.mp4"));
    assert_eq!(ctx.kind(), SourceKind::RemoteNode);
}

#[test]
fn test_same_node_via_folder_link_keeps_progress() {
    let reuse = ReuseController::new(engine());
    let client = GatedClient::open();
    let mut ctx = PlaybackContext::for_node(node(1, "cfp-x"), false, client.clone(), reuse.engine());
    ctx.mark_played_once();

    assert!(reuse.try_reuse_with_node(&mut ctx, node(1, "cfp-x"), true, client));

    assert!(ctx.has_played_once_before());
    assert!(ctx
        .descriptor()
        .access()
        .is_some_and(|access| access.is_folder_link()));
}

#[test]
fn test_reuse_is_idempotent() {
    let reuse = ReuseController::new(engine());
    let client = GatedClient::open();
    let mut ctx = PlaybackContext::for_node(node(1, "cfp-x"), false, client.clone(), reuse.engine());

    assert!(reuse.try_reuse_with_node(&mut ctx, node(2, "cfp-y"), false, client.clone()));
    ctx.mark_played_once();
    let fingerprint = ctx.fingerprint().copied();

    let again = reuse
        .reuse(
            &mut ctx,
            SourceDescriptor::remote_node(node(2, "cfp-y"), false, client),
        )
        .unwrap();

    assert_eq!(again, ReuseOutcome::SameContent);
    assert_eq!(ctx.fingerprint().copied(), fingerprint);
    assert!(ctx.has_played_once_before());
}

#[test]
fn test_node_without_fingerprint_always_rotates() {
    let reuse = ReuseController::new(engine());
    let client = GatedClient::open();
    let bare = || bridge_traits::MediaNode::new(bridge_traits::NodeHandle(3), "bare.mp4");
    let mut ctx = PlaybackContext::for_node(bare(), false, client.clone(), reuse.engine());
    ctx.mark_played_once();
    ctx.set_end_playing(true);

    assert!(reuse.try_reuse_with_node(&mut ctx, bare(), false, client));

    assert!(!ctx.has_played_once_before());
    assert!(!ctx.is_end_playing());
}

#[test]
fn test_reuse_events() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let reuse = ReuseController::new(engine()).with_event_bus(bus);
    let mut ctx = PlaybackContext::for_file("/a.mp4", reuse.engine());

    reuse.try_reuse_with_file(&mut ctx, "/copy-of-a.mp4");
    reuse.try_reuse_with_file(&mut ctx, "/b.mp4");
    reuse.try_reuse_with_node(&mut ctx, node(1, "cfp-x"), false, GatedClient::open());

    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Context(ContextEvent::Reused {
            kind: "local_file".to_string(),
            content_changed: false,
        })
    );
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Context(ContextEvent::Reused {
            kind: "local_file".to_string(),
            content_changed: true,
        })
    );
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Context(ContextEvent::ReuseRefused {
            expected: "local_file".to_string(),
            found: "remote_node".to_string(),
        })
    );
}

#[core_async::test]
async fn test_different_node_resets_flags_and_discards_preload() {
    let reuse = ReuseController::new(engine());
    let scheduler = PreloadScheduler::current().unwrap();
    let client = GatedClient::gated();

    let mut ctx = PlaybackContext::for_node(node(1, "cfp-x"), false, client.clone(), reuse.engine());
    ctx.mark_played_once();
    let handle = scheduler.schedule(&ctx).unwrap();
    let PreloadState::InFlight(token) = ctx.preload_state() else {
        panic!("expected an in-flight preload");
    };

    let outcome = reuse
        .reuse(
            &mut ctx,
            SourceDescriptor::remote_node(node(2, "cfp-y"), false, client.clone()),
        )
        .unwrap();

    assert_eq!(
        outcome,
        ReuseOutcome::ContentChanged {
            cancelled_preload: Some(token)
        }
    );
    assert!(!ctx.has_played_once_before());
    assert_eq!(ctx.preload_state(), PreloadState::Idle);

    client.release(1);
    assert_eq!(handle.await.unwrap(), PreloadOutcome::Discarded(token));
    assert_eq!(ctx.preload_state(), PreloadState::Idle);
    assert!(ctx.preloaded_url().is_none());
}

#[core_async::test]
async fn test_same_content_reuse_keeps_completed_preload() {
    let reuse = ReuseController::new(engine());
    let scheduler = PreloadScheduler::current().unwrap();
    let client = GatedClient::open();

    let mut ctx = PlaybackContext::for_node(node(1, "cfp-x"), false, client.clone(), reuse.engine());
    let handle = scheduler.schedule(&ctx).unwrap();
    assert!(matches!(handle.await.unwrap(), PreloadOutcome::Completed(_)));

    assert!(reuse.try_reuse_with_node(&mut ctx, node(1, "cfp-x"), true, client.clone()));

    assert!(matches!(ctx.preload_state(), PreloadState::Completed(_)));
    assert!(ctx.preloaded_url().is_some());
    // Completed for this content: nothing to schedule.
    assert!(scheduler.schedule(&ctx).is_none());
    assert_eq!(client.resolves(), 1);
}
