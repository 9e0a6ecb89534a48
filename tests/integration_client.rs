//! Facade lifecycle tests against the in-memory transport

mod common;

use common::{Call, MockFactory, SOCKET_ID, wait_for};
use parking_lot::Mutex;
use pusher_realtime_rs::{
    AuthorizerResult, ChannelHooks, ClientStatus, ConnectionState, Member, Pusher, PusherError,
    PusherEvent, PusherHandlers, PusherOptions, TransportEvent,
};
use serde_json::json;
use std::sync::Arc;

async fn connected(handlers: PusherHandlers) -> (Pusher, MockFactory) {
    common::init_tracing();
    let pusher = Pusher::new();
    let mock = MockFactory::new();
    pusher
        .init(PusherOptions::new("app-key"), handlers, mock.factory())
        .await
        .unwrap();
    pusher.connect().await.unwrap();
    assert!(wait_for(|| pusher.connection_state() == ConnectionState::Connected).await);
    (pusher, mock)
}

#[tokio::test]
async fn test_instance_is_process_wide() {
    assert!(std::ptr::eq(Pusher::instance(), Pusher::instance()));
}

#[tokio::test]
async fn test_operations_before_init_fail() {
    let pusher = Pusher::new();

    assert_eq!(pusher.status().await, ClientStatus::Uninitialized);
    assert!(matches!(
        pusher.connect().await,
        Err(PusherError::NotInitialized)
    ));
    assert!(matches!(
        pusher.subscribe("news", ChannelHooks::new()).await,
        Err(PusherError::NotInitialized)
    ));
    assert!(matches!(
        pusher
            .trigger(PusherEvent::new("private-x", "client-a", json!({})))
            .await,
        Err(PusherError::NotInitialized)
    ));
    assert!(matches!(
        pusher.get_socket_id().await,
        Err(PusherError::NotInitialized)
    ));
}

#[tokio::test]
async fn test_second_init_is_rejected_until_reset() {
    let pusher = Pusher::new();
    let mock = MockFactory::new();

    pusher
        .init(PusherOptions::new("app-key"), PusherHandlers::new(), mock.factory())
        .await
        .unwrap();
    assert_eq!(pusher.status().await, ClientStatus::Initialized);

    let second = pusher
        .init(PusherOptions::new("app-key"), PusherHandlers::new(), mock.factory())
        .await;
    assert!(matches!(second, Err(PusherError::AlreadyInitialized)));

    let invalid = pusher
        .init(PusherOptions::default(), PusherHandlers::new(), mock.factory())
        .await;
    assert!(matches!(invalid, Err(PusherError::AlreadyInitialized)));
    assert_eq!(mock.created(), 1);

    pusher.reset().await;
    pusher
        .init(PusherOptions::new("other-key"), PusherHandlers::new(), mock.factory())
        .await
        .unwrap();
    assert_eq!(mock.created(), 2);
    assert_eq!(mock.transport().options.api_key, "other-key");
}

#[tokio::test]
async fn test_configuration_errors() {
    let pusher = Pusher::new();
    let mock = MockFactory::new();

    let both = pusher
        .init(
            PusherOptions {
                auth_endpoint: Some("https://example.com/auth".to_string()),
                ..PusherOptions::new("app-key")
            },
            PusherHandlers::new().on_authorizer(|_, _| async { None }),
            mock.factory(),
        )
        .await;
    assert!(matches!(both, Err(PusherError::Configuration(_))));

    let no_key = pusher
        .init(PusherOptions::default(), PusherHandlers::new(), mock.factory())
        .await;
    assert!(matches!(no_key, Err(PusherError::Configuration(_))));

    let bad_proxy = pusher
        .init(
            PusherOptions {
                proxy: Some("proxy.local".to_string()),
                ..PusherOptions::new("app-key")
            },
            PusherHandlers::new(),
            mock.factory(),
        )
        .await;
    assert!(matches!(bad_proxy, Err(PusherError::Configuration(_))));

    assert_eq!(mock.created(), 0);
    assert!(!pusher.is_initialized().await);
}

#[tokio::test]
async fn test_connection_lifecycle() {
    let states = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&states);
    let handlers = PusherHandlers::new().on_connection_state_change(move |previous, current| {
        seen.lock().push(format!("{previous}->{current}"));
    });

    let (pusher, mock) = connected(handlers).await;
    assert_eq!(pusher.status().await, ClientStatus::Connected);
    assert_eq!(pusher.get_socket_id().await.unwrap().as_deref(), Some(SOCKET_ID));

    // Already connected
    pusher.connect().await.unwrap();
    assert_eq!(mock.transport().count(&Call::Connect), 1);

    pusher.disconnect().await.unwrap();
    assert!(wait_for(|| pusher.connection_state() == ConnectionState::Disconnected).await);
    assert_eq!(pusher.status().await, ClientStatus::Disconnected);

    // Already disconnected
    pusher.disconnect().await.unwrap();
    assert_eq!(mock.transport().count(&Call::Disconnect), 1);

    assert_eq!(
        *states.lock(),
        vec![
            "DISCONNECTED->CONNECTING",
            "CONNECTING->CONNECTED",
            "CONNECTED->DISCONNECTED"
        ]
    );
}

#[tokio::test]
async fn test_watch_connection_state() {
    let pusher = Pusher::new();
    let mock = MockFactory::new();
    pusher
        .init(PusherOptions::new("app-key"), PusherHandlers::new(), mock.factory())
        .await
        .unwrap();

    let mut watcher = pusher.watch_connection_state();
    pusher.connect().await.unwrap();

    let reached = common::within(watcher.wait_for(|state| *state == ConnectionState::Connected))
        .await
        .is_ok();
    assert!(reached);
}

#[tokio::test]
async fn test_subscribe_is_idempotent() {
    let (pusher, mock) = connected(PusherHandlers::new()).await;

    let first = pusher.subscribe("news", ChannelHooks::new()).await.unwrap();
    let second = pusher.subscribe("news", ChannelHooks::new()).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        mock.transport().count(&Call::Subscribe("news".to_string())),
        1
    );
    assert!(Arc::ptr_eq(&pusher.get_channel("news").unwrap(), &first));
}

#[tokio::test]
async fn test_public_subscription_succeeded_reaches_hooks() {
    let global = Arc::new(Mutex::new(Vec::new()));
    let global_seen = Arc::clone(&global);
    let (pusher, _mock) = connected(
        PusherHandlers::new()
            .on_subscription_succeeded(move |channel, data| global_seen.lock().push((channel, data))),
    )
    .await;

    let local = Arc::new(Mutex::new(Vec::new()));
    let local_seen = Arc::clone(&local);
    pusher
        .subscribe(
            "news",
            ChannelHooks::new().on_subscription_succeeded(move |data| local_seen.lock().push(data)),
        )
        .await
        .unwrap();

    assert!(wait_for(|| local.lock().len() == 1).await);
    assert_eq!(*global.lock(), vec![("news".to_string(), json!({}))]);
    assert_eq!(*local.lock(), vec![json!({})]);
}

#[tokio::test]
async fn test_refused_subscription_leaves_no_channel() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&errors);
    let (pusher, mock) = connected(PusherHandlers::new().on_subscription_error(
        move |channel, message, error_type| seen.lock().push((channel, message, error_type)),
    ))
    .await;
    mock.transport().refuse("news");

    let result = pusher.subscribe("news", ChannelHooks::new()).await;

    assert!(matches!(result, Err(PusherError::Subscription { .. })));
    assert!(pusher.get_channel("news").is_none());
    let errors = errors.lock();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "news");
    assert_eq!(errors[0].2, "SubscriptionError");

    drop(errors);
    // A later attempt issues a fresh transport subscribe
    pusher.subscribe("news", ChannelHooks::new()).await.unwrap();
    assert_eq!(
        mock.transport().count(&Call::Subscribe("news".to_string())),
        2
    );
}

#[tokio::test]
async fn test_trigger_validation() {
    let (pusher, mock) = connected(PusherHandlers::new()).await;

    for channel in ["public-x", "news", "private-encrypted-x"] {
        let result = pusher
            .trigger(PusherEvent::new(channel, "client-typing", json!({})))
            .await;
        assert!(
            matches!(result, Err(PusherError::InvalidChannelKind { .. })),
            "{channel} should not accept client events"
        );
    }

    pusher
        .trigger(PusherEvent::new("private-x", "client-typing", json!({"user": "a"})))
        .await
        .unwrap();
    pusher
        .trigger(PusherEvent::new("presence-x", "client-raw", json!("already text")))
        .await
        .unwrap();

    let triggers: Vec<Call> = mock
        .transport()
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Trigger { .. }))
        .collect();
    assert_eq!(
        triggers,
        vec![
            Call::Trigger {
                channel_name: "private-x".to_string(),
                event_name: "client-typing".to_string(),
                data: r#"{"user":"a"}"#.to_string(),
            },
            Call::Trigger {
                channel_name: "presence-x".to_string(),
                event_name: "client-raw".to_string(),
                data: "already text".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_channel_trigger_rejects_foreign_event() {
    let (pusher, mock) = connected(
        PusherHandlers::new().on_authorizer(|_, _| async { Some(AuthorizerResult::new("k:s")) }),
    )
    .await;
    let channel = pusher
        .subscribe("private-chat", ChannelHooks::new())
        .await
        .unwrap();

    let mismatch = channel
        .trigger(PusherEvent::new("private-other", "client-a", json!({})))
        .await;
    assert!(matches!(mismatch, Err(PusherError::ChannelMismatch { .. })));

    channel
        .trigger(PusherEvent::new("private-chat", "client-a", json!({})))
        .await
        .unwrap();
    assert!(mock.transport().calls().contains(&Call::Trigger {
        channel_name: "private-chat".to_string(),
        event_name: "client-a".to_string(),
        data: "{}".to_string(),
    }));
}

#[tokio::test]
async fn test_events_route_to_global_and_channel_hooks() {
    let global = Arc::new(Mutex::new(Vec::new()));
    let global_seen = Arc::clone(&global);
    let (pusher, mock) = connected(
        PusherHandlers::new().on_event(move |event| global_seen.lock().push(event.event_name)),
    )
    .await;

    let local = Arc::new(Mutex::new(Vec::new()));
    let local_seen = Arc::clone(&local);
    pusher
        .subscribe(
            "news",
            ChannelHooks::new().on_event(move |event| local_seen.lock().push(event)),
        )
        .await
        .unwrap();

    mock.transport()
        .emit_event("news", "headline", json!({"title": "hello"}), None);
    mock.transport()
        .emit_event("sport", "score", json!({"home": 1}), None);

    assert!(wait_for(|| local.lock().len() == 1).await);
    assert_eq!(
        local.lock()[0],
        PusherEvent::new("news", "headline", json!({"title": "hello"}))
    );
    assert_eq!(*global.lock(), vec!["headline".to_string()]);
}

#[tokio::test]
async fn test_unsubscribe_drops_channel_and_later_events() {
    let global = Arc::new(Mutex::new(Vec::new()));
    let global_seen = Arc::clone(&global);
    let (pusher, mock) = connected(
        PusherHandlers::new().on_event(move |event| global_seen.lock().push(event.event_name)),
    )
    .await;

    let channel = pusher.subscribe("news", ChannelHooks::new()).await.unwrap();
    channel.unsubscribe().await.unwrap();

    assert!(pusher.get_channel("news").is_none());
    assert_eq!(
        mock.transport().count(&Call::Unsubscribe("news".to_string())),
        1
    );

    // Unknown channel: no transport call
    pusher.unsubscribe("news").await.unwrap();
    assert_eq!(
        mock.transport().count(&Call::Unsubscribe("news".to_string())),
        1
    );

    mock.transport().emit_event("news", "late", json!({}), None);
    mock.transport().emit(TransportEvent::DecryptionFailure {
        event_name: "marker".to_string(),
        reason: "flush".to_string(),
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(global.lock().is_empty());
}

#[tokio::test]
async fn test_presence_membership_through_facade() {
    let added = Arc::new(Mutex::new(Vec::new()));
    let added_seen = Arc::clone(&added);
    let (pusher, mock) = connected(
        PusherHandlers::new()
            .on_authorizer(|_, _| async {
                Some(AuthorizerResult::new("key:sig").with_presence("42", json!({"name": "Alice"})))
            })
            .on_member_added(move |channel, member| added_seen.lock().push((channel, member))),
    )
    .await;

    let channel = pusher
        .subscribe("presence-room", ChannelHooks::new())
        .await
        .unwrap();
    assert!(wait_for(|| channel.me().is_some()).await);

    assert_eq!(channel.me().unwrap(), Member::new("42", json!({"name": "Alice"})));
    assert_eq!(channel.members().len(), 1);

    mock.transport().emit(TransportEvent::MemberAdded {
        channel_name: "presence-room".to_string(),
        user: Member::new("7", json!({"name": "Bob"})),
    });
    assert!(wait_for(|| channel.members().len() == 2).await);
    assert_eq!(added.lock()[0].0, "presence-room");

    mock.transport().emit_event(
        "presence-room",
        "pusher_internal:member_removed",
        json!(r#"{"user_id":"7","user_info":{}}"#),
        None,
    );
    assert!(wait_for(|| channel.member("7").is_none()).await);
    assert_eq!(channel.me().unwrap().user_id, "42");
}

#[tokio::test]
async fn test_subscription_count_through_facade() {
    let (pusher, mock) = connected(PusherHandlers::new()).await;
    let channel = pusher.subscribe("news", ChannelHooks::new()).await.unwrap();

    mock.transport().emit_event(
        "news",
        "pusher:subscription_count",
        json!({"subscription_count": 3}),
        None,
    );

    assert!(wait_for(|| channel.subscription_count() == Some(3)).await);
}

#[tokio::test]
async fn test_transport_error_reaches_on_error() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&errors);
    let (pusher, mock) = connected(
        PusherHandlers::new().on_error(move |message, code, _| seen.lock().push((message, code))),
    )
    .await;
    let channel = pusher.subscribe("news", ChannelHooks::new()).await.unwrap();

    mock.transport().emit(TransportEvent::Error {
        message: "Over capacity".to_string(),
        code: Some(4100),
        error: String::new(),
    });

    assert!(wait_for(|| errors.lock().len() == 1).await);
    assert_eq!(errors.lock()[0], ("Over capacity".to_string(), Some(4100)));
    // Channel state survives connection-level errors
    assert!(Arc::ptr_eq(&pusher.get_channel("news").unwrap(), &channel));
}

#[tokio::test]
async fn test_reset_tears_everything_down() {
    let (pusher, mock) = connected(PusherHandlers::new()).await;
    pusher.subscribe("news", ChannelHooks::new()).await.unwrap();
    pusher.subscribe("sport", ChannelHooks::new()).await.unwrap();
    let transport = mock.transport();

    pusher.reset().await;

    let calls = transport.calls();
    assert!(calls.contains(&Call::Unsubscribe("news".to_string())));
    assert!(calls.contains(&Call::Unsubscribe("sport".to_string())));
    assert_eq!(calls.last(), Some(&Call::Disconnect));
    assert!(pusher.get_channel("news").is_none());
    assert_eq!(pusher.status().await, ClientStatus::Uninitialized);
    assert_eq!(pusher.connection_state(), ConnectionState::Disconnected);
}
