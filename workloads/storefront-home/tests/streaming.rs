mod common;

use std::time::Duration;

use common::*;
use edge_core::{LoadPhase, Locale, RequestContext, TimingContext, WorkloadError};
use edge_streaming::StreamingSink;
use futures::channel::{mpsc, oneshot};
use futures::StreamExt;
use storefront_home::{
    home_shell, loader, render_page, stream_page, LoadError, PageTrace, StreamOutcome,
};

type TestSink = StreamingSink<mpsc::UnboundedSender<Vec<u8>>, mpsc::SendError>;

fn trace() -> PageTrace {
    let mut trace = PageTrace::new(&RequestContext::new("/"));
    trace.critical_resolved().unwrap();
    trace
}

async fn next_chunk(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> Option<String> {
    rx.next()
        .await
        .map(|chunk| String::from_utf8(chunk).unwrap())
}

#[tokio::test]
async fn initial_response_precedes_the_patch() {
    let (recommended, release) = Reply::gated();
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, recommended)
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    let render = tokio::spawn(async move {
        let mut trace = trace();
        let shell = home_shell(&Locale::default());
        let result = render_page(page, &shell, &mut sink, &mut trace).await;
        (result, trace, sink)
    });

    // Shell, featured collection, then the section holding the fallback.
    let shell = next_chunk(&mut rx).await.unwrap();
    assert!(shell.starts_with("<!DOCTYPE html>"));
    assert!(shell.contains("function $swap"));
    let featured = next_chunk(&mut rx).await.unwrap();
    assert!(featured.contains(r#"href="/collections/featured""#));
    let section = next_chunk(&mut rx).await.unwrap();
    assert!(section.contains(r#"<div id="b:recommended-products""#));
    assert_eq!(section.matches("product-card--skeleton").count(), 4);

    // Nothing more until the deferred data arrives.
    assert!(
        tokio::time::timeout(Duration::from_millis(50), rx.next())
            .await
            .is_err()
    );

    release.send(Ok(products_json(&["p1", "p2"]))).unwrap();
    let patch = next_chunk(&mut rx).await.unwrap();
    assert!(patch.starts_with(r#"<template id="p:recommended-products">"#));
    assert!(patch.contains(r#"$swap("recommended-products")"#));
    assert!(patch.find("/products/p1").unwrap() < patch.find("/products/p2").unwrap());
    assert!(patch.contains(r#"<script type="application/json" data-deferred="recommended-products">"#));
    assert!(patch.contains(r#""id":"p1""#));

    let closing = next_chunk(&mut rx).await.unwrap();
    assert!(closing.ends_with("</html>"));
    assert!(next_chunk(&mut rx).await.is_none());

    let (result, trace, sink) = render.await.unwrap();
    result.unwrap();
    assert_eq!(trace.lifecycle.phase(), LoadPhase::DeferredResolved);
    assert!(sink.patch_sent("recommended-products"));
    assert_eq!(
        sink.timing()
            .happened_before("shell_sent", "patch_recommended-products_sent"),
        Some(true)
    );
}

#[tokio::test]
async fn unavailable_recommendations_patch_an_empty_grid() {
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, Reply::Error(timeout_error))
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, rx) = mpsc::unbounded();
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    let mut trace = trace();
    render_page(page, &home_shell(&Locale::default()), &mut sink, &mut trace)
        .await
        .unwrap();
    drop(sink);

    let chunks: Vec<String> = rx
        .map(|chunk| String::from_utf8(chunk).unwrap())
        .collect()
        .await;
    let patch = chunks
        .iter()
        .find(|chunk| chunk.starts_with("<template"))
        .unwrap();
    assert!(patch.contains(r#"<div class="recommended-products-grid"></div>"#));
    assert!(patch.contains(r#"data-deferred="recommended-products">null</script>"#));
    assert_eq!(trace.lifecycle.phase(), LoadPhase::DeferredUnavailable);
}

#[tokio::test]
async fn missing_collection_omits_the_featured_section() {
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(no_collections_json()))
        .reply(RECOMMENDED, Reply::Data(products_json(&["p1"])))
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, rx) = mpsc::unbounded();
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    render_page(page, &home_shell(&Locale::default()), &mut sink, &mut trace())
        .await
        .unwrap();

    assert_eq!(sink.sections_sent(), &["recommended-products".to_string()]);
    drop(sink);
    let body: String = rx
        .map(|chunk| String::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .await
        .concat();
    assert!(!body.contains("featured-collection"));
    assert!(body.contains("/products/p1"));
}

#[tokio::test]
async fn disconnected_client_ends_the_render_quietly() {
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, Reply::Data(products_json(&["p1"])))
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, rx) = mpsc::unbounded();
    drop(rx);
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    let err = render_page(page, &home_shell(&Locale::default()), &mut sink, &mut trace())
        .await
        .unwrap_err();

    match err {
        LoadError::Stream(e) => assert!(e.is_disconnect()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reader_leaving_mid_stream_abandons_the_deferred_load() {
    let (hang, dropped) = Reply::hang();
    let (scripted, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, hang)
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, mut rx) = mpsc::unbounded();
    let (mut reader, reader_guard) = oneshot::channel::<()>();
    let render = tokio::spawn(async move {
        let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
        let mut trace = trace();
        let shell = home_shell(&Locale::default());
        let outcome = stream_page(page, &shell, &mut sink, &mut trace, reader.cancellation()).await;
        (outcome, trace)
    });

    // Shell, featured collection and the fallback section are out.
    for _ in 0..3 {
        next_chunk(&mut rx).await.unwrap();
    }
    tokio::time::timeout(Duration::from_secs(1), async {
        while scripted.call_count(RECOMMENDED) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();

    drop(rx);
    drop(reader_guard);

    let (outcome, trace) = tokio::time::timeout(Duration::from_secs(1), render)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, StreamOutcome::Disconnected));
    assert_eq!(outcome.status_code(), None);
    assert_eq!(trace.lifecycle.phase(), LoadPhase::CriticalResolved);

    let closed = tokio::time::timeout(Duration::from_secs(1), dropped).await;
    assert!(matches!(closed, Ok(Err(_))));
}

#[tokio::test]
async fn stream_page_completes_while_the_reader_stays() {
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, Reply::Data(products_json(&["p1"])))
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, rx) = mpsc::unbounded();
    let (mut reader, _reader_guard) = oneshot::channel::<()>();
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    let mut trace = trace();
    let outcome = stream_page(
        page,
        &home_shell(&Locale::default()),
        &mut sink,
        &mut trace,
        reader.cancellation(),
    )
    .await;

    assert!(matches!(outcome, StreamOutcome::Completed));
    assert_eq!(outcome.status_code(), Some(200));
    drop(sink);
    let body: String = rx
        .map(|chunk| String::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .await
        .concat();
    assert!(body.contains("/products/p1"));
}

#[tokio::test]
async fn rendering_requires_resolved_critical_data() {
    let (_, client) = ScriptedClient::new()
        .reply(FEATURED, Reply::Data(collection_json("c1", "Featured")))
        .reply(RECOMMENDED, Reply::Data(products_json(&[])))
        .into_client();
    let page = loader(&client, &query_ctx()).await.unwrap();

    let (tx, _rx) = mpsc::unbounded();
    let mut sink: TestSink = StreamingSink::new(tx, TimingContext::new());
    // Still `Pending`: the deferred transition is illegal.
    let mut trace = PageTrace::new(&RequestContext::new("/"));
    let err = render_page(page, &home_shell(&Locale::default()), &mut sink, &mut trace)
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Lifecycle(_)));
    assert!(matches!(
        sink.send_shell("again").await,
        Err(WorkloadError::ShellAlreadySent)
    ));
}
