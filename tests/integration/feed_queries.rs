//! Query engine: descriptor lifecycle, pagination, ordering guarantees.

use std::sync::atomic::Ordering;
use std::time::Duration;

use quill::effect::Effect;
use quill::model::LoadingState;
use quill::query::{Filters, SelectionType};

use crate::integration::test_utils::{
    article_list, client_with, identity, MockTransport, ScriptedList,
};

#[tokio::test(start_paused = true)]
async fn fetch_cycle_publishes_results_and_page_count() {
    let transport = MockTransport::new();
    transport.script_list("", ScriptedList::immediate(article_list("global", 10, 21)));
    let (client, _store) = client_with(transport);

    let feed = client.article_feed();
    assert_eq!(feed.loading(), LoadingState::NotLoaded);

    feed.set_query(SelectionType::All, Filters::default());
    assert_eq!(feed.loading(), LoadingState::Loading);

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(feed.loading(), LoadingState::Loaded);
    assert_eq!(feed.results().len(), 10);
    assert_eq!(feed.page_count(), 3);
    assert_eq!(feed.page_numbers(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn slow_superseded_fetch_never_overrides_the_latest() {
    let transport = MockTransport::new();
    transport.script_list(
        "",
        ScriptedList::delayed(Duration::from_millis(500), article_list("slow", 5, 5)),
    );
    transport.script_list(
        "rust",
        ScriptedList::delayed(Duration::from_millis(10), article_list("fast", 2, 2)),
    );
    let (client, _store) = client_with(transport.clone());

    let feed = client.article_feed();
    feed.set_query(SelectionType::All, Filters::default());
    tokio::task::yield_now().await;
    feed.set_query(
        SelectionType::ByTag,
        Filters {
            tag: Some("rust".to_string()),
            ..Filters::default()
        },
    );

    // Let both responses resolve; the slow one arrives last.
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(transport.list_calls.load(Ordering::SeqCst), 2);
    let slugs: Vec<String> = feed.results().into_iter().map(|a| a.slug).collect();
    assert_eq!(slugs, vec!["fast-0", "fast-1"]);
    assert_eq!(feed.loading(), LoadingState::Loaded);
    assert_eq!(feed.page_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn set_page_keeps_filters_and_moves_the_offset() {
    let transport = MockTransport::new();
    transport.script_list("rust", ScriptedList::immediate(article_list("tagged", 10, 30)));
    let (client, _store) = client_with(transport.clone());

    let feed = client.article_feed();
    feed.set_query(
        SelectionType::ByTag,
        Filters {
            tag: Some("rust".to_string()),
            ..Filters::default()
        },
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    feed.set_page(3);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let seen = transport.seen_queries.lock().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].offset, 0);
    assert_eq!(seen[1].offset, 20);
    assert_eq!(seen[1].tag.as_deref(), Some("rust"));
    assert_eq!(feed.current_page(), 3);
}

#[tokio::test(start_paused = true)]
async fn new_query_resets_the_page_to_one() {
    let transport = MockTransport::new();
    transport.script_list("", ScriptedList::immediate(article_list("global", 10, 40)));
    transport.script_list("rust", ScriptedList::immediate(article_list("tagged", 10, 40)));
    let (client, _store) = client_with(transport.clone());

    let feed = client.article_feed();
    feed.set_query(SelectionType::All, Filters::default());
    tokio::time::sleep(Duration::from_millis(10)).await;
    feed.set_page(4);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(feed.current_page(), 4);

    feed.set_query(
        SelectionType::ByTag,
        Filters {
            tag: Some("rust".to_string()),
            ..Filters::default()
        },
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(feed.current_page(), 1);
    let seen = transport.seen_queries.lock().clone();
    assert_eq!(seen.last().unwrap().offset, 0);
}

#[tokio::test]
async fn feed_while_anonymous_redirects_instead_of_fetching() {
    let transport = MockTransport::new();
    let (client, _store) = client_with(transport.clone());
    let mut effects = client.effects();

    let feed = client.article_feed();
    feed.set_query(SelectionType::Feed, Filters::default());

    assert_eq!(effects.next().await, Some(Effect::NavigateToLogin));
    assert_eq!(transport.feed_calls.load(Ordering::SeqCst), 0);
    assert_eq!(feed.loading(), LoadingState::NotLoaded);
}

#[tokio::test(start_paused = true)]
async fn feed_while_authenticated_uses_the_feed_endpoint() {
    let transport = MockTransport::new();
    *transport.feed.lock() = Some(ScriptedList::immediate(article_list("feed", 3, 3)));
    let (client, _store) = client_with(transport.clone());
    client
        .session()
        .set_auth(identity("jake", "tok-1"))
        .unwrap();

    let feed = client.article_feed();
    feed.set_query(SelectionType::Feed, Filters::default());
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(transport.feed_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.list_calls.load(Ordering::SeqCst), 0);
    assert_eq!(feed.results().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_leaves_loading_in_place() {
    let transport = MockTransport::new();
    transport.script_list("", ScriptedList::immediate(article_list("global", 5, 5)));
    transport.list_failure.store(true, Ordering::SeqCst);
    let (client, _store) = client_with(transport);

    let feed = client.article_feed();
    feed.set_query(SelectionType::All, Filters::default());
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The spinner is the failure signal: no Loaded, no results.
    assert_eq!(feed.loading(), LoadingState::Loading);
    assert!(feed.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn tag_sidebar_loads_the_popular_tags() {
    let transport = MockTransport::new();
    *transport.tags.lock() = vec!["rust".to_string(), "dragons".to_string()];
    let (client, _store) = client_with(transport);

    let tags = client.tag_list();
    assert_eq!(tags.loading(), LoadingState::NotLoaded);
    tags.load();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(tags.loading(), LoadingState::Loaded);
    assert_eq!(tags.tags(), vec!["rust", "dragons"]);
}
