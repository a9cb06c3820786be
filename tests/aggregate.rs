//! End-to-end tests of the `Aggregate` service over the in-memory store.

use std::{
    convert::Infallible,
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
};

use decider::{
    ClientId, JsonCodec, LoadError, Repository, StreamEvent, StreamName, StreamOptions,
    aggregate::{
        Command, Event, Happened, RequestError, Service, Snapshotted, State, View, stream_name,
    },
    snapshot::SnapshotPolicy,
    store::{AppendOutcome, EventStore, NonEmpty, Slice, inmemory},
};
use decider_core::{event::EncodedEvent, test::StoreTestExt};

type Store = inmemory::Store<JsonCodec>;

/// Store that counts every read and append passed through to it.
#[derive(Default)]
struct CountingStore {
    inner: Store,
    reads: AtomicUsize,
    appends: AtomicUsize,
}

impl EventStore for CountingStore {
    type Codec = JsonCodec;
    type Error = Infallible;

    fn codec(&self) -> &Self::Codec {
        self.inner.codec()
    }

    fn read_backward<'a>(
        &'a self,
        stream: &'a StreamName,
        before: Option<u64>,
        max_count: usize,
    ) -> impl Future<Output = Result<Slice, Self::Error>> + Send + 'a {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_backward(stream, before, max_count)
    }

    fn append<'a>(
        &'a self,
        stream: &'a StreamName,
        expected_version: u64,
        events: NonEmpty<EncodedEvent>,
    ) -> impl Future<Output = AppendOutcome<Self::Error>> + Send + 'a {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append(stream, expected_version, events)
    }
}

fn service_with(options: StreamOptions) -> Service<Store> {
    let repository = Repository::new(Store::new(JsonCodec))
        .with_options(options)
        .unwrap();
    Service::new(repository)
}

fn service() -> Service<Store> {
    service_with(StreamOptions::default())
}

fn store(service: &Service<Store>) -> &Store {
    service.repository().event_store()
}

fn kinds(service: &Service<Store>, id: &ClientId) -> Vec<String> {
    store(service)
        .events(&stream_name(id))
        .into_iter()
        .map(|e| e.kind)
        .collect()
}

#[tokio::test]
async fn make_it_so_on_fresh_stream_is_sorted() {
    let service = service();
    let id = ClientId::new();

    assert_eq!(service.read(&id).await.unwrap(), View { sorted: false });

    service.execute(&id, Command::MakeItSo).await.unwrap();

    assert_eq!(service.read(&id).await.unwrap(), View { sorted: true });
    assert_eq!(kinds(&service, &id), ["Happened"]);
}

#[tokio::test]
async fn make_it_so_twice_appends_once() {
    let service = service();
    let id = ClientId::new();

    service.execute(&id, Command::MakeItSo).await.unwrap();
    service.execute(&id, Command::MakeItSo).await.unwrap();

    assert_eq!(kinds(&service, &id), ["Happened"]);
    assert_eq!(
        store(&service)
            .current_version(&stream_name(&id))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn load_folds_only_the_tail_after_a_snapshot() {
    let service = service();
    let id = ClientId::new();
    let name = stream_name(&id);

    store(&service)
        .seed_events(
            &name,
            vec![
                Event::from(Happened {}),
                Snapshotted { happened: true }.into(),
                Happened {}.into(),
            ],
        )
        .await
        .unwrap();

    let loaded = service
        .repository()
        .resolve::<State>(name)
        .load()
        .await
        .unwrap();

    assert_eq!(loaded.state, State { happened: true });
    assert_eq!(loaded.version, 3);
    assert_eq!(loaded.events_since_origin, 1);
    assert_eq!(service.read(&id).await.unwrap(), View { sorted: true });
}

#[tokio::test]
async fn backward_scan_stops_at_origin_across_pages() {
    let service = service_with(StreamOptions::default().with_batch_size(2));
    let id = ClientId::new();
    let name = stream_name(&id);

    // A corrupt event before the snapshot fails the load if it is ever read
    store(&service)
        .inject_encoded(
            &name,
            NonEmpty::singleton(EncodedEvent {
                kind: "Happened".to_string(),
                data: b"garbage".to_vec(),
            }),
        )
        .await
        .unwrap();
    store(&service)
        .seed_events(&name, vec![Event::from(Snapshotted { happened: true })])
        .await
        .unwrap();
    store(&service)
        .inject_encoded(
            &name,
            NonEmpty::from_vec(
                (0..4)
                    .map(|_| EncodedEvent {
                        kind: "Unrelated".to_string(),
                        data: b"{}".to_vec(),
                    })
                    .collect(),
            )
            .unwrap(),
        )
        .await
        .unwrap();

    let loaded = service
        .repository()
        .resolve::<State>(name)
        .load()
        .await
        .unwrap();

    assert_eq!(loaded.state, State { happened: true });
    assert_eq!(loaded.version, 6);
    assert_eq!(loaded.events_since_origin, 0);
}

#[tokio::test]
async fn full_replay_without_origin_spans_pages() {
    let service = service_with(StreamOptions::default().with_batch_size(2));
    let id = ClientId::new();
    let name = stream_name(&id);

    store(&service)
        .seed_events(&name, (0..5).map(|_| Event::from(Happened {})).collect())
        .await
        .unwrap();

    let loaded = service
        .repository()
        .resolve::<State>(name)
        .load()
        .await
        .unwrap();

    assert!(loaded.state.happened);
    assert_eq!(loaded.events_since_origin, 5);
}

#[tokio::test]
async fn malformed_client_id_never_reaches_the_store() {
    let service = Service::new(Repository::new(CountingStore::default()));

    let read = service.read_raw("not-a-guid").await;
    assert!(matches!(read, Err(RequestError::InvalidClientId(_))));

    let executed = service.execute_raw("1234", Command::MakeItSo).await;
    assert!(matches!(executed, Err(RequestError::InvalidClientId(_))));

    let store = service.repository().event_store();
    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    assert_eq!(store.appends.load(Ordering::SeqCst), 0);

    // A valid id goes through the same store
    service
        .execute_raw("6b8f2a3c-1d4e-4f5a-9b0c-7d6e5f4a3b2c", Command::MakeItSo)
        .await
        .unwrap();
    assert!(store.reads.load(Ordering::SeqCst) > 0);
    assert_eq!(store.appends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn raw_entry_points_accept_any_guid_form() {
    let service = service();

    service
        .execute_raw("6b8f2a3c-1d4e-4f5a-9b0c-7d6e5f4a3b2c", Command::MakeItSo)
        .await
        .unwrap();

    let view = service
        .read_raw("6B8F2A3C1D4E4F5A9B0C7D6E5F4A3B2C")
        .await
        .unwrap();
    assert_eq!(view, View { sorted: true });
}

#[tokio::test]
async fn unknown_event_kinds_are_skipped() {
    let service = service();
    let id = ClientId::new();
    let name = stream_name(&id);

    store(&service)
        .inject_encoded(
            &name,
            NonEmpty::singleton(EncodedEvent {
                kind: "Exploded".to_string(),
                data: br#"{"Loudly":true}"#.to_vec(),
            }),
        )
        .await
        .unwrap();

    assert_eq!(service.read(&id).await.unwrap(), View { sorted: false });

    // The unknown event still counts towards the expected version
    service.execute(&id, Command::MakeItSo).await.unwrap();
    assert_eq!(kinds(&service, &id), ["Exploded", "Happened"]);
}

#[tokio::test]
async fn malformed_payload_of_known_kind_fails_the_read() {
    let service = service();
    let id = ClientId::new();
    let name = stream_name(&id);

    store(&service)
        .inject_encoded(
            &name,
            NonEmpty::singleton(EncodedEvent {
                kind: "Snapshotted".to_string(),
                data: b"not json".to_vec(),
            }),
        )
        .await
        .unwrap();

    let decode = match service.read(&id).await {
        Err(LoadError::Decode(decode)) => decode,
        other => panic!("expected a decode error, got {other:?}"),
    };
    assert_eq!(decode.kind, "Snapshotted");
    assert_eq!(decode.index, 0);
    assert_eq!(decode.expected, Event::EVENT_KINDS);

    assert!(service.execute(&id, Command::MakeItSo).await.is_err());
    assert_eq!(kinds(&service, &id), ["Snapshotted"]);
}

#[tokio::test]
async fn always_policy_appends_snapshot_with_each_decision() {
    let service = service_with(StreamOptions::default().with_snapshots(SnapshotPolicy::Always));
    let id = ClientId::new();

    service.execute(&id, Command::MakeItSo).await.unwrap();
    service.execute(&id, Command::MakeItSo).await.unwrap();

    // The second command decided nothing, so nothing (not even a snapshot)
    // was appended
    assert_eq!(kinds(&service, &id), ["Happened", "Snapshotted"]);

    let snapshot = &store(&service).events(&stream_name(&id))[1];
    assert_eq!(snapshot.data, br#"{"Happened":true}"#);

    let loaded = service
        .repository()
        .resolve::<State>(stream_name(&id))
        .load()
        .await
        .unwrap();
    assert_eq!(loaded.events_since_origin, 0);
    assert!(loaded.state.happened);
}

#[tokio::test]
async fn every_n_events_policy_counts_decided_events() {
    let below = service_with(StreamOptions::default().with_snapshots(SnapshotPolicy::EveryNEvents(2)));
    let at = service_with(StreamOptions::default().with_snapshots(SnapshotPolicy::EveryNEvents(1)));
    let id = ClientId::new();

    below.execute(&id, Command::MakeItSo).await.unwrap();
    at.execute(&id, Command::MakeItSo).await.unwrap();

    assert_eq!(kinds(&below, &id), ["Happened"]);
    assert_eq!(kinds(&at, &id), ["Happened", "Snapshotted"]);
}
