use std::rc::Rc;
use std::thread;
use std::time::Duration;

use viewport_media::{
    BreakpointTable, DeliveryError, MediaConfig, MediaError, MediaEvaluator, MediaEvent,
    MediaService, ScriptedEnvironment,
};

const QUERY: &str = "(max-width: 767px)";

fn service(stream_capacity: usize) -> (Rc<ScriptedEnvironment>, MediaService) {
    let env = Rc::new(ScriptedEnvironment::new());
    let config = MediaConfig {
        breakpoints: BreakpointTable::from_pairs([("mobile", QUERY)]).unwrap(),
        stream_capacity,
        ..MediaConfig::default()
    };
    let evaluator: Rc<dyn MediaEvaluator> = env.clone();
    (env, MediaService::new(config, Some(evaluator)))
}

#[test]
fn stream_receives_one_event_per_flush() {
    let (env, media) = service(8);
    let stream = media.stream();

    env.set_matches(QUERY, true);
    env.set_matches(QUERY, false);
    env.set_matches(QUERY, true);
    assert!(media.flush());

    let events = stream.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].sequence, 1);

    env.set_matches(QUERY, false);
    assert!(media.flush());
    assert_eq!(stream.try_recv().unwrap().sequence, 2);
    assert_eq!(
        stream.try_recv().unwrap_err(),
        MediaError::Delivery(DeliveryError::Empty)
    );
}

#[test]
fn stream_can_be_consumed_on_another_thread() {
    let (env, media) = service(8);
    let stream = media.stream();

    env.set_matches(QUERY, true);
    media.flush();

    let received = thread::spawn(move || stream.recv_timeout(Duration::from_secs(1)))
        .join()
        .unwrap()
        .unwrap();
    assert_eq!(received.sequence, 1);
    assert_eq!(MediaEvent::NAME, "mediaChanged");
}

#[test]
fn slow_stream_drops_events_without_blocking() {
    let (env, media) = service(1);
    let stream = media.stream();

    env.set_matches(QUERY, true);
    assert!(media.flush());
    env.set_matches(QUERY, false);
    assert!(media.flush());

    assert_eq!(stream.len(), 1);
    assert_eq!(media.dropped_events(), 1);
}

#[test]
fn dropped_stream_is_pruned() {
    let (env, media) = service(8);
    let stream = media.stream();
    assert_eq!(media.subscriber_count(), 1);
    stream.unsubscribe();

    env.set_matches(QUERY, true);
    assert!(media.flush());
    assert_eq!(media.subscriber_count(), 0);
    assert_eq!(media.dropped_events(), 0);
}

#[test]
fn teardown_disconnects_streams() {
    let (env, media) = service(8);
    let stream = media.stream();

    env.set_matches(QUERY, true);
    media.teardown();

    assert_eq!(
        stream.recv().unwrap_err(),
        MediaError::Delivery(DeliveryError::Disconnected)
    );

    let late = media.stream();
    assert!(late.recv_timeout(Duration::from_millis(10)).unwrap_err().is_delivery());
    assert_eq!(
        late.try_recv().unwrap_err(),
        MediaError::Delivery(DeliveryError::Disconnected)
    );
}
