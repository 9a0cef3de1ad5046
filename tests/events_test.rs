//! Tests for ordered event delivery between producer threads and the
//! consuming context

use crabshot::events::{CameraEvent, EventChannel, EventListener};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

struct Recorder {
    seen: Arc<Mutex<Vec<CameraEvent>>>,
}

impl EventListener for Recorder {
    fn on_event(&mut self, event: CameraEvent) {
        self.seen.lock().unwrap().push(event);
    }
}

#[test]
fn test_struct_listener_receives_each_event_once() {
    let mut channel = EventChannel::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    channel.set_listener(Recorder { seen: seen.clone() });
    assert!(channel.has_listener());

    let emitter = channel.emitter();
    emitter.emit(CameraEvent::DeviceConfigured);
    emitter.emit(CameraEvent::PreviewStarted);
    assert_eq!(channel.dispatch_pending(), 2);
    assert_eq!(channel.dispatch_pending(), 0);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![CameraEvent::DeviceConfigured, CameraEvent::PreviewStarted]
    );
}

#[test]
fn test_events_survive_listener_swap() {
    let mut channel = EventChannel::new();
    let emitter = channel.emitter();
    emitter.emit(CameraEvent::StartRecording);

    channel.clear_listener();
    assert_eq!(channel.dispatch_pending(), 0);

    let seen = Arc::new(Mutex::new(Vec::new()));
    channel.set_listener(Recorder { seen: seen.clone() });
    emitter.emit(CameraEvent::PauseRecording);
    assert_eq!(channel.dispatch_pending(), 2);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![CameraEvent::StartRecording, CameraEvent::PauseRecording]
    );
}

#[test]
fn test_order_kept_across_producer_handoff() {
    let channel = EventChannel::new();
    let worker = channel.emitter();
    let main = channel.emitter();

    main.emit(CameraEvent::DeviceConfigured);
    thread::spawn(move || {
        worker.emit(CameraEvent::PreviewStarted);
        worker.emit(CameraEvent::ShotFinished {
            path: PathBuf::from("a.jpg"),
        });
    })
    .join()
    .unwrap();
    main.emit(CameraEvent::PreviewStopped);

    assert_eq!(
        channel.drain(),
        vec![
            CameraEvent::DeviceConfigured,
            CameraEvent::PreviewStarted,
            CameraEvent::ShotFinished {
                path: PathBuf::from("a.jpg")
            },
            CameraEvent::PreviewStopped,
        ]
    );
    assert_eq!(channel.pending(), 0);
}

#[test]
fn test_recv_timeout_wakes_on_emit() {
    let channel = EventChannel::new();
    let emitter = channel.emitter();
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        emitter.emit(CameraEvent::ZoomChanged { zoom: 2.0 });
    });

    let event = channel.recv_timeout(Duration::from_secs(2));
    producer.join().unwrap();
    assert_eq!(event, Some(CameraEvent::ZoomChanged { zoom: 2.0 }));
    assert!(channel.try_recv().is_none());
}

#[test]
fn test_event_json_shape() {
    let json = serde_json::to_value(CameraEvent::FinishRecording {
        path: PathBuf::from("clip.mp4"),
    })
    .unwrap();
    assert_eq!(json["event"], "finish_recording");
    assert_eq!(json["path"], "clip.mp4");

    let json = serde_json::to_value(CameraEvent::FocusStarted { x: 1.0, y: 2.0 }).unwrap();
    assert_eq!(json["event"], "focus_started");
}
