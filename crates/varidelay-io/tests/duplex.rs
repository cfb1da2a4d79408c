//! Duplex stream tests against a backend whose callbacks are driven by hand.
//!
//! No audio hardware is touched: the backend records the stream
//! configurations it was asked for and keeps the callbacks so each test can
//! play the role of the driver.

use std::sync::Mutex;

use varidelay_core::{
    ControlMessage, ControlTarget, ParamSnapshot, Session, SessionDescriptor, control_queue,
};
use varidelay_io::{
    AudioBackend, AudioDevice, BackendStreamConfig, DeviceSelection, DuplexStream, ErrorCallback,
    InputCallback, OutputCallback, Result, StreamHandle,
};

#[derive(Default)]
struct ManualBackend {
    output: Mutex<Option<OutputCallback>>,
    input: Mutex<Option<InputCallback>>,
    errors: Mutex<Vec<ErrorCallback>>,
    configs: Mutex<Vec<BackendStreamConfig>>,
}

impl ManualBackend {
    fn capture(&self, samples: &[f32]) {
        let mut input = self.input.lock().unwrap();
        (input.as_mut().expect("no input stream"))(samples);
    }

    fn render(&self, buffer: &mut [f32]) {
        let mut output = self.output.lock().unwrap();
        (output.as_mut().expect("no output stream"))(buffer);
    }

    fn fail(&self, msg: &str) {
        for cb in self.errors.lock().unwrap().iter_mut() {
            cb(msg);
        }
    }
}

impl AudioBackend for ManualBackend {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(Vec::new())
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        self.configs.lock().unwrap().push(config.clone());
        *self.output.lock().unwrap() = Some(callback);
        self.errors.lock().unwrap().push(error_callback);
        Ok(StreamHandle::new(()))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        self.configs.lock().unwrap().push(config.clone());
        *self.input.lock().unwrap() = Some(callback);
        self.errors.lock().unwrap().push(error_callback);
        Ok(StreamHandle::new(()))
    }
}

fn descriptor(input_channels: usize) -> SessionDescriptor {
    SessionDescriptor {
        sample_rate: 48000.0,
        block_size: 64,
        input_channels,
        output_channels: 2,
        max_delay_seconds: 0.5,
        ..SessionDescriptor::default()
    }
}

const ONE_SAMPLE: ParamSnapshot = ParamSnapshot {
    delay: 0.0,
    feedback: 0.0,
    coefficient: 1.0,
};

#[test]
fn requests_configured_formats_and_devices() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::new(d).unwrap();
    let devices = DeviceSelection {
        input: Some("Mic".into()),
        output: None,
    };
    let stream = DuplexStream::start(&backend, &d, &devices, session.into_dispatcher(None)).unwrap();
    assert!(stream.has_input());

    let configs = backend.configs.lock().unwrap().clone();
    assert_eq!(
        configs,
        vec![
            BackendStreamConfig {
                sample_rate: 48000,
                buffer_size: 64,
                channels: 1,
                device_name: Some("Mic".into()),
            },
            BackendStreamConfig {
                sample_rate: 48000,
                buffer_size: 64,
                channels: 2,
                device_name: None,
            },
        ]
    );
}

#[test]
fn captured_input_reaches_every_output_channel() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::with_params(d, ONE_SAMPLE).unwrap();
    let stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(None),
    )
    .unwrap();

    let mut block = [0.0f32; 64];
    block[0] = 1.0;
    block[10] = -0.5;
    backend.capture(&block);

    let mut out = [0.0f32; 128];
    backend.render(&mut out);
    // one-sample lag at zero delay
    assert_eq!(&out[2..4], &[1.0, 1.0]);
    assert_eq!(&out[22..24], &[-0.5, -0.5]);
    assert_eq!(stream.xrun_count(), 0);
}

#[test]
fn oversized_host_buffer_consumes_all_captured_input() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::with_params(d, ONE_SAMPLE).unwrap();
    let stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(None),
    )
    .unwrap();

    // Six blocks in one callback, more than one scratch buffer's worth.
    let mut captured = [0.0f32; 6 * 64];
    captured[10] = 0.5;
    captured[300] = 1.0;
    backend.capture(&captured);

    let mut out = [0.0f32; 6 * 64 * 2];
    backend.render(&mut out);
    assert_eq!(&out[22..24], &[0.5, 0.5]);
    assert_eq!(&out[602..604], &[1.0, 1.0]);
    assert_eq!(stream.xrun_count(), 0);

    // Nothing left over to shift the next callback.
    let mut next = [0.0f32; 128];
    backend.capture(&[0.0; 64]);
    backend.render(&mut next);
    assert!(next.iter().all(|&x| x == 0.0));
    assert_eq!(stream.xrun_count(), 0);
}

#[test]
fn missing_input_is_silence_and_counted() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::with_params(d, ONE_SAMPLE).unwrap();
    let stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(None),
    )
    .unwrap();

    let mut out = [9.0f32; 128];
    backend.render(&mut out);
    assert!(out.iter().all(|&x| x == 0.0));
    assert_eq!(stream.xrun_count(), 1);
}

#[test]
fn output_only_session_opens_no_input() {
    let backend = ManualBackend::default();
    let d = descriptor(0);
    let session = Session::new(d).unwrap();
    let stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(None),
    )
    .unwrap();
    assert!(!stream.has_input());
    assert!(backend.input.lock().unwrap().is_none());

    let mut out = [1.0f32; 128];
    backend.render(&mut out);
    assert!(out.iter().all(|&x| x == 0.0));
    assert_eq!(stream.xrun_count(), 0);
}

#[test]
fn controls_flow_into_running_stream() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::new(d).unwrap();
    let params = session.params();
    let (mut tx, rx) = control_queue(8);
    let _stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(Some(rx)),
    )
    .unwrap();

    tx.send(ControlMessage::new(ControlTarget::Feedback, 0.25));
    assert_eq!(params.snapshot().feedback, 0.0);
    backend.capture(&[0.0; 64]);
    backend.render(&mut [0.0; 128]);
    assert_eq!(params.snapshot().feedback, 0.25);
}

#[test]
fn backend_errors_are_counted() {
    let backend = ManualBackend::default();
    let d = descriptor(1);
    let session = Session::new(d).unwrap();
    let stream = DuplexStream::start(
        &backend,
        &d,
        &DeviceSelection::default(),
        session.into_dispatcher(None),
    )
    .unwrap();
    backend.fail("device unplugged");
    assert_eq!(stream.error_count(), 2, "one per direction");
    stream.stop();
}
