//! End-to-end tests for the control program on the mock bench.
//!
//! Keypad events travel through the keypad task to the dispatcher, so
//! their effects are observed by polling the mock handles.

use std::time::Duration;

use hearth_control::{
    ConsoleCommand, ControlConfig, ControlError, ControlSystem, LoopbackBench, ProgramStatus,
};
use hearth_core::{PortIndex, SourceNumber, ZoneNumber};
use hearth_hardware::mock::{IrCall, MockDigitalOutput, MockIrOutput, MockSerialPort};
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(2);

fn port(n: u8) -> PortIndex {
    PortIndex::new(n).unwrap()
}

fn command(line: &str) -> ConsoleCommand {
    line.parse().unwrap()
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let polled = timeout(WAIT, async {
        while !check() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting for {what}");
}

#[tokio::test]
async fn test_console_cues_loop_back_as_line() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let mut handle = system.start().await.unwrap();

    handle.execute(command("UpPress 1")).await.unwrap();
    handle.execute(command("UpRelease 1")).await.unwrap();
    handle.execute(command("DnPress 1")).await.unwrap();

    let line = timeout(WAIT, handle.recv_line())
        .await
        .expect("no line assembled")
        .unwrap();
    assert_eq!(line.as_bytes(), b"Test transmission, please ignore \n");
    assert_eq!(line.content(), b"Test transmission, please ignore ");

    let com1 = bench.serial(port(1)).unwrap();
    assert_eq!(com1.sent().len(), 3);
    assert_eq!(
        bench.ir(port(1)).unwrap().calls(),
        vec![
            IrCall::Press("UP_ARROW".to_string()),
            IrCall::Release,
            IrCall::Press("DN_ARROW".to_string()),
        ]
    );

    let report = handle.shutdown().await.unwrap();
    assert_eq!(report.lines_emitted, 1);
    assert_eq!(report.faults, 0);
    assert!(report.residual.is_empty());
}

#[tokio::test]
async fn test_keypad_press_and_release() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();
    let output1 = bench.output(port(1)).unwrap().clone();
    let ir = bench.ir(port(1)).unwrap().clone();

    bench.keypad.press(1).await.unwrap();
    eventually("output 1 high", || output1.level()).await;
    assert_eq!(ir.active(), Some("UP_ARROW".to_string()));
    assert_eq!(
        bench.serial(port(1)).unwrap().sent_bytes(),
        b"Test transmission, please ignore"
    );

    bench.keypad.release(1).await.unwrap();
    eventually("output 1 low", || !output1.level()).await;
    eventually("IR released", || ir.active().is_none()).await;
    assert!(!bench.output(port(2)).unwrap().level());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_down_cue_uses_its_own_port() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();
    let output2 = bench.output(port(2)).unwrap().clone();
    let com2 = bench.serial(port(2)).unwrap().clone();

    bench.keypad.tap(2).await.unwrap();
    eventually("output 2 pulsed", || output2.history() == vec![true, false]).await;

    assert_eq!(com2.sent_bytes(), b"\n");
    assert!(bench.serial(port(1)).unwrap().sent().is_empty());
    assert!(bench.output(port(1)).unwrap().history().is_empty());

    // COM2 loops back to COM1, which does not feed the assembler.
    let report = handle.shutdown().await.unwrap();
    assert_eq!(report.lines_emitted, 0);
}

#[tokio::test]
async fn test_trigger_bindings_run_on_press() {
    let config = ControlConfig::from_toml_str(
        r#"
        [[keypad.buttons]]
        button = 1
        action = { cue = "up" }

        [[keypad.buttons]]
        button = 3
        action = { trigger = { route_source = { zone = 1, source = 5 } } }

        [[keypad.buttons]]
        button = 4
        action = { trigger = "all_off" }
        "#,
    )
    .unwrap();
    let (system, bench) = LoopbackBench::build(config).unwrap();
    let handle = system.start().await.unwrap();
    let zone1 = ZoneNumber::new(1).unwrap();
    let switcher = bench.switcher.clone();

    bench.keypad.tap(3).await.unwrap();
    eventually("zone 1 routed", || {
        switcher.source_for(zone1) == Some(SourceNumber::new(5).unwrap())
    })
    .await;

    bench.keypad.tap(4).await.unwrap();
    eventually("zone 1 off", || {
        switcher.source_for(zone1) == Some(SourceNumber::NONE)
    })
    .await;

    // Button 2 is unbound in this config.
    bench.keypad.tap(2).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert!(bench.output(port(2)).unwrap().history().is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_console_route_and_all_off() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();
    let zone2 = ZoneNumber::new(2).unwrap();

    handle.execute(command("route 2 7")).await.unwrap();
    assert_eq!(
        bench.switcher.source_for(zone2),
        Some(SourceNumber::new(7).unwrap())
    );

    handle.execute(command("alloff")).await.unwrap();
    assert_eq!(bench.switcher.source_for(zone2), Some(SourceNumber::NONE));

    // The mock switcher has 24 sources.
    let err = handle.execute(command("route 1 30")).await.unwrap_err();
    assert!(matches!(err, ControlError::Hardware(_)));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pause_ignores_keypad_only() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();
    let output1 = bench.output(port(1)).unwrap().clone();

    handle.program_event(ProgramStatus::Paused).await.unwrap();
    bench.keypad.press(1).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    assert!(output1.history().is_empty());

    handle.execute(command("UpPress 1")).await.unwrap();
    assert!(output1.level());
    handle.execute(command("UpRelease 1")).await.unwrap();

    handle.program_event(ProgramStatus::Resumed).await.unwrap();
    bench.keypad.press(1).await.unwrap();
    eventually("output 1 high after resume", || output1.level()).await;

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_input_changes_do_not_disturb_dispatch() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();
    let output1 = bench.output(port(1)).unwrap().clone();

    bench.keypad.set_input(1, true).await.unwrap();
    bench.keypad.set_input(1, false).await.unwrap();
    bench.keypad.press(1).await.unwrap();
    eventually("output 1 high", || output1.level()).await;

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_registration_skips_device() {
    let mut system = ControlSystem::new(ControlConfig::default());

    let (output1, output1_handle) = MockDigitalOutput::new(port(1));
    system.register_output(output1.with_registration_failure("port in use"));
    let (output2, output2_handle) = MockDigitalOutput::new(port(2));
    system.register_output(output2);

    let ((com1, com1_handle), (com2, com2_handle)) =
        MockSerialPort::loopback_pair(port(1), port(2));
    system.register_serial_port(com1.with_registration_failure("no such port"));
    system.register_serial_port(com2);

    let (ir, ir_handle) = MockIrOutput::new(port(1));
    system.register_ir_output(ir);

    let handle = system.start().await.unwrap();

    handle.execute(command("UpPress 1")).await.unwrap();
    assert!(output1_handle.history().is_empty());
    assert!(com1_handle.sent().is_empty());
    assert_eq!(ir_handle.active(), Some("UP_ARROW".to_string()));

    handle.execute(command("DnPress 2")).await.unwrap();
    assert!(output2_handle.level());
    assert_eq!(com2_handle.sent_bytes(), b"\n");

    // No switcher registered.
    let err = handle.execute(command("route 1 1")).await.unwrap_err();
    assert!(matches!(err, ControlError::DeviceUnavailable(_)));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_receive_port_still_runs() {
    let mut system = ControlSystem::new(ControlConfig::default());
    let ((com1, _com1_handle), (com2, com2_handle)) =
        MockSerialPort::loopback_pair(port(1), port(2));
    system.register_serial_port(com1);
    system.register_serial_port(com2.with_registration_failure("port in use"));

    let handle = system.start().await.unwrap();
    com2_handle.inject("never read\n").unwrap();
    handle.execute(command("DnPress 1")).await.unwrap();

    let report = timeout(WAIT, handle.shutdown())
        .await
        .expect("shutdown hung")
        .unwrap();
    assert_eq!(report.lines_emitted, 0);
}

#[tokio::test]
async fn test_stop_closes_queue_and_rejects_commands() {
    let (system, bench) = LoopbackBench::build(ControlConfig::default()).unwrap();
    let handle = system.start().await.unwrap();

    handle.execute(command("UpPress 1")).await.unwrap();
    assert!(bench.output(port(1)).unwrap().level());

    handle.program_event(ProgramStatus::Stopping).await.unwrap();
    let err = handle.execute(command("UpPress 1")).await.unwrap_err();
    assert!(matches!(err, ControlError::Stopped));

    // Stopping releases whatever was held.
    assert!(!bench.output(port(1)).unwrap().level());
    assert_eq!(bench.ir(port(1)).unwrap().active(), None);

    let report = timeout(WAIT, handle.shutdown())
        .await
        .expect("shutdown hung")
        .unwrap();
    assert_eq!(report.lines_emitted, 0);
}
