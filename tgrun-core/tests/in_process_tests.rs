// tgrun-core/tests/in_process_tests.rs
//
// In-process runs of registered entry points.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tgrun_core::ambient;
use tgrun_core::error::CoreError;
use tgrun_core::supervisor::in_process::TERMINATE_NOTICE;
use tgrun_core::{
    Dispatcher, EventHandler, InProcessSupervisor, InvocationPlan, ModuleRegistry, RunOutcome,
    Supervisor,
};

#[derive(Default)]
struct Collector {
    lines: Vec<String>,
}

impl EventHandler for Collector {
    fn on_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn on_exit(&mut self, _outcome: &RunOutcome) {}
}

fn run(supervisor: &InProcessSupervisor, args: &[&str]) -> (Vec<String>, RunOutcome) {
    let (dispatcher, sender) = Dispatcher::new();
    let (on_line, on_exit) = sender.callbacks();
    let args = args.iter().map(|a| a.to_string()).collect();
    supervisor.start_with_args(args, on_line, on_exit).expect("start");
    let mut collector = Collector::default();
    let outcome = dispatcher.run_until_exit(&mut collector).expect("outcome");
    (collector.lines, outcome)
}

fn supervisor_for<F>(name: &str, main: F, echo: bool) -> InProcessSupervisor
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    let registry = ModuleRegistry::new();
    registry.register(name, main);
    InProcessSupervisor::new(registry, name, echo)
}

#[test]
fn test_entry_point_sees_args_and_output_is_captured() {
    let supervisor = supervisor_for(
        "tgradish",
        || {
            writeln!(ambient::stdout(), "args: {}", ambient::args().join(" "))?;
            writeln!(ambient::stderr(), "warning on stderr")?;
            Ok(())
        },
        true,
    );

    let (lines, outcome) = run(&supervisor, &["spoof", "in.webm", "out file.webm"]);
    assert_eq!(
        lines,
        [
            "$ tgradish spoof in.webm 'out file.webm'",
            "args: tgradish spoof in.webm out file.webm",
            "warning on stderr",
        ]
    );
    assert_eq!(outcome, RunOutcome::new(0, false));
}

#[test]
fn test_intentional_exit_code_is_reported() {
    let supervisor = supervisor_for(
        "exits",
        || {
            writeln!(ambient::stdout(), "bad input")?;
            ambient::exit(4);
        },
        false,
    );

    let (lines, outcome) = run(&supervisor, &[]);
    assert_eq!(lines, ["bad input"]);
    assert_eq!(outcome.exit_code, 4);

    // The supervisor is reusable and the argument context is fresh.
    let (_, outcome) = run(&supervisor, &["again"]);
    assert_eq!(outcome.exit_code, 4);
}

#[test]
fn test_error_becomes_diagnostic_and_code_one() {
    let supervisor = supervisor_for(
        "fails",
        || {
            write!(ambient::stdout(), "partial line")?;
            Err(anyhow::anyhow!("unsupported input format"))
        },
        false,
    );

    let (lines, outcome) = run(&supervisor, &[]);
    assert_eq!(
        lines,
        ["partial line", "Runtime failure: unsupported input format"]
    );
    assert_eq!(outcome.exit_code, 1);
}

#[test]
fn test_panic_becomes_diagnostic_and_code_one() {
    let supervisor = supervisor_for("panics", || panic!("index out of range"), false);

    let (lines, outcome) = run(&supervisor, &[]);
    assert_eq!(lines, ["Runtime failure: panicked: index out of range"]);
    assert_eq!(outcome.exit_code, 1);
    assert!(!supervisor.is_running());
}

#[test]
fn test_plan_based_start() {
    let registry = ModuleRegistry::new();
    registry.register("tgradish_plan", || {
        writeln!(ambient::stdout(), "{}", ambient::args()[1..].join(","))?;
        Ok(())
    });
    let supervisor = InProcessSupervisor::new(registry, "tgradish_plan", false);

    let (dispatcher, sender) = Dispatcher::new();
    let (on_line, on_exit) = sender.callbacks();
    let plan = InvocationPlan::in_process("tgradish_plan").with_args(["convert", "-i", "a.mp4"]);
    supervisor.start(&plan, on_line, on_exit).unwrap();

    let mut collector = Collector::default();
    dispatcher.run_until_exit(&mut collector).unwrap();
    assert_eq!(collector.lines, ["convert,-i,a.mp4"]);

    let external = InvocationPlan::external("/bin/true");
    let result = supervisor.start(&external, Box::new(|_| {}), Box::new(|_| {}));
    assert!(matches!(result, Err(CoreError::InvalidArguments(_))));
}

#[test]
fn test_terminate_is_advisory_and_noted_once() {
    let started = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&started);
    let supervisor = Arc::new(supervisor_for(
        "long_running",
        move || {
            flag.store(true, Ordering::SeqCst);
            while !ambient::cancellation_requested() {
                thread::sleep(Duration::from_millis(5));
            }
            writeln!(ambient::stdout(), "stopping")?;
            Ok(())
        },
        false,
    ));

    let (dispatcher, sender) = Dispatcher::new();
    let (on_line, on_exit) = sender.callbacks();
    supervisor.start_with_args(Vec::new(), on_line, on_exit).unwrap();

    let second = supervisor.start_with_args(Vec::new(), Box::new(|_| {}), Box::new(|_| {}));
    assert!(matches!(second, Err(CoreError::AlreadyRunning)));

    while !started.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(5));
    }
    supervisor.terminate();
    supervisor.terminate();

    let mut collector = Collector::default();
    let outcome = dispatcher.run_until_exit(&mut collector).unwrap();
    assert_eq!(collector.lines, [TERMINATE_NOTICE, "stopping"]);
    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.was_cancelled);

    supervisor.terminate();
    assert!(dispatcher.try_dispatch(&mut collector).is_none());
    assert_eq!(collector.lines.len(), 2);
}

#[test]
fn test_concurrent_supervisors_do_not_interleave() {
    fn chatty(tag: &'static str) -> InProcessSupervisor {
        supervisor_for(
            tag,
            move || {
                for i in 0..200 {
                    writeln!(ambient::stdout(), "{} {}", ambient::args()[0], i)?;
                }
                Ok(())
            },
            false,
        )
    }

    let first = chatty("alpha");
    let second = chatty("beta");
    let (d1, s1) = Dispatcher::new();
    let (d2, s2) = Dispatcher::new();
    let (l1, e1) = s1.callbacks();
    let (l2, e2) = s2.callbacks();
    first.start_with_args(Vec::new(), l1, e1).unwrap();
    second.start_with_args(Vec::new(), l2, e2).unwrap();

    let mut c1 = Collector::default();
    let mut c2 = Collector::default();
    d1.run_until_exit(&mut c1).unwrap();
    d2.run_until_exit(&mut c2).unwrap();

    assert_eq!(c1.lines.len(), 200);
    assert_eq!(c2.lines.len(), 200);
    assert!(c1.lines.iter().all(|l| l.starts_with("alpha ")));
    assert!(c2.lines.iter().all(|l| l.starts_with("beta ")));
}

#[test]
fn test_terminate_from_the_line_callback_does_not_block_the_run() {
    let supervisor = Arc::new(supervisor_for(
        "reacts_to_output",
        || {
            for i in 0..3 {
                writeln!(ambient::stdout(), "line {i}")?;
            }
            Ok(())
        },
        false,
    ));

    let (line_tx, line_rx) = mpsc::channel();
    let (exit_tx, exit_rx) = mpsc::channel();
    let sup = Arc::clone(&supervisor);
    supervisor
        .start_with_args(
            Vec::new(),
            Box::new(move |line| {
                if line == "line 0" {
                    sup.terminate();
                }
                let _ = line_tx.send(line);
            }),
            Box::new(move |outcome| {
                let _ = exit_tx.send(outcome);
            }),
        )
        .unwrap();

    let outcome = exit_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("run finished after terminate() from on_line");
    assert_eq!(outcome, RunOutcome::new(0, true));
    assert_eq!(
        line_rx.try_iter().collect::<Vec<_>>(),
        ["line 0", TERMINATE_NOTICE, "line 1", "line 2"]
    );

    // Neither the supervisor nor the redirection region stayed locked.
    let (lines, outcome) = run(&supervisor, &[]);
    assert_eq!(lines, ["line 0", "line 1", "line 2"]);
    assert_eq!(outcome, RunOutcome::new(0, false));
}
