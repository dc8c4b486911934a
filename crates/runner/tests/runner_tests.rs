//! Integration tests for the script runner façade.
//!
//! Runs scripts from an in-memory bundle through the tokio-backed
//! [`TaskScriptService`] and checks the recorded status and loaded flag.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use scriptrun_core::resource::MemoryBundle;
use scriptrun_core::scripting::executor::{Parameters, ScriptHandle};
use scriptrun_core::scripting::task::TaskScriptService;
use scriptrun_runner::{ExecutionOutcome, MemoryLog, Runner};
use tokio::runtime::Handle;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("scriptrun=debug")
        .with_test_writer()
        .try_init();
}

fn bundle() -> MemoryBundle {
    MemoryBundle::new()
        .with(
            "/scripts/BAR/Data_Analysis/Distribution_Plotter.ijm",
            "run(\"Histogram\");",
        )
        .with("/scripts/BAR/Utilities/Fail.py", "raise")
        .with("/scripts/BAR/X/Y.ijm", "return getArgument();")
}

fn no_macros(_text: &str, _argument: &str) -> Option<String> {
    None
}

/// Evaluator that fails scripts whose source is `raise`.
fn evaluate(_name: &str, source: &str, _params: &Parameters) -> Result<(), String> {
    if source == "raise" {
        Err("raised on purpose".to_string())
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Modern backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_script_is_io_error() {
    init_tracing();
    let log = Arc::new(MemoryLog::new());
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros).with_log(Arc::clone(&log));

    let report = runner.run_path("/scripts/X/Y.ijm");

    assert!(!runner.script_loaded());
    assert_eq!(runner.status(), Some("io error"));
    assert!(!report.loaded);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn missing_script_in_silent_mode_is_not_logged() {
    let log = Arc::new(MemoryLog::new());
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros).with_log(Arc::clone(&log));
    runner.set_silent(true);

    runner.run_script("Nowhere", "nothing.ijm");

    assert_eq!(runner.status(), Some("io error"));
    assert!(log.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn well_formed_script_ends_done_or_pending() {
    init_tracing();
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros);

    let report = runner.run_script("Data_Analysis", "Distribution_Plotter.ijm");
    assert!(runner.script_loaded());

    // The evaluation may or may not have finished at inspection time.
    match report.outcome {
        ExecutionOutcome::Completed => assert_eq!(runner.status(), Some("done")),
        ExecutionOutcome::Pending => assert_eq!(runner.status(), Some("loaded")),
        other => panic!("unexpected outcome {other:?}"),
    }

    let handle = report.handle.expect("modern runs return a handle");
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_done() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("script should finish");

    assert_eq!(runner.refresh(handle.as_ref()).map(|s| s.as_str()), Some("done"));
    assert!(runner.script_loaded());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pending_script_keeps_loaded_status_until_refreshed() {
    let (tx, rx) = mpsc::channel::<()>();
    let rx = Mutex::new(rx);
    let service = TaskScriptService::new(Handle::current(), move |_, _, _| {
        let _ = rx
            .lock()
            .map(|rx| rx.recv_timeout(Duration::from_secs(5)));
        Ok(())
    });
    let mut runner = Runner::new(bundle(), service, no_macros);

    let report = runner.run_script("Data_Analysis", "Distribution_Plotter.ijm");
    assert_eq!(report.outcome, ExecutionOutcome::Pending);
    assert_eq!(runner.status(), Some("loaded"));
    assert!(runner.script_loaded());

    let handle = report.handle.expect("handle");
    tx.send(()).expect("release");
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_done() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("script should finish");

    runner.refresh(handle.as_ref());
    assert_eq!(runner.status(), Some("done"));
}

#[tokio::test]
async fn shut_down_service_reports_canceled() {
    let service = Arc::new(TaskScriptService::new(Handle::current(), evaluate));
    service.shutdown();
    let mut runner = Runner::new(bundle(), Arc::clone(&service), no_macros);

    let report = runner.run_script("Data_Analysis", "Distribution_Plotter.ijm");

    assert_eq!(report.outcome, ExecutionOutcome::Cancelled);
    assert_eq!(runner.status(), Some("canceled"));
    assert!(runner.script_loaded());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn asynchronous_failure_is_reported_through_the_handle() {
    let log = Arc::new(MemoryLog::new());
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros).with_log(Arc::clone(&log));

    let report = runner.run_path("/scripts/BAR/Utilities/Fail.py");
    let handle = report.handle.expect("modern runs return a handle");
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_done() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("script should finish");

    assert_eq!(handle.failure().as_deref(), Some("raised on purpose"));

    // Either the submission already saw the failure or a refresh records it.
    runner.refresh(handle.as_ref());
    assert_eq!(runner.status(), Some("exception"));
    assert!(!runner.script_loaded());
    assert_eq!(
        log.messages(),
        vec!["There was an error running /scripts/BAR/Utilities/Fail.py: raised on purpose"]
    );
}

#[tokio::test]
async fn parameters_reach_the_evaluator() {
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    let service = TaskScriptService::new(Handle::current(), move |name, _, params| {
        if let Ok(mut slot) = record.lock() {
            *slot = Some((name.to_string(), params.clone()));
        }
        Ok(())
    });
    let mut runner = Runner::new(bundle(), service, no_macros);

    let mut params = Parameters::new();
    params.insert("bins".to_string(), serde_json::json!(20));
    let report = runner.run_script_with("Data_Analysis", "Distribution_Plotter.ijm", Some(params));
    let handle = report.handle.expect("handle");
    tokio::time::timeout(Duration::from_secs(5), async {
        while !handle.is_done() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("script should finish");

    let (name, params) = seen.lock().expect("lock").clone().expect("evaluated");
    assert_eq!(name, "/scripts/BAR/Data_Analysis/Distribution_Plotter.ijm");
    assert_eq!(params["bins"], 20);
}

// ---------------------------------------------------------------------------
// Legacy backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn legacy_macro_returns_interpreter_result() {
    init_tracing();
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let interpreter = |_text: &str, argument: &str| -> Option<String> {
        (argument == "arg1").then(|| "ok".to_string())
    };
    let mut runner = Runner::new(bundle(), service, interpreter);

    let report = runner.run_legacy_macro("X/Y.ijm", "arg1");

    assert_eq!(runner.status(), Some("ok"));
    assert!(runner.script_loaded());
    assert_eq!(report.status_str(), Some("ok"));
    assert!(report.handle.is_none());
}

#[tokio::test]
async fn legacy_missing_macro_is_io_error() {
    let log = Arc::new(MemoryLog::new());
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros).with_log(Arc::clone(&log));

    runner.run_legacy_macro("X/Missing.ijm", "arg1");

    assert_eq!(runner.status(), Some("io error"));
    assert!(!runner.script_loaded());
    assert_eq!(log.messages(), vec!["Could not find X/Missing.ijm"]);
}

#[tokio::test]
async fn report_serializes_for_callers() {
    let service = TaskScriptService::new(Handle::current(), evaluate);
    let mut runner = Runner::new(bundle(), service, no_macros);
    runner.set_silent(true);

    let report = runner.run_path("/scripts/BAR/none.ijm");
    let json = serde_json::to_value(&report).expect("serialize");

    assert_eq!(json["status"], "io error");
    assert_eq!(json["loaded"], false);
    assert_eq!(json["outcome"]["kind"], "load_failed");
}
