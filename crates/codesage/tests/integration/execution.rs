use std::sync::Arc;

use codesage::ExecutionRequest;

use super::{short_deadline_sandbox, test_sandbox};

#[tokio::test]
async fn python_prints_to_stdout() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("print(1+1)", "python"))
        .await;

    assert!(result.is_success(), "unexpected failure: {result:?}");
    assert_eq!(result.exit_status, 0);
    assert_eq!(result.stdout, "2\n");
    assert!(result.stderr.is_empty());
    assert!(!result.timed_out);
}

#[tokio::test]
async fn javascript_runs_under_node() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("console.log(40 + 2);", "javascript"))
        .await;

    assert!(result.is_success(), "unexpected failure: {result:?}");
    assert_eq!(result.stdout, "42\n");
}

#[tokio::test]
async fn python_nonzero_exit_is_captured() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("import sys\nsys.exit(3)\n", "python"))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.exit_status, 3);
    assert!(!result.timed_out);
}

#[tokio::test]
async fn python_stderr_is_captured() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("1/0", "python"))
        .await;

    assert!(!result.is_success());
    assert!(result.stderr.contains("ZeroDivisionError"));
}

#[tokio::test]
async fn python_infinite_loop_hits_the_deadline() {
    let sandbox = short_deadline_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("while True: pass", "python"))
        .await;

    assert!(result.timed_out);
    assert_eq!(result.exit_status, 1);
    assert!(!result.is_success());
    assert!(result.compile_error.is_none());
}

#[tokio::test]
async fn javascript_infinite_loop_hits_the_deadline() {
    let sandbox = short_deadline_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("while (true) {}", "javascript"))
        .await;

    assert!(result.timed_out);
    assert_eq!(result.exit_status, 1);
}

#[tokio::test]
async fn concurrent_executions_are_capped_but_complete() {
    let sandbox = test_sandbox();

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let sandbox = Arc::clone(&sandbox);
            tokio::spawn(async move {
                sandbox
                    .execute(&ExecutionRequest::new(format!("print({i})"), "python"))
                    .await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let result = task.await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.stdout, format!("{i}\n"));
    }
}
