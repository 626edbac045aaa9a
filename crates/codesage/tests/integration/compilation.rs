use codesage::ExecutionRequest;

use super::{short_deadline_sandbox, test_sandbox};

#[tokio::test]
async fn cpp_compiles_and_runs() {
    let code = r#"
#include <iostream>
int main() {
    std::cout << "Hello, World!" << std::endl;
    return 0;
}
"#;
    let sandbox = test_sandbox();
    let result = sandbox.execute(&ExecutionRequest::new(code, "cpp")).await;

    assert!(result.is_success(), "unexpected failure: {result:?}");
    assert!(result.stdout.contains("Hello, World!"));
    assert!(result.compile_error.is_none());
}

#[tokio::test]
async fn cpp_compile_error_short_circuits_the_run() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("int main() { broken", "cpp"))
        .await;

    assert!(!result.is_success());
    assert!(result.compile_error.is_some());
    assert_ne!(result.exit_status, 0);
    // The run phase never started
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn java_compiles_and_runs() {
    let code = r#"
public class Solution {
    public static void main(String[] args) {
        System.out.println("42");
    }
}
"#;
    let sandbox = test_sandbox();
    let result = sandbox.execute(&ExecutionRequest::new(code, "java")).await;

    assert!(result.is_success(), "unexpected failure: {result:?}");
    assert_eq!(result.stdout, "42\n");
}

#[tokio::test]
async fn java_compile_error_short_circuits_the_run() {
    let sandbox = test_sandbox();
    let result = sandbox
        .execute(&ExecutionRequest::new("public class Solution { broken", "java"))
        .await;

    assert!(!result.is_success());
    assert!(result.compile_error.is_some());
    assert!(result.stdout.is_empty());
}

#[tokio::test]
async fn compiled_infinite_loop_hits_the_run_deadline() {
    let code = r#"
int main() {
    while (true) {}
    return 0;
}
"#;
    let sandbox = short_deadline_sandbox();
    let result = sandbox.execute(&ExecutionRequest::new(code, "cpp")).await;

    // g++ may spend the whole budget; either phase expiring is acceptable,
    // but the result must report it
    assert!(!result.is_success());
    assert!(result.timed_out || result.compile_error.is_some());
}
