use codesage::{AnalysisPipeline, ComplexityClass};

use super::test_sandbox;

#[tokio::test]
async fn python_submission_gets_a_full_verdict() {
    let pipeline = AnalysisPipeline::new(test_sandbox());
    let result = pipeline.analyze("print(1+1)", "python").await;

    assert!(result.syntax_valid);
    assert!(result.syntax_errors.is_empty());
    assert_eq!(result.execution.exit_status, 0);
    assert_eq!(result.execution.stdout, "2\n");
    assert!(result.execution_secs > 0.0);
    assert!(result.overall_score <= 100);
}

#[tokio::test]
async fn nested_range_loops_read_as_quadratic() {
    let code = "\
total = 0
for i in range(10):
    for j in range(10):
        total += i * j
print(total)
";
    let pipeline = AnalysisPipeline::new(test_sandbox());
    let result = pipeline.analyze(code, "python").await;

    assert!(result.syntax_valid);
    assert_eq!(result.time_complexity, ComplexityClass::Quadratic);
    assert!(result.execution.is_success());
}

#[tokio::test]
async fn python_syntax_error_is_reported_with_its_line() {
    let pipeline = AnalysisPipeline::new(test_sandbox());
    let result = pipeline.analyze("def f(:\n    pass\n", "python").await;

    assert!(!result.syntax_valid);
    assert!(!result.syntax_errors.is_empty());
    assert!(result.syntax_errors[0].starts_with("Line "));
    // The runtime stage still ran and failed on its own terms
    assert!(!result.execution.is_success());
}

#[tokio::test]
async fn well_commented_looping_python_scores_high() {
    let code = "\
# add up the squares
total = 0
for value in range(5):
    if value > 0:
        total += value * value
print(total)
";
    let pipeline = AnalysisPipeline::new(test_sandbox());
    let result = pipeline.analyze(code, "python").await;

    assert_eq!(result.quality_score, 100);
    assert!(result.quality_issues.is_empty());
    // 25 syntax + 25 runtime + 25 quality share + 25 placeholder
    assert_eq!(result.overall_score, 100);
}
