//! Training and evaluation summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::metrics::{DeploymentCriteria, EvaluationMetrics, GateOutcome};
use crate::pipeline::TrainingSummary;

fn metric_color(value: f64, threshold: Option<f64>) -> Color {
    match threshold {
        Some(min) if value > min => Color::Green,
        Some(_) => Color::Red,
        None => Color::White,
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Table of evaluation metrics, colored against the deployment criteria
pub fn metrics_table(metrics: &EvaluationMetrics, criteria: Option<&DeploymentCriteria>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("Accuracy"),
        Cell::new(format!("{:.4}", metrics.accuracy))
            .fg(metric_color(metrics.accuracy, criteria.map(|c| c.min_accuracy))),
    ]);
    table.add_row(vec![
        Cell::new("ROC-AUC"),
        Cell::new(format!("{:.4}", metrics.roc_auc))
            .fg(metric_color(metrics.roc_auc, criteria.map(|c| c.min_roc_auc))),
    ]);
    table.add_row(vec![Cell::new("Precision"), Cell::new(format!("{:.4}", metrics.precision))]);
    table.add_row(vec![Cell::new("Recall"), Cell::new(format!("{:.4}", metrics.recall))]);
    table.add_row(vec![Cell::new("F1"), Cell::new(format!("{:.4}", metrics.f1_score))]);
    table.add_row(vec![Cell::new("Samples"), Cell::new(metrics.samples)]);
    table
}

/// Confusion matrix laid out actual-by-predicted
pub fn confusion_table(metrics: &EvaluationMetrics) -> Table {
    let cm = &metrics.confusion_matrix;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new(""),
        Cell::new("Predicted 0").add_attribute(Attribute::Bold),
        Cell::new("Predicted 1").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Actual 0").add_attribute(Attribute::Bold),
        Cell::new(cm.tn).fg(Color::Green),
        Cell::new(cm.fp).fg(Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Actual 1").add_attribute(Attribute::Bold),
        Cell::new(cm.fn_).fg(Color::Red),
        Cell::new(cm.tp).fg(Color::Green),
    ]);
    table
}

/// Print the run facts plus held-out metrics after training
pub fn display_training_summary(summary: &TrainingSummary, metrics: &EvaluationMetrics) {
    print_section("📋", "TRAINING SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Item").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(summary.rows)]);
    table.add_row(vec![
        Cell::new("Train / Test"),
        Cell::new(format!("{} / {}", summary.train_rows, summary.test_rows)),
    ]);
    table.add_row(vec![
        Cell::new("Fraud rows"),
        Cell::new(summary.frauds).fg(Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Features"), Cell::new(summary.features)]);
    table.add_row(vec![Cell::new("Solver iterations"), Cell::new(summary.iterations)]);
    table.add_row(vec![
        Cell::new("Gradient norm"),
        Cell::new(format!("{:.2e}", summary.gradient_norm)),
    ]);
    table.add_row(vec![Cell::new("Seed"), Cell::new(summary.seed)]);
    table.add_row(vec![Cell::new("Evaluation date"), Cell::new(summary.evaluation_date)]);
    print_indented(&table);

    display_metrics("HELD-OUT METRICS", metrics, None);
}

/// Print metric and confusion tables
pub fn display_metrics(
    title: &str,
    metrics: &EvaluationMetrics,
    criteria: Option<&DeploymentCriteria>,
) {
    print_section("📊", title);
    print_indented(&metrics_table(metrics, criteria));
    println!();
    print_indented(&confusion_table(metrics));
}

/// Print the deployment gate verdict
pub fn display_gate(outcome: &GateOutcome) {
    println!();
    match outcome {
        GateOutcome::Approved => println!(
            "    {} {}",
            style("✓").green().bold(),
            style("Model meets deployment criteria").green()
        ),
        GateOutcome::Rejected { reasons } => {
            println!(
                "    {} {}",
                style("✗").red().bold(),
                style("Model does not meet deployment criteria").red()
            );
            for reason in reasons {
                println!("        {} {}", style("•").dim(), reason);
            }
        }
    }
}
