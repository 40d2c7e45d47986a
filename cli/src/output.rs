use benchmatrix_engine::{Configuration, Selection};
use std::fmt::Write;

/// Plain-text view of the resolved matrix for `--list`.
pub fn render_matrix(selection: &Selection) -> String {
    let mut out = String::new();

    let width = selection
        .configurations
        .iter()
        .map(|c| c.name.len())
        .chain(selection.benchmarks.iter().map(|b| b.name.len()))
        .max()
        .unwrap_or(0);

    out.push_str("Configurations:\n");
    for config in &selection.configurations {
        let _ = writeln!(
            out,
            "  {:<width$}  {}",
            config.name,
            describe_configuration(config),
            width = width
        );
    }

    out.push_str("\nBenchmarks:\n");
    for bench in &selection.benchmarks {
        if bench.disabled {
            let _ = writeln!(out, "  {:<width$}  disabled", bench.name, width = width);
        } else {
            let _ = writeln!(
                out,
                "  {:<width$}  filter={} dir={}",
                bench.name,
                bench.filter,
                bench.dir,
                width = width
            );
        }
    }

    let active = selection.active_configurations().count() * selection.active_benchmarks().count();
    let _ = writeln!(out, "\n{} build/run units", active);
    out
}

fn describe_configuration(config: &Configuration) -> String {
    if config.disabled {
        return "disabled".to_string();
    }
    let root = if config.root.is_empty() { "." } else { config.root.as_str() };
    match (config.pgo_gen, config.profile_source()) {
        (true, _) => format!("root={} pgo=generate", root),
        (false, Some(source)) => format!("root={} pgo=use:{}", root, source),
        (false, None) => format!("root={}", root),
    }
}
