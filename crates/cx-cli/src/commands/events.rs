use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_mechanics::event::{EVENTS, ProbabilityModel};

pub fn run(depth: Option<f64>) -> Result<(), String> {
    if let Some(d) = depth
        && d < 0.0
    {
        return Err(format!("depth must not be negative, got {d}"));
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Kind", "Weight", "Min depth", "Chance", "Options"]);

    let mut shown = 0;
    for event in EVENTS
        .iter()
        .filter(|e| depth.is_none_or(|d| e.min_depth <= d))
    {
        let options: Vec<String> = event
            .options
            .iter()
            .map(|o| o.action.to_string().to_lowercase())
            .collect();
        table.add_row(vec![
            event.id.to_string(),
            event.title.to_string(),
            format!("{:?}", event.kind).to_lowercase(),
            format!("{}", event.weight),
            format!("{:.0} m", event.min_depth),
            chance(event.probability, depth.unwrap_or(0.0)),
            options.join(", "),
        ]);
        shown += 1;
    }

    match depth {
        Some(d) => println!("  {} {}", "Events".bold(), format!("(reachable at {d:.0} m)").dimmed()),
        None => println!("  {}", "Events".bold()),
    }
    println!("{table}");
    println!();
    println!("  {shown} events");
    Ok(())
}

fn chance(model: Option<ProbabilityModel>, depth: f64) -> String {
    match model {
        None => "10%".to_string(),
        Some(ProbabilityModel::Poisson { lambda, curve }) => {
            format!("{:.3}/h", lambda * curve.factor(depth))
        }
        Some(ProbabilityModel::ExponentialDecay { base, scale }) => {
            format!("{:.2}%", base * (-depth / scale).exp() * 100.0)
        }
        Some(ProbabilityModel::Conditional(rule)) => format!("{rule:?}").to_lowercase(),
        Some(ProbabilityModel::Weighted) => "weighted".to_string(),
    }
}
