use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cx_economy::Quest;

use super::amount;

pub fn run(file: &Path) -> Result<(), String> {
    let save = super::load_save(file)?;
    let log = &save.state.quests;

    println!("  {}", "Active Quests".bold().underline());
    if log.active.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Id", "Title", "Objectives", "Status"]);
        for quest in log.active.values() {
            let status = if quest.is_complete() {
                "ready".green().bold().to_string()
            } else {
                "in progress".yellow().to_string()
            };
            table.add_row(vec![quest.id.clone(), quest.title.clone(), objectives(quest), status]);
        }
        println!("{table}");
    }
    println!();

    let story = log.available_story();
    let offers: Vec<&Quest> = log
        .offers
        .iter()
        .filter(|q| !log.active.contains_key(&q.id))
        .collect();
    println!("  {}", "Available".bold().underline());
    if story.is_empty() && offers.is_empty() {
        println!("  {}", "(nothing on the board, try `quest refresh`)".dimmed());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Id", "Title", "Issuer", "Rewards"]);
        for quest in story.iter().chain(offers) {
            let issuer = quest
                .faction
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string());
            let rewards: Vec<String> = quest.rewards.iter().map(ToString::to_string).collect();
            table.add_row(vec![
                quest.id.clone(),
                quest.title.clone(),
                issuer,
                rewards.join(", "),
            ]);
        }
        println!("{table}");
    }
    println!();
    println!("  {} quests completed", log.completed.len());
    Ok(())
}

fn objectives(quest: &Quest) -> String {
    quest
        .objectives
        .iter()
        .map(|o| {
            let line = format!("{} {}/{}", o.description, amount(o.current), amount(o.required));
            if o.is_met() { format!("{} {line}", "+".green()) } else { format!("- {line}") }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
