//! Agent listing command.

use console::style;

use crate::models::AGENTS;

pub fn cmd_agents() -> anyhow::Result<()> {
    for agent in AGENTS {
        println!(
            "{:<16} {}",
            style(agent.id).cyan().bold(),
            style(agent.title).bold()
        );
        println!("{:<16} {}", "", style(agent.description).dim());
    }
    Ok(())
}
