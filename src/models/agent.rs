//! Built-in analysis agents.
//!
//! An agent is a named lens that narrows what the provider is asked to look
//! for. The selected agents are folded into the system prompt.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// A named analysis lens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Instruction appended to the system prompt when the agent is selected.
    #[serde(skip)]
    pub instruction: &'static str,
}

/// The agent catalog, in prompt order.
pub const AGENTS: &[Agent] = &[
    Agent {
        id: "security",
        title: "Security",
        description: "Authorization checks, injection and unsafe dynamic code",
        instruction: "Look for missing AUTHORITY-CHECK statements, SQL injection through dynamic \
WHERE clauses or table names, dynamic program generation (GENERATE SUBROUTINE POOL, \
INSERT REPORT), unchecked CALL TRANSACTION, hard-coded credentials and client-dependent \
data accessed with CLIENT SPECIFIED.",
    },
    Agent {
        id: "logic",
        title: "Logic",
        description: "Functional bugs and unhandled error paths",
        instruction: "Look for logic errors: unchecked SY-SUBRC after statements that set it, \
READ TABLE without handling the not-found case, off-by-one loops, wrong comparison \
operators, unhandled exceptions and dead or unreachable code.",
    },
    Agent {
        id: "performance",
        title: "Performance",
        description: "Database access patterns and expensive loops",
        instruction: "Look for SELECT statements inside loops, SELECT * where few fields are \
needed, missing WHERE clauses on large tables, nested loops over standard tables that \
should be sorted or hashed, and repeated work that could be buffered.",
    },
    Agent {
        id: "maintainability",
        title: "Maintainability",
        description: "Naming, structure and obsolete language elements",
        instruction: "Look for obsolete statements (MOVE, COMPUTE, header lines, FORM routines \
where methods fit), unclear naming, overly long procedures, magic numbers and missing \
modularization.",
    },
];

/// An agent id that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown analysis agent '{0}' (available: security, logic, performance, maintainability)")]
pub struct UnknownAgent(pub String);

/// Look up an agent by id, ignoring case and surrounding whitespace.
pub fn find_agent(id: &str) -> Option<&'static Agent> {
    let id = id.trim();
    AGENTS.iter().find(|a| a.id.eq_ignore_ascii_case(id))
}

/// Resolve selected agent ids against the catalog.
///
/// An empty selection means every agent. Results follow catalog order and
/// contain no duplicates.
pub fn resolve_agents(ids: &BTreeSet<String>) -> Result<Vec<&'static Agent>, UnknownAgent> {
    if ids.iter().all(|id| id.trim().is_empty()) {
        return Ok(AGENTS.iter().collect());
    }

    let mut selected = Vec::new();
    for id in ids.iter().filter(|id| !id.trim().is_empty()) {
        let agent = find_agent(id).ok_or_else(|| UnknownAgent(id.clone()))?;
        selected.push(agent);
    }

    Ok(AGENTS
        .iter()
        .filter(|a| selected.iter().any(|s| s.id == a.id))
        .collect())
}
